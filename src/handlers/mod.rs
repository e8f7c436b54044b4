pub mod donate;
pub mod donors;
pub mod health;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::AppState;

async fn root() -> &'static str {
    "Giftwell donation service"
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health))
        .route("/donors", get(donors::list_donors).post(donors::create_donor))
        .route("/donate", post(donate::initiate_donation))
        .route("/webhook/stripe", post(webhook::handle_stripe_webhook))
}
