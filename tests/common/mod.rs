//! Test utilities and fixtures for Giftwell integration tests

#![allow(dead_code)]

use axum::Router;
use rusqlite::Connection;

pub use giftwell::db::{create_pool, init_db, queries, AppState, DbPool};
pub use giftwell::handlers;
pub use giftwell::models::*;
pub use giftwell::payments::StripeClient;
pub use giftwell::reconcile::CheckoutEvent;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("Failed to enable foreign keys");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Path for a throwaway file-backed database. In-memory SQLite gives every
/// pooled connection its own database, so tests that share state across
/// connections use a temp file instead.
pub fn temp_db_path() -> String {
    std::env::temp_dir()
        .join(format!("giftwell-test-{}.db", uuid::Uuid::new_v4().as_simple()))
        .to_string_lossy()
        .into_owned()
}

/// Create a file-backed pool with schema initialized
pub fn setup_test_pool() -> DbPool {
    let pool = create_pool(&temp_db_path()).expect("Failed to create test pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize schema");
    }
    pool
}

/// Create an AppState backed by a throwaway file database
pub fn create_test_app_state() -> AppState {
    AppState {
        db: setup_test_pool(),
        stripe: StripeClient::new("sk_test_xxx", TEST_WEBHOOK_SECRET),
        base_url: "http://localhost:3000".to_string(),
        default_currency: "USD".to_string(),
    }
}

/// Create the full application router with test state
pub fn test_app(state: AppState) -> Router {
    handlers::router().with_state(state)
}

/// A checkout-completion event with sensible defaults. Tests tweak fields
/// via struct update syntax.
pub fn test_event(event_id: &str, checkout_id: &str, amount_minor: i64) -> CheckoutEvent {
    CheckoutEvent {
        external_event_id: event_id.to_string(),
        event_type: "checkout.session.completed".to_string(),
        raw_payload: "{}".to_string(),
        checkout_id: checkout_id.to_string(),
        payment_intent_id: None,
        amount_minor,
        currency: Some("usd".to_string()),
        email: Some("donor@example.com".to_string()),
        full_name: Some("Test Donor".to_string()),
        campaign_id: None,
        recipient_id: None,
    }
}

/// A minimal checkout.session.completed webhook payload
pub fn checkout_payload(event_id: &str, checkout_id: &str, amount_minor: i64) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": checkout_id,
                "payment_intent": format!("pi_{}", checkout_id),
                "amount_total": amount_minor,
                "currency": "usd",
                "customer_details": {
                    "email": "donor@example.com",
                    "name": "Test Donor"
                },
                "metadata": {}
            }
        }
    })
    .to_string()
}

/// Compute a Stripe-style signature header for a payload
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={},v1={}", timestamp, signature)
}

/// Count rows in a table
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .expect("Failed to count rows")
}
