use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::payments::CheckoutParams;
use crate::reconcile::payment_reconciler::normalize_currency;

#[derive(Debug, Deserialize)]
pub struct DonateRequest {
    /// Donation amount in the currency's smallest unit.
    pub amount_minor: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonateResponse {
    pub checkout_id: String,
    pub checkout_url: String,
}

/// Start a donation by creating a checkout session with the payment
/// processor. Stateless: the durable record is created later, when the
/// completion notification arrives on the webhook.
pub async fn initiate_donation(
    State(state): State<AppState>,
    Json(request): Json<DonateRequest>,
) -> Result<Json<DonateResponse>> {
    if request.amount_minor <= 0 {
        return Err(AppError::Validation(
            "amount_minor must be positive".into(),
        ));
    }
    let currency = normalize_currency(request.currency.as_deref(), &state.default_currency)?;

    let params = CheckoutParams {
        amount_minor: request.amount_minor,
        currency,
        campaign_id: request.campaign_id,
        recipient_id: request.recipient_id,
    };
    let success_url = format!("{}/thanks", state.base_url);
    let cancel_url = format!("{}/", state.base_url);

    let (checkout_id, checkout_url) = state
        .stripe
        .create_checkout_session(&params, &success_url, &cancel_url)
        .await?;

    Ok(Json(DonateResponse {
        checkout_id,
        checkout_url,
    }))
}
