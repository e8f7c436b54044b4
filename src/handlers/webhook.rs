//! Stripe webhook endpoint.
//!
//! The ack contract drives the processor's redelivery loop: 2xx means
//! "stop redelivering" and is returned for both fresh commits and
//! recognized replays; 4xx means the request itself is unacceptable and
//! retrying will not help; 5xx means a transient failure and the processor
//! should redeliver.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::db::AppState;
use crate::error::AppError;
use crate::payments::{StripeWebhookEvent, CHECKOUT_COMPLETED};
use crate::reconcile::{self, CheckoutEvent, Outcome};

/// Webhook handlers reply with a bare status and a short reason string;
/// the processor only inspects the status class.
pub type WebhookResult = (StatusCode, &'static str);

pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult {
    let signature = match headers.get("stripe-signature").and_then(|v| v.to_str().ok()) {
        Some(sig) => sig,
        None => {
            tracing::warn!("webhook rejected: missing stripe-signature header");
            return (StatusCode::BAD_REQUEST, "Missing stripe-signature header");
        }
    };

    match state.stripe.verify_webhook_signature(&body, signature) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("webhook rejected: signature mismatch");
            return (StatusCode::UNAUTHORIZED, "Invalid signature");
        }
        Err(AppError::BadRequest(msg)) => {
            tracing::warn!("webhook rejected: {msg}");
            return (StatusCode::BAD_REQUEST, "Malformed signature header");
        }
        Err(e) => {
            tracing::error!("webhook signature verification failed: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Verification error");
        }
    }

    let stripe_event: StripeWebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("webhook rejected: invalid JSON payload: {e}");
            return (StatusCode::BAD_REQUEST, "Invalid JSON payload");
        }
    };

    // Anything other than checkout completion is acknowledged without
    // effect so the processor does not keep redelivering event types we
    // do not act on.
    if stripe_event.event_type != CHECKOUT_COMPLETED {
        tracing::debug!("ignoring webhook event type {}", stripe_event.event_type);
        return (StatusCode::OK, "Event ignored");
    }

    let raw_payload = String::from_utf8_lossy(&body);
    let event = match CheckoutEvent::from_webhook(&stripe_event, &raw_payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("webhook rejected: {e}");
            return (StatusCode::BAD_REQUEST, "Invalid event payload");
        }
    };

    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("webhook could not acquire connection: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    match reconcile::process(&mut conn, &event, &state.default_currency) {
        Ok(Outcome::Committed { .. }) => (StatusCode::OK, "OK"),
        Ok(Outcome::Ignored) => (StatusCode::OK, "Already processed"),
        Err(AppError::Validation(msg)) => {
            tracing::warn!(
                "webhook event {} rejected: {msg}",
                event.external_event_id
            );
            (StatusCode::BAD_REQUEST, "Invalid event payload")
        }
        Err(e) => {
            tracing::error!(
                "webhook event {} failed to reconcile: {e}",
                event.external_event_id
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
