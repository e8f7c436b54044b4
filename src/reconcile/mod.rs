//! Notification-to-durable-state reconciliation.
//!
//! This is the core of the service: it turns an at-least-once stream of
//! payment-completion notifications into exactly-once-in-effect donor,
//! payment, and trail state. Each notification is processed in a single
//! database transaction; uniqueness constraints, not application locks,
//! resolve races between concurrent deliveries.

pub mod coordinator;
pub mod donor_resolver;
pub mod event_store;
pub mod ledger;
pub mod payment_reconciler;

pub use coordinator::{process, Outcome};
pub use event_store::RecordOutcome;

use crate::error::{AppError, Result};
use crate::payments::{StripeCheckoutSession, StripeWebhookEvent};

/// A validated checkout-completion notification.
///
/// Built at the webhook boundary before any store access: required fields
/// are checked here so absent or malformed input fails fast as a validation
/// error instead of propagating into the reconciliation logic. Metadata
/// attribution ids are caller-supplied and therefore optional.
#[derive(Debug, Clone)]
pub struct CheckoutEvent {
    pub external_event_id: String,
    pub event_type: String,
    pub raw_payload: String,
    pub checkout_id: String,
    pub payment_intent_id: Option<String>,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub campaign_id: Option<String>,
    pub recipient_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl CheckoutEvent {
    /// Validate a parsed webhook event into the coordinator's input shape.
    pub fn from_webhook(event: &StripeWebhookEvent, raw_payload: &str) -> Result<Self> {
        if event.id.is_empty() {
            return Err(AppError::Validation("missing event id".into()));
        }

        let session: StripeCheckoutSession = serde_json::from_value(event.data.object.clone())
            .map_err(|e| AppError::Validation(format!("invalid checkout session: {}", e)))?;

        if session.id.is_empty() {
            return Err(AppError::Validation("missing checkout session id".into()));
        }

        let amount_minor = session.amount_total.unwrap_or(0);
        if amount_minor < 0 {
            return Err(AppError::Validation("negative amount_total".into()));
        }

        let (email, full_name) = session
            .customer_details
            .map(|d| (non_empty(d.email), non_empty(d.name)))
            .unwrap_or((None, None));

        let (campaign_id, recipient_id) = session
            .metadata
            .map(|m| (non_empty(m.campaign_id), non_empty(m.recipient_id)))
            .unwrap_or((None, None));

        Ok(Self {
            external_event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            raw_payload: raw_payload.to_string(),
            checkout_id: session.id,
            payment_intent_id: non_empty(session.payment_intent),
            amount_minor,
            currency: non_empty(session.currency),
            email,
            full_name,
            campaign_id,
            recipient_id,
        })
    }
}
