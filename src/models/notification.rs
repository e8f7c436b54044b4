use serde::{Deserialize, Serialize};

/// A processed inbound notification from the payment processor.
///
/// Exactly one row exists per distinct external event id; the unique
/// constraint on `external_event_id` is the idempotency boundary for
/// webhook processing. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub external_event_id: String,
    pub event_type: String,
    pub payload: String,
    pub processed_at: i64,
}
