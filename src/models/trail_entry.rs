use serde::{Deserialize, Serialize};

/// An immutable, append-only record of a financial effect on a payment.
///
/// One entry is created per successfully reconciled notification, not per
/// payment: a redelivered notification rejected by the dedup check appends
/// nothing, while a distinct notification for the same checkout appends a
/// second entry. The trail is the audit record for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailEntry {
    pub id: String,
    pub payment_id: String,
    pub entry_type: TrailEntryType,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailEntryType {
    PaymentSucceeded,
}

impl TrailEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentSucceeded => "payment_succeeded",
        }
    }
}

impl std::str::FromStr for TrailEntryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_succeeded" => Ok(Self::PaymentSucceeded),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TrailEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
