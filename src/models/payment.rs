use serde::{Deserialize, Serialize};

/// A payment correlated with the external processor's checkout / intent ids.
///
/// A payment is matched by either `external_payment_intent_id` or
/// `external_checkout_id`; at most one row matches either identifier.
/// `donor_id`, `campaign_id`, and `recipient_id` are first-writer-wins:
/// once attributed they are never overwritten by later notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub donor_id: Option<String>,
    pub recipient_id: Option<String>,
    pub campaign_id: Option<String>,
    /// Amount in the currency's smallest unit (cents for USD).
    pub amount_minor: i64,
    /// Uppercase 3-letter currency code.
    pub currency: String,
    pub status: PaymentStatus,
    pub external_payment_intent_id: Option<String>,
    pub external_checkout_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
