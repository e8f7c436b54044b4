use serde::{Deserialize, Serialize};

/// A person who has given (or may give) through the platform.
///
/// Donors are keyed by email when one is known: at most one donor row exists
/// per email, and repeat sightings of the same email resolve to the same
/// donor id. A donor created through the public endpoint may have no email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub created_at: i64,
}

/// Data required to create a new donor via the public endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDonor {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
