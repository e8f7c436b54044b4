//! Maps a contact email to a stable donor id, creating the donor on first
//! sighting.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{constraint_kind, AppError, ConstraintKind, Result};
use crate::models::CreateDonor;

/// Resolve an email to a donor id within the active transaction.
///
/// Absent email is a no-op: reconciliation never fabricates a donor.
/// An existing donor is returned unchanged; the display name on the
/// notification never overwrites a stored name.
///
/// Two concurrent notifications may both observe "not found" for the same
/// email; the second insert then fails on the unique constraint and this
/// resolver re-reads the winner's id instead of surfacing the violation.
pub fn resolve(
    conn: &Connection,
    email: Option<&str>,
    full_name: Option<&str>,
) -> Result<Option<String>> {
    let Some(email) = email else {
        return Ok(None);
    };

    if let Some(donor) = queries::get_donor_by_email(conn, email)? {
        return Ok(Some(donor.id));
    }

    let input = CreateDonor {
        full_name: full_name.map(|s| s.to_string()),
        email: Some(email.to_string()),
        country: None,
    };
    match queries::create_donor(conn, &input) {
        Ok(donor) => {
            tracing::debug!("created donor {} for {}", donor.id, email);
            Ok(Some(donor.id))
        }
        Err(AppError::Database(ref e))
            if constraint_kind(e) == Some(ConstraintKind::Unique) =>
        {
            // Lost the create race: another unit of work inserted this email
            // first. Re-read and return the winner's id.
            queries::get_donor_by_email(conn, email)?
                .map(|d| Some(d.id))
                .ok_or_else(|| {
                    AppError::Integrity(format!(
                        "donor insert for {} hit unique constraint but no row found",
                        email
                    ))
                })
        }
        Err(e) => Err(e),
    }
}
