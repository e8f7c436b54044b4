//! Appends immutable trail entries for financial effects.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{constraint_kind, AppError, ConstraintKind, Result};
use crate::models::TrailEntryType;

/// Append one trail entry for a reconciled payment. Pure insert, no
/// matching or merging.
///
/// An invalid payment id surfaces the foreign-key violation as an
/// integrity error rather than a transient one: the caller just resolved
/// that id inside the same transaction, so its absence is a defect.
pub fn append(
    conn: &Connection,
    payment_id: &str,
    entry_type: TrailEntryType,
    amount_minor: i64,
    currency: &str,
) -> Result<String> {
    match queries::insert_trail_entry(conn, payment_id, entry_type, amount_minor, currency) {
        Ok(id) => Ok(id),
        Err(AppError::Database(ref e))
            if constraint_kind(e) == Some(ConstraintKind::ForeignKey) =>
        {
            Err(AppError::Integrity(format!(
                "trail append references unknown payment {}",
                payment_id
            )))
        }
        Err(e) => Err(e),
    }
}
