//! Records each inbound notification id exactly once.
//!
//! The unique constraint on `external_event_id` is the linchpin of the
//! exactly-once-effect guarantee under at-least-once delivery: whichever
//! delivery inserts first wins, and every other delivery of the same event
//! observes the constraint failure as `AlreadyProcessed`.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{constraint_kind, AppError, ConstraintKind, Result};

/// Outcome of attempting to record a notification.
///
/// `AlreadyProcessed` is a first-class result, not an error: it is the
/// expected outcome of a re-delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    AlreadyProcessed,
}

/// Attempt to insert a notification record for this event id.
///
/// Any failure other than the uniqueness violation (connectivity, lock
/// timeout) propagates as a transient store error.
pub fn record_once(
    conn: &Connection,
    external_event_id: &str,
    event_type: &str,
    payload: &str,
) -> Result<RecordOutcome> {
    match queries::insert_notification_record(conn, external_event_id, event_type, payload) {
        Ok(_) => Ok(RecordOutcome::Inserted),
        Err(AppError::Database(ref e))
            if constraint_kind(e) == Some(ConstraintKind::Unique) =>
        {
            Ok(RecordOutcome::AlreadyProcessed)
        }
        Err(e) => Err(e),
    }
}
