//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Models implement `FromRow` to define how they are constructed from
//! database rows; `query_one`/`query_all` cover the common query shapes.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// Graceful handling instead of panicking when the database contains an
/// invalid enum value (corruption, migration errors, etc.).
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const DONOR_COLS: &str = "id, full_name, email, country, created_at";

pub const PAYMENT_COLS: &str = "id, donor_id, recipient_id, campaign_id, amount_minor, currency, \
     status, external_payment_intent_id, external_checkout_id, created_at, updated_at";

pub const TRAIL_ENTRY_COLS: &str = "id, payment_id, entry_type, amount_minor, currency, created_at";

pub const NOTIFICATION_COLS: &str = "id, external_event_id, event_type, payload, processed_at";

// ============ FromRow Implementations ============

impl FromRow for Donor {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Donor {
            id: row.get(0)?,
            full_name: row.get(1)?,
            email: row.get(2)?,
            country: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            donor_id: row.get(1)?,
            recipient_id: row.get(2)?,
            campaign_id: row.get(3)?,
            amount_minor: row.get(4)?,
            currency: row.get(5)?,
            status: parse_enum(row, 6, "status")?,
            external_payment_intent_id: row.get(7)?,
            external_checkout_id: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl FromRow for TrailEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TrailEntry {
            id: row.get(0)?,
            payment_id: row.get(1)?,
            entry_type: parse_enum(row, 2, "entry_type")?,
            amount_minor: row.get(3)?,
            currency: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for NotificationRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(NotificationRecord {
            id: row.get(0)?,
            external_event_id: row.get(1)?,
            event_type: row.get(2)?,
            payload: row.get(3)?,
            processed_at: row.get(4)?,
        })
    }
}
