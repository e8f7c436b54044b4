use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    query_all, query_one, DONOR_COLS, NOTIFICATION_COLS, PAYMENT_COLS, TRAIL_ENTRY_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Donors ============

/// Insert a new donor. A duplicate email surfaces as a database error with
/// a unique-constraint kind; callers decide how to treat it.
pub fn create_donor(conn: &Connection, input: &CreateDonor) -> Result<Donor> {
    let donor = Donor {
        id: EntityType::Donor.gen_id(),
        full_name: input.full_name.clone(),
        email: input.email.clone(),
        country: input.country.clone(),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO donors (id, full_name, email, country, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            donor.id,
            donor.full_name,
            donor.email,
            donor.country,
            donor.created_at
        ],
    )?;
    Ok(donor)
}

pub fn get_donor_by_id(conn: &Connection, id: &str) -> Result<Option<Donor>> {
    query_one(
        conn,
        &format!("SELECT {} FROM donors WHERE id = ?1", DONOR_COLS),
        &[&id],
    )
}

pub fn get_donor_by_email(conn: &Connection, email: &str) -> Result<Option<Donor>> {
    query_one(
        conn,
        &format!("SELECT {} FROM donors WHERE email = ?1", DONOR_COLS),
        &[&email],
    )
}

/// Most recently created donors, newest first.
pub fn list_recent_donors(conn: &Connection, limit: i64) -> Result<Vec<Donor>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM donors ORDER BY created_at DESC, id DESC LIMIT ?1",
            DONOR_COLS
        ),
        &[&limit],
    )
}

// ============ Notification records ============

/// Insert a notification record. The insert is intentionally plain: a
/// redelivered event id fails on the unique constraint, and that failure is
/// the dedup signal the event store classifies.
pub fn insert_notification_record(
    conn: &Connection,
    external_event_id: &str,
    event_type: &str,
    payload: &str,
) -> Result<String> {
    let id = EntityType::Notification.gen_id();
    conn.execute(
        "INSERT INTO notification_records (id, external_event_id, event_type, payload, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, external_event_id, event_type, payload, now()],
    )?;
    Ok(id)
}

pub fn get_notification_by_external_id(
    conn: &Connection,
    external_event_id: &str,
) -> Result<Option<NotificationRecord>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM notification_records WHERE external_event_id = ?1",
            NOTIFICATION_COLS
        ),
        &[&external_event_id],
    )
}

// ============ Payments ============

/// Look up a payment by either external identifier. A NULL intent id never
/// matches anything (SQL three-valued logic), so passing None falls through
/// to the checkout id alone.
pub fn find_payment_by_external_ids(
    conn: &Connection,
    payment_intent_id: Option<&str>,
    checkout_id: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments
             WHERE external_payment_intent_id = ?1 OR external_checkout_id = ?2",
            PAYMENT_COLS
        ),
        &[&payment_intent_id, &checkout_id],
    )
}

pub fn get_payment_by_id(conn: &Connection, id: &str) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLS),
        &[&id],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn insert_payment(
    conn: &Connection,
    donor_id: Option<&str>,
    recipient_id: Option<&str>,
    campaign_id: Option<&str>,
    amount_minor: i64,
    currency: &str,
    status: PaymentStatus,
    payment_intent_id: Option<&str>,
    checkout_id: &str,
) -> Result<String> {
    let id = EntityType::Payment.gen_id();
    let ts = now();
    conn.execute(
        "INSERT INTO payments (id, donor_id, recipient_id, campaign_id, amount_minor, currency,
                               status, external_payment_intent_id, external_checkout_id,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            id,
            donor_id,
            recipient_id,
            campaign_id,
            amount_minor,
            currency,
            status.as_str(),
            payment_intent_id,
            checkout_id,
            ts
        ],
    )?;
    Ok(id)
}

/// Refresh an existing payment from a newly observed notification.
///
/// Status, amount, and currency always track the latest observation;
/// donor/campaign/recipient attribution and the intent id are COALESCEd so
/// a previously attributed value is never overwritten (first-writer-wins).
#[allow(clippy::too_many_arguments)]
pub fn update_payment_observed(
    conn: &Connection,
    id: &str,
    amount_minor: i64,
    currency: &str,
    status: PaymentStatus,
    donor_id: Option<&str>,
    campaign_id: Option<&str>,
    recipient_id: Option<&str>,
    payment_intent_id: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE payments
         SET amount_minor = ?2,
             currency = ?3,
             status = ?4,
             donor_id = COALESCE(donor_id, ?5),
             campaign_id = COALESCE(campaign_id, ?6),
             recipient_id = COALESCE(recipient_id, ?7),
             external_payment_intent_id = COALESCE(external_payment_intent_id, ?8),
             updated_at = ?9
         WHERE id = ?1",
        params![
            id,
            amount_minor,
            currency,
            status.as_str(),
            donor_id,
            campaign_id,
            recipient_id,
            payment_intent_id,
            now()
        ],
    )?;
    Ok(())
}

// ============ Transaction trail ============

pub fn insert_trail_entry(
    conn: &Connection,
    payment_id: &str,
    entry_type: TrailEntryType,
    amount_minor: i64,
    currency: &str,
) -> Result<String> {
    let id = EntityType::LedgerEntry.gen_id();
    conn.execute(
        "INSERT INTO transaction_trail (id, payment_id, entry_type, amount_minor, currency, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, payment_id, entry_type.as_str(), amount_minor, currency, now()],
    )?;
    Ok(id)
}

/// Trail entries for a payment, oldest first.
pub fn list_trail_entries(conn: &Connection, payment_id: &str) -> Result<Vec<TrailEntry>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transaction_trail WHERE payment_id = ?1 ORDER BY created_at, id",
            TRAIL_ENTRY_COLS
        ),
        &[&payment_id],
    )
}

// ============ Health ============

/// Cheap liveness probe against the store.
pub fn ping(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT 1", [], |_| Ok(()))?;
    Ok(())
}
