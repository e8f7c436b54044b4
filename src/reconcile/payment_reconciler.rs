//! Maps a notification's external payment identifiers to a stable payment
//! row, creating or refreshing it.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{constraint_kind, AppError, ConstraintKind, Result};
use crate::models::PaymentStatus;

/// External identifiers used to match an existing payment. The checkout id
/// is always present; the intent id may be absent.
#[derive(Debug, Clone, Copy)]
pub struct MatchKeys<'a> {
    pub payment_intent_id: Option<&'a str>,
    pub checkout_id: &'a str,
}

/// Observed values for the payment. `currency` must already be normalized.
#[derive(Debug, Clone, Copy)]
pub struct PaymentFields<'a> {
    pub donor_id: Option<&'a str>,
    pub campaign_id: Option<&'a str>,
    pub recipient_id: Option<&'a str>,
    pub amount_minor: i64,
    pub currency: &'a str,
}

/// Normalize a raw currency code to uppercase 3-letter form, falling back
/// to the configured default when absent.
pub fn normalize_currency(raw: Option<&str>, default: &str) -> Result<String> {
    let code = match raw.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => default,
    };
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(format!(
            "invalid currency code: {:?}",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

/// Insert or refresh the payment row matching either external id.
///
/// On a match, status/amount/currency track the latest observation while
/// donor/campaign/recipient attribution is first-writer-wins. On a miss a
/// new row is inserted with status success. Returns the payment id either
/// way.
pub fn upsert(conn: &Connection, keys: MatchKeys<'_>, fields: PaymentFields<'_>) -> Result<String> {
    if fields.amount_minor < 0 {
        return Err(AppError::Validation(format!(
            "negative amount_minor: {}",
            fields.amount_minor
        )));
    }

    if let Some(payment) =
        queries::find_payment_by_external_ids(conn, keys.payment_intent_id, keys.checkout_id)?
    {
        refresh(conn, &payment.id, keys, fields)?;
        return Ok(payment.id);
    }

    match queries::insert_payment(
        conn,
        fields.donor_id,
        fields.recipient_id,
        fields.campaign_id,
        fields.amount_minor,
        fields.currency,
        PaymentStatus::Success,
        keys.payment_intent_id,
        keys.checkout_id,
    ) {
        Ok(id) => Ok(id),
        Err(AppError::Database(ref e))
            if constraint_kind(e) == Some(ConstraintKind::Unique) =>
        {
            // Lost the create race on one of the external-id indexes: a
            // concurrent notification inserted this payment first. Re-read
            // and take the update branch.
            let payment = queries::find_payment_by_external_ids(
                conn,
                keys.payment_intent_id,
                keys.checkout_id,
            )?
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "payment insert for {} hit unique constraint but no row found",
                    keys.checkout_id
                ))
            })?;
            refresh(conn, &payment.id, keys, fields)?;
            Ok(payment.id)
        }
        Err(e) => Err(e),
    }
}

fn refresh(
    conn: &Connection,
    payment_id: &str,
    keys: MatchKeys<'_>,
    fields: PaymentFields<'_>,
) -> Result<()> {
    queries::update_payment_observed(
        conn,
        payment_id,
        fields.amount_minor,
        fields.currency,
        PaymentStatus::Success,
        fields.donor_id,
        fields.campaign_id,
        fields.recipient_id,
        keys.payment_intent_id,
    )
}
