//! Orchestrates one notification's reconciliation as a single atomic unit
//! of work.
//!
//! Processing walks dedup, donor resolution, payment upsert, and trail
//! append inside one database transaction. Either everything commits or
//! nothing does: the transaction rolls back on drop, so every early return
//! and error path leaves the store untouched.

use rusqlite::{Connection, TransactionBehavior};

use super::{donor_resolver, event_store, ledger, payment_reconciler, CheckoutEvent};
use super::event_store::RecordOutcome;
use super::payment_reconciler::{MatchKeys, PaymentFields};
use crate::error::Result;
use crate::models::TrailEntryType;

/// Terminal state of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All four effects committed.
    Committed {
        payment_id: String,
        donor_id: Option<String>,
        trail_entry_id: String,
    },
    /// The notification was already processed. Not an error: the expected
    /// outcome of a re-delivered notification, acknowledged as success so
    /// the processor stops redelivering.
    Ignored,
}

/// Process one checkout-completion notification.
///
/// The transaction is opened IMMEDIATE so the unit of work takes the write
/// lock up front; concurrent deliveries serialize on it and the loser of a
/// same-event race observes the committed notification record as a
/// uniqueness violation, which maps to `Ignored`.
pub fn process(
    conn: &mut Connection,
    event: &CheckoutEvent,
    default_currency: &str,
) -> Result<Outcome> {
    // Normalize before touching the store so a malformed currency fails
    // fast with no mutation attempted.
    let currency =
        payment_reconciler::normalize_currency(event.currency.as_deref(), default_currency)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match event_store::record_once(
        &tx,
        &event.external_event_id,
        &event.event_type,
        &event.raw_payload,
    )? {
        RecordOutcome::AlreadyProcessed => {
            // Nothing to roll back beyond the no-op insert attempt; the
            // transaction is discarded on drop.
            tracing::debug!(
                "notification {} already processed, ignoring redelivery",
                event.external_event_id
            );
            return Ok(Outcome::Ignored);
        }
        RecordOutcome::Inserted => {}
    }

    let donor_id =
        donor_resolver::resolve(&tx, event.email.as_deref(), event.full_name.as_deref())?;

    let payment_id = payment_reconciler::upsert(
        &tx,
        MatchKeys {
            payment_intent_id: event.payment_intent_id.as_deref(),
            checkout_id: &event.checkout_id,
        },
        PaymentFields {
            donor_id: donor_id.as_deref(),
            campaign_id: event.campaign_id.as_deref(),
            recipient_id: event.recipient_id.as_deref(),
            amount_minor: event.amount_minor,
            currency: &currency,
        },
    )?;

    let trail_entry_id = ledger::append(
        &tx,
        &payment_id,
        TrailEntryType::PaymentSucceeded,
        event.amount_minor,
        &currency,
    )?;

    tx.commit()?;

    tracing::info!(
        "reconciled notification {}: payment={}, donor={:?}, amount={} {}",
        event.external_event_id,
        payment_id,
        donor_id,
        event.amount_minor,
        currency
    );

    Ok(Outcome::Committed {
        payment_id,
        donor_id,
        trail_entry_id,
    })
}
