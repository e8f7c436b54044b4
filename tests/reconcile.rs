//! Reconciliation core tests: idempotency, aggregation, atomicity, races

mod common;

use common::*;
use giftwell::error::AppError;
use giftwell::reconcile::{process, Outcome};

#[test]
fn test_fresh_event_commits_all_effects() {
    let mut conn = setup_test_db();
    let event = test_event("evt_1", "cs_1", 500);

    let outcome = process(&mut conn, &event, "USD").expect("processing should succeed");

    let (payment_id, donor_id) = match outcome {
        Outcome::Committed {
            payment_id,
            donor_id,
            ..
        } => (payment_id, donor_id.expect("donor should be resolved")),
        Outcome::Ignored => panic!("fresh event must not be ignored"),
    };

    assert_eq!(count_rows(&conn, "notification_records"), 1);
    assert_eq!(count_rows(&conn, "donors"), 1);
    assert_eq!(count_rows(&conn, "payments"), 1);
    assert_eq!(count_rows(&conn, "transaction_trail"), 1);

    let payment = queries::get_payment_by_id(&conn, &payment_id)
        .unwrap()
        .expect("payment row should exist");
    assert_eq!(payment.amount_minor, 500);
    assert_eq!(payment.currency, "USD");
    assert_eq!(payment.status, PaymentStatus::Success);
    assert_eq!(payment.donor_id.as_deref(), Some(donor_id.as_str()));
    assert_eq!(payment.external_checkout_id, "cs_1");

    let donor = queries::get_donor_by_id(&conn, &donor_id)
        .unwrap()
        .expect("donor row should exist");
    assert_eq!(donor.email.as_deref(), Some("donor@example.com"));
    assert_eq!(donor.full_name.as_deref(), Some("Test Donor"));

    let trail = queries::list_trail_entries(&conn, &payment_id).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].entry_type, TrailEntryType::PaymentSucceeded);
    assert_eq!(trail[0].amount_minor, 500);
}

#[test]
fn test_replayed_event_is_ignored() {
    let mut conn = setup_test_db();
    let event = test_event("evt_1", "cs_1", 500);

    process(&mut conn, &event, "USD").expect("first delivery should succeed");
    let outcome = process(&mut conn, &event, "USD").expect("replay should not error");

    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(count_rows(&conn, "notification_records"), 1);
    assert_eq!(count_rows(&conn, "donors"), 1);
    assert_eq!(count_rows(&conn, "payments"), 1);
    assert_eq!(count_rows(&conn, "transaction_trail"), 1);
}

#[test]
fn test_distinct_event_same_checkout_updates_payment() {
    let mut conn = setup_test_db();
    let first = test_event("evt_1", "cs_1", 500);
    let second = test_event("evt_2", "cs_1", 700);

    let first_payment_id = match process(&mut conn, &first, "USD").unwrap() {
        Outcome::Committed { payment_id, .. } => payment_id,
        Outcome::Ignored => panic!("fresh event must commit"),
    };
    let second_payment_id = match process(&mut conn, &second, "USD").unwrap() {
        Outcome::Committed { payment_id, .. } => payment_id,
        Outcome::Ignored => panic!("distinct event id must not be deduplicated"),
    };

    // Same payment row, refreshed amount, one trail entry per observation.
    assert_eq!(first_payment_id, second_payment_id);
    assert_eq!(count_rows(&conn, "payments"), 1);
    assert_eq!(count_rows(&conn, "notification_records"), 2);
    assert_eq!(count_rows(&conn, "donors"), 1);

    let payment = queries::get_payment_by_id(&conn, &first_payment_id)
        .unwrap()
        .unwrap();
    assert_eq!(payment.amount_minor, 700);

    let trail = queries::list_trail_entries(&conn, &first_payment_id).unwrap();
    let mut amounts: Vec<i64> = trail.iter().map(|e| e.amount_minor).collect();
    amounts.sort();
    assert_eq!(amounts, vec![500, 700]);
}

#[test]
fn test_payment_matched_by_intent_id() {
    let mut conn = setup_test_db();
    let mut first = test_event("evt_1", "cs_1", 500);
    first.payment_intent_id = Some("pi_1".to_string());
    // Different checkout id, same intent: must resolve to the same payment.
    let mut second = test_event("evt_2", "cs_2", 500);
    second.payment_intent_id = Some("pi_1".to_string());

    process(&mut conn, &first, "USD").unwrap();
    process(&mut conn, &second, "USD").unwrap();

    assert_eq!(count_rows(&conn, "payments"), 1);
}

#[test]
fn test_attribution_is_first_writer_wins() {
    let mut conn = setup_test_db();
    let mut first = test_event("evt_1", "cs_1", 500);
    first.campaign_id = Some("camp_a".to_string());
    let mut second = test_event("evt_2", "cs_1", 500);
    second.campaign_id = Some("camp_b".to_string());

    let payment_id = match process(&mut conn, &first, "USD").unwrap() {
        Outcome::Committed { payment_id, .. } => payment_id,
        Outcome::Ignored => panic!("fresh event must commit"),
    };
    process(&mut conn, &second, "USD").unwrap();

    let payment = queries::get_payment_by_id(&conn, &payment_id)
        .unwrap()
        .unwrap();
    assert_eq!(payment.campaign_id.as_deref(), Some("camp_a"));
}

#[test]
fn test_repeat_email_reuses_donor_without_overwriting() {
    let mut conn = setup_test_db();
    let first = test_event("evt_1", "cs_1", 500);
    let mut second = test_event("evt_2", "cs_2", 300);
    second.full_name = Some("Different Name".to_string());

    process(&mut conn, &first, "USD").unwrap();
    process(&mut conn, &second, "USD").unwrap();

    assert_eq!(count_rows(&conn, "donors"), 1);
    let donor = queries::get_donor_by_email(&conn, "donor@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(donor.full_name.as_deref(), Some("Test Donor"));
}

#[test]
fn test_event_without_email_records_anonymous_payment() {
    let mut conn = setup_test_db();
    let mut event = test_event("evt_1", "cs_1", 500);
    event.email = None;
    event.full_name = None;

    let outcome = process(&mut conn, &event, "USD").unwrap();

    match outcome {
        Outcome::Committed {
            payment_id,
            donor_id,
            ..
        } => {
            assert_eq!(donor_id, None);
            let payment = queries::get_payment_by_id(&conn, &payment_id)
                .unwrap()
                .unwrap();
            assert_eq!(payment.donor_id, None);
        }
        Outcome::Ignored => panic!("fresh event must commit"),
    }
    assert_eq!(count_rows(&conn, "donors"), 0);
    assert_eq!(count_rows(&conn, "payments"), 1);
}

#[test]
fn test_missing_currency_falls_back_to_default() {
    let mut conn = setup_test_db();
    let mut event = test_event("evt_1", "cs_1", 500);
    event.currency = None;

    let payment_id = match process(&mut conn, &event, "EUR").unwrap() {
        Outcome::Committed { payment_id, .. } => payment_id,
        Outcome::Ignored => panic!("fresh event must commit"),
    };

    let payment = queries::get_payment_by_id(&conn, &payment_id)
        .unwrap()
        .unwrap();
    assert_eq!(payment.currency, "EUR");
}

#[test]
fn test_malformed_currency_rejected_without_mutation() {
    let mut conn = setup_test_db();
    let mut event = test_event("evt_1", "cs_1", 500);
    event.currency = Some("not-a-currency".to_string());

    let result = process(&mut conn, &event, "USD");

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(count_rows(&conn, "notification_records"), 0);
    assert_eq!(count_rows(&conn, "donors"), 0);
    assert_eq!(count_rows(&conn, "payments"), 0);
    assert_eq!(count_rows(&conn, "transaction_trail"), 0);
}

#[test]
fn test_negative_amount_rejected_without_mutation() {
    let mut conn = setup_test_db();
    let event = test_event("evt_1", "cs_1", -100);

    let result = process(&mut conn, &event, "USD");

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(count_rows(&conn, "notification_records"), 0);
    assert_eq!(count_rows(&conn, "payments"), 0);
    assert_eq!(count_rows(&conn, "transaction_trail"), 0);
}

#[test]
fn test_failure_mid_flight_rolls_back_everything() {
    let mut conn = setup_test_db();
    // Sabotage the last step of the unit of work: with the trail table gone
    // the final insert fails after dedup, donor, and payment writes.
    conn.execute_batch("DROP TABLE transaction_trail;").unwrap();

    let event = test_event("evt_1", "cs_1", 500);
    let result = process(&mut conn, &event, "USD");

    assert!(result.is_err());
    assert_eq!(count_rows(&conn, "notification_records"), 0);
    assert_eq!(count_rows(&conn, "donors"), 0);
    assert_eq!(count_rows(&conn, "payments"), 0);
}

#[test]
fn test_failed_delivery_can_be_retried() {
    let mut conn = setup_test_db();
    conn.execute_batch("DROP TABLE transaction_trail;").unwrap();

    let event = test_event("evt_1", "cs_1", 500);
    assert!(process(&mut conn, &event, "USD").is_err());

    // Redelivery after the fault clears must commit, not be deduplicated.
    conn.execute_batch(
        "CREATE TABLE transaction_trail (
            id TEXT PRIMARY KEY,
            payment_id TEXT NOT NULL REFERENCES payments(id),
            entry_type TEXT NOT NULL,
            amount_minor INTEGER NOT NULL,
            currency TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );",
    )
    .unwrap();

    let outcome = process(&mut conn, &event, "USD").expect("retry should succeed");
    assert!(matches!(outcome, Outcome::Committed { .. }));
    assert_eq!(count_rows(&conn, "notification_records"), 1);
    assert_eq!(count_rows(&conn, "payments"), 1);
    assert_eq!(count_rows(&conn, "transaction_trail"), 1);
}

#[test]
fn test_concurrent_deliveries_commit_exactly_once() {
    let pool = setup_test_pool();
    let event = test_event("evt_race", "cs_race", 500);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let pool = pool.clone();
            let event = event.clone();
            std::thread::spawn(move || {
                let mut conn = pool.get().expect("Failed to get connection");
                process(&mut conn, &event, "USD").expect("processing should not error")
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let committed = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Committed { .. }))
        .count();
    let ignored = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Ignored))
        .count();
    assert_eq!(committed, 1, "exactly one delivery must take effect");
    assert_eq!(ignored, 1, "the racing delivery must be deduplicated");

    let conn = pool.get().unwrap();
    assert_eq!(count_rows(&conn, "notification_records"), 1);
    assert_eq!(count_rows(&conn, "donors"), 1);
    assert_eq!(count_rows(&conn, "payments"), 1);
    assert_eq!(count_rows(&conn, "transaction_trail"), 1);
}
