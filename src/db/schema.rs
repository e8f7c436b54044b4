use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Inbound processor notifications (idempotency boundary).
        -- The unique external_event_id is the source of truth for dedup:
        -- a second insert for the same id fails on the constraint.
        -- Rows are never updated or deleted.
        CREATE TABLE IF NOT EXISTS notification_records (
            id TEXT PRIMARY KEY,
            external_event_id TEXT NOT NULL UNIQUE,
            event_type TEXT NOT NULL,
            payload TEXT NOT NULL,
            processed_at INTEGER NOT NULL
        );

        -- Donors (at most one row per email; email may be absent)
        CREATE TABLE IF NOT EXISTS donors (
            id TEXT PRIMARY KEY,
            full_name TEXT,
            email TEXT UNIQUE,
            country TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_donors_created ON donors(created_at DESC);

        -- Payments, correlated with the processor via checkout / intent ids.
        -- At most one row matches either external identifier.
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            donor_id TEXT REFERENCES donors(id),
            recipient_id TEXT,
            campaign_id TEXT,
            amount_minor INTEGER NOT NULL CHECK (amount_minor >= 0),
            currency TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'success', 'failed')),
            external_payment_intent_id TEXT,
            external_checkout_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_checkout
            ON payments(external_checkout_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_payments_intent
            ON payments(external_payment_intent_id)
            WHERE external_payment_intent_id IS NOT NULL;
        CREATE INDEX IF NOT EXISTS idx_payments_donor ON payments(donor_id);

        -- Append-only trail of financial effects (one entry per distinct
        -- successfully processed notification)
        CREATE TABLE IF NOT EXISTS transaction_trail (
            id TEXT PRIMARY KEY,
            payment_id TEXT NOT NULL REFERENCES payments(id),
            entry_type TEXT NOT NULL,
            amount_minor INTEGER NOT NULL,
            currency TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_trail_payment ON transaction_trail(payment_id);
        "#,
    )?;
    Ok(())
}
