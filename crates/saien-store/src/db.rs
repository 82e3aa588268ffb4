use rusqlite::Connection;

use crate::error::Result;

/// Initialise the saien schema in `conn`. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
///
/// The UNIQUE constraint on `notifications` is the dedup/idempotency key:
/// at most one record per (cultivation, task type, day), enforced where
/// concurrent runs actually meet.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS species (
            id          TEXT NOT NULL PRIMARY KEY,
            name        TEXT NOT NULL,
            schedule    TEXT NOT NULL,      -- JSON-encoded SpeciesSchedule
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS cultivations (
            id                  TEXT NOT NULL PRIMARY KEY,
            user_id             TEXT NOT NULL,
            species_id          TEXT NOT NULL REFERENCES species(id),
            planted_date        TEXT NOT NULL,      -- YYYY-MM-DD
            start_method        TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'growing',
            adjustments         TEXT NOT NULL DEFAULT '{}',  -- JSON map key -> delta
            last_feedback_date  TEXT,               -- YYYY-MM-DD or NULL
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_cultivations_status
            ON cultivations (status);

        CREATE TABLE IF NOT EXISTS notifications (
            id              TEXT NOT NULL PRIMARY KEY,
            cultivation_id  TEXT NOT NULL REFERENCES cultivations(id),
            user_id         TEXT NOT NULL,
            task_type       TEXT NOT NULL,
            description     TEXT NOT NULL,
            scheduled_date  TEXT NOT NULL,  -- YYYY-MM-DD
            sent_at         TEXT,           -- ISO-8601 or NULL until delivered
            created_at      TEXT NOT NULL,
            UNIQUE (cultivation_id, task_type, scheduled_date)
        ) STRICT;

        -- Gate query: sent_at IS NULL AND scheduled_date = today
        CREATE INDEX IF NOT EXISTS idx_notifications_pending
            ON notifications (scheduled_date, sent_at);

        CREATE TABLE IF NOT EXISTS notification_preferences (
            user_id                     TEXT NOT NULL PRIMARY KEY,
            watering_reminders_enabled  INTEGER NOT NULL DEFAULT 1,
            preferred_hour              INTEGER,    -- 0-23 or NULL for default
            updated_at                  TEXT NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
