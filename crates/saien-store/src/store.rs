use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::*;

/// Typed access layer over the SQLite record store.
///
/// Thread-safe: wraps the connection in a Mutex so the gateway can share one
/// handle between the scheduler and gate entry points.
pub struct Store {
    db: Mutex<Connection>,
}

impl Store {
    /// Open the store on `conn`, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    // --- species catalog ----------------------------------------------------

    /// Insert or replace a species schedule. The template is validated here
    /// so malformed catalog data fails at ingestion, not mid-run.
    pub fn upsert_species(&self, id: &str, name: &str, schedule: &SpeciesSchedule) -> Result<()> {
        schedule
            .validate()
            .map_err(|reason| StoreError::InvalidTemplate {
                species_id: id.to_string(),
                reason,
            })?;
        let schedule_json =
            serde_json::to_string(schedule).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO species (id, name, schedule, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                schedule = excluded.schedule,
                updated_at = excluded.updated_at",
            rusqlite::params![id, name, schedule_json, now],
        )?;
        Ok(())
    }

    // --- cultivations -------------------------------------------------------

    /// Create a cultivation instance. Returns the generated id.
    pub fn add_cultivation(&self, new: &NewCultivation) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let adjustments_json = serde_json::to_string(&new.adjustments)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO cultivations
             (id, user_id, species_id, planted_date, start_method, status,
              adjustments, last_feedback_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'growing', ?6, ?7, ?8, ?8)",
            rusqlite::params![
                id,
                new.user_id,
                new.species_id,
                new.planted_date.to_string(),
                new.start_method.to_string(),
                adjustments_json,
                new.last_feedback_date.map(|d| d.to_string()),
                now,
            ],
        )?;
        Ok(id)
    }

    /// Move a cultivation to a new lifecycle state.
    pub fn set_status(&self, id: &str, status: CultivationStatus) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE cultivations SET status = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![status.to_string(), now, id],
        )?;
        if n == 0 {
            return Err(StoreError::CultivationNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Record user feedback: accumulate `delta` onto the adjustment `key`
    /// and stamp `last_feedback_date`.
    pub fn apply_feedback(
        &self,
        id: &str,
        key: &str,
        delta: f64,
        feedback_date: NaiveDate,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        let adjustments_json: String = db
            .query_row(
                "SELECT adjustments FROM cultivations WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::CultivationNotFound(id.to_string())
                }
                other => StoreError::Database(other),
            })?;
        let mut adjustments: std::collections::HashMap<String, f64> =
            serde_json::from_str(&adjustments_json)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
        *adjustments.entry(key.to_string()).or_insert(0.0) += delta;
        let updated = serde_json::to_string(&adjustments)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "UPDATE cultivations
             SET adjustments = ?1, last_feedback_date = ?2, updated_at = ?3
             WHERE id = ?4",
            rusqlite::params![updated, feedback_date.to_string(), now, id],
        )?;
        debug!(cultivation_id = %id, key, delta, "feedback applied");
        Ok(())
    }

    /// Fetch every growing cultivation joined with its species schedule.
    ///
    /// A row with an unreadable start method, date, or adjustment map is a
    /// partial-data fault: skipped and reported, the scan continues. A
    /// schedule column that fails strict validation is a configuration fault
    /// and aborts the whole scan.
    pub fn growing_cultivations(&self) -> Result<CultivationScan> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT c.id, c.user_id, c.species_id, s.name, c.planted_date,
                    c.start_method, c.adjustments, c.last_feedback_date, s.schedule
             FROM cultivations c
             JOIN species s ON s.id = c.species_id
             WHERE c.status = 'growing'
             ORDER BY c.created_at",
        )?;
        let raw: Vec<_> = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,         // id
                    row.get::<_, String>(1)?,         // user_id
                    row.get::<_, String>(2)?,         // species_id
                    row.get::<_, String>(3)?,         // species name
                    row.get::<_, String>(4)?,         // planted_date
                    row.get::<_, String>(5)?,         // start_method
                    row.get::<_, String>(6)?,         // adjustments JSON
                    row.get::<_, Option<String>>(7)?, // last_feedback_date
                    row.get::<_, String>(8)?,         // schedule JSON
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut scan = CultivationScan::default();
        for (id, user_id, species_id, species_name, planted, method, adj_json, feedback, sched_json) in
            raw
        {
            let schedule: SpeciesSchedule =
                serde_json::from_str(&sched_json).map_err(|e| StoreError::InvalidTemplate {
                    species_id: species_id.clone(),
                    reason: e.to_string(),
                })?;
            schedule
                .validate()
                .map_err(|reason| StoreError::InvalidTemplate {
                    species_id: species_id.clone(),
                    reason,
                })?;

            let planted_date = match planted.parse::<NaiveDate>() {
                Ok(d) => d,
                Err(e) => {
                    warn!(cultivation_id = %id, "skipping: bad planted_date: {e}");
                    scan.skipped
                        .push(format!("cultivation {id}: bad planted_date: {e}"));
                    continue;
                }
            };
            let start_method = match method.parse::<StartMethod>() {
                Ok(m) => m,
                Err(e) => {
                    warn!(cultivation_id = %id, "skipping: {e}");
                    scan.skipped.push(format!("cultivation {id}: {e}"));
                    continue;
                }
            };
            let adjustments = match serde_json::from_str(&adj_json) {
                Ok(a) => a,
                Err(e) => {
                    warn!(cultivation_id = %id, "skipping: bad adjustments JSON: {e}");
                    scan.skipped
                        .push(format!("cultivation {id}: bad adjustments JSON: {e}"));
                    continue;
                }
            };
            let last_feedback_date = match feedback {
                None => None,
                Some(s) => match s.parse::<NaiveDate>() {
                    Ok(d) => Some(d),
                    Err(e) => {
                        warn!(cultivation_id = %id, "skipping: bad last_feedback_date: {e}");
                        scan.skipped
                            .push(format!("cultivation {id}: bad last_feedback_date: {e}"));
                        continue;
                    }
                },
            };

            scan.rows.push(CultivationRow {
                id,
                user_id,
                species_id,
                species_name,
                planted_date,
                start_method,
                adjustments,
                last_feedback_date,
                schedule,
            });
        }
        Ok(scan)
    }

    // --- notifications ------------------------------------------------------

    /// Whether a record already exists for the dedup key
    /// (cultivation, task type, date).
    pub fn notification_exists(
        &self,
        cultivation_id: &str,
        task_type: &str,
        scheduled_date: NaiveDate,
    ) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let n: i64 = db.query_row(
            "SELECT COUNT(*) FROM notifications
             WHERE cultivation_id = ?1 AND task_type = ?2 AND scheduled_date = ?3",
            rusqlite::params![cultivation_id, task_type, scheduled_date.to_string()],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    /// Persist a batch of candidates in one transaction.
    ///
    /// Conflicts with the per-day uniqueness key are silently dropped
    /// (`ON CONFLICT DO NOTHING`), so a retried run never duplicates; the
    /// returned count is rows actually inserted.
    pub fn insert_notifications(
        &self,
        batch: &[NewNotification],
        created_at: &str,
    ) -> Result<u32> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        let mut inserted = 0u32;
        for n in batch {
            let affected = tx.execute(
                "INSERT INTO notifications
                 (id, cultivation_id, user_id, task_type, description,
                  scheduled_date, sent_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)
                 ON CONFLICT (cultivation_id, task_type, scheduled_date) DO NOTHING",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    n.cultivation_id,
                    n.user_id,
                    n.task_type,
                    n.description,
                    n.scheduled_date.to_string(),
                    created_at,
                ],
            )?;
            inserted += affected as u32;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Fetch all undelivered records due on `date`, oldest first.
    pub fn pending_notifications(&self, date: NaiveDate) -> Result<Vec<NotificationRecord>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, cultivation_id, user_id, task_type, description,
                    scheduled_date, sent_at, created_at
             FROM notifications
             WHERE sent_at IS NULL AND scheduled_date = ?1
             ORDER BY created_at",
        )?;
        let records = stmt
            .query_map([date.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .filter_map(|r| {
                let (id, cultivation_id, user_id, task_type, description, sched, sent_at, created_at) =
                    r.ok()?;
                let scheduled_date = sched.parse::<NaiveDate>().ok()?;
                Some(NotificationRecord {
                    id,
                    cultivation_id,
                    user_id,
                    task_type,
                    description,
                    scheduled_date,
                    sent_at,
                    created_at,
                })
            })
            .collect();
        Ok(records)
    }

    /// Flip a record to delivered. The `sent_at IS NULL` guard makes the
    /// transition one-way: returns false when another tick already won.
    pub fn mark_sent(&self, id: &str, sent_at: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE notifications SET sent_at = ?1 WHERE id = ?2 AND sent_at IS NULL",
            rusqlite::params![sent_at, id],
        )?;
        Ok(n == 1)
    }

    // --- preferences --------------------------------------------------------

    /// Upsert a user's delivery preferences.
    pub fn set_preference(
        &self,
        user_id: &str,
        watering_reminders_enabled: bool,
        preferred_hour: Option<u8>,
    ) -> Result<()> {
        if let Some(h) = preferred_hour {
            if h > 23 {
                return Err(StoreError::InvalidPreference {
                    user_id: user_id.to_string(),
                    reason: format!("preferred_hour must be 0-23, got {h}"),
                });
            }
        }
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO notification_preferences
             (user_id, watering_reminders_enabled, preferred_hour, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                watering_reminders_enabled = excluded.watering_reminders_enabled,
                preferred_hour = excluded.preferred_hour,
                updated_at = excluded.updated_at",
            rusqlite::params![user_id, watering_reminders_enabled as i32, preferred_hour, now],
        )?;
        Ok(())
    }

    /// Fetch a user's preferences; None when no row exists. An out-of-range
    /// stored hour falls back to None rather than failing the delivery run.
    pub fn preference_for(&self, user_id: &str) -> Result<Option<NotificationPreference>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT watering_reminders_enabled, preferred_hour
                 FROM notification_preferences WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, i32>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                    ))
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(row.map(|(enabled, hour)| {
            let preferred_hour = match hour {
                Some(h) if (0..=23).contains(&h) => Some(h as u8),
                Some(h) => {
                    warn!(user_id, hour = h, "stored preferred_hour out of range; using default");
                    None
                }
                None => None,
            };
            NotificationPreference {
                user_id: user_id.to_string(),
                watering_reminders_enabled: enabled != 0,
                preferred_hour,
            }
        }))
    }
}
