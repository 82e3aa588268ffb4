use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use saien_core::calendar::{
    days_since, ensure_utc_clock, reference_date, season_multiplier, FEEDBACK_COOLDOWN_DAYS,
};
use saien_core::config::{DedupPolicy, EngineConfig};
use saien_store::types::{CultivationRow, NewNotification, StartMethod};
use saien_store::Store;

use crate::adjust::{milestone_delta, watering_delta, watering_interval};
use crate::error::Result;
use crate::summary::SchedulerRunSummary;

/// Task type for the recurring watering reminder.
pub const WATERING_TASK: &str = "watering";
/// Task type for the recurring fertilizer reminder.
pub const FERTILIZING_TASK: &str = "fertilizing";

/// Computes the care tasks due today for every growing cultivation and
/// persists them as notification records.
///
/// One stateless batch pass per invocation; the caller supplies the current
/// instant. Policy knobs (adjustment mode, dedup policy) are fixed at
/// construction — there is exactly one scheduling code path.
pub struct SchedulerEngine {
    store: Arc<Store>,
    config: EngineConfig,
}

impl SchedulerEngine {
    pub fn new(store: Arc<Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Run one scheduling pass for the reference-zone date of `now`.
    ///
    /// Fails only on configuration faults (non-UTC clock, invalid template)
    /// and persistence faults (the batch insert); both leave the store in a
    /// state where re-running is safe thanks to the per-day uniqueness key.
    pub fn run(&self, now: DateTime<Utc>) -> Result<SchedulerRunSummary> {
        ensure_utc_clock()?;
        let today = reference_date(now);
        let multiplier = season_multiplier(today);
        info!(%today, multiplier, "scheduler pass started");

        let scan = self.store.growing_cultivations()?;
        let mut summary = SchedulerRunSummary {
            errors: scan.skipped,
            ..Default::default()
        };

        let mut batch: Vec<NewNotification> = Vec::new();
        for row in &scan.rows {
            summary.scanned += 1;
            self.collect_due_tasks(row, today, multiplier, &mut batch, &mut summary)?;
        }

        summary.created = self
            .store
            .insert_notifications(&batch, &now.to_rfc3339())?;
        info!(
            scanned = summary.scanned,
            created = summary.created,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "scheduler pass finished"
        );
        Ok(summary)
    }

    fn collect_due_tasks(
        &self,
        row: &CultivationRow,
        today: chrono::NaiveDate,
        multiplier: f64,
        batch: &mut Vec<NewNotification>,
        summary: &mut SchedulerRunSummary,
    ) -> Result<()> {
        let elapsed = days_since(row.planted_date, today);
        if elapsed < 0 {
            // Planting date in the future: nothing due, not an error.
            debug!(cultivation_id = %row.id, elapsed, "planted in the future; skipping");
            summary.skipped += 1;
            return Ok(());
        }

        let Some(template) = row.schedule.for_method(row.start_method) else {
            debug!(
                cultivation_id = %row.id,
                start_method = %row.start_method,
                "no template variant for start method; skipping"
            );
            summary.skipped += 1;
            return Ok(());
        };

        // Milestones fire on the exact effective day only — no catch-up.
        let germination = match row.start_method {
            StartMethod::FromSeed => row.schedule.germination_offset_days as i64,
            StartMethod::FromSeedling => 0,
        };
        for task in &template.tasks {
            let due_day =
                task.day_offset as i64 + germination + milestone_delta(&row.adjustments, &task.task_type);
            if elapsed == due_day {
                batch.push(NewNotification {
                    cultivation_id: row.id.clone(),
                    user_id: row.user_id.clone(),
                    task_type: task.task_type.clone(),
                    description: format!("{}: {}", row.species_name, task.description),
                    scheduled_date: today,
                });
            }
        }

        // Watering cadence.
        let interval = watering_interval(
            template.watering_base_interval_days,
            multiplier,
            watering_delta(&row.adjustments),
            self.config.adjustment_mode,
        );
        if elapsed > 0 && elapsed % interval as i64 == 0 {
            if self.watering_suppressed(row, today)? {
                summary.skipped += 1;
            } else {
                batch.push(NewNotification {
                    cultivation_id: row.id.clone(),
                    user_id: row.user_id.clone(),
                    task_type: WATERING_TASK.to_string(),
                    description: format!(
                        "Time to water your {}. Check the soil before watering.",
                        row.species_name
                    ),
                    scheduled_date: today,
                });
            }
        }

        // Fertilizer cadence — no dedup beyond the per-day uniqueness key.
        if let Some(fertilizer_interval) = template.fertilizer_interval_days {
            if elapsed > 0 && elapsed % fertilizer_interval as i64 == 0 {
                batch.push(NewNotification {
                    cultivation_id: row.id.clone(),
                    user_id: row.user_id.clone(),
                    task_type: FERTILIZING_TASK.to_string(),
                    description: format!("Time to fertilize your {}.", row.species_name),
                    scheduled_date: today,
                });
            }
        }

        Ok(())
    }

    /// Whether a due watering candidate should be suppressed: an existing
    /// record for today always wins; under the feedback-cooldown policy a
    /// very recent explicit feedback also suppresses re-prompting.
    fn watering_suppressed(&self, row: &CultivationRow, today: chrono::NaiveDate) -> Result<bool> {
        if self
            .store
            .notification_exists(&row.id, WATERING_TASK, today)?
        {
            debug!(cultivation_id = %row.id, "watering already recorded today");
            return Ok(true);
        }
        if self.config.dedup_policy == DedupPolicy::FeedbackCooldown {
            if let Some(feedback) = row.last_feedback_date {
                let since = days_since(feedback, today);
                if (0..=FEEDBACK_COOLDOWN_DAYS).contains(&since) {
                    warn!(
                        cultivation_id = %row.id,
                        days_since_feedback = since,
                        "recent feedback; suppressing watering reminder"
                    );
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
