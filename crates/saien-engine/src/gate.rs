use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use saien_core::calendar::{ensure_utc_clock, reference_date, reference_hour};
use saien_store::Store;

use crate::error::Result;
use crate::summary::GateRunSummary;

/// Decides, for every due-but-unsent notification, whether *now* is the
/// moment to mark it delivered.
///
/// Per record: pending (sent_at null) → delivered (sent_at set), one way.
/// A record that misses its hour simply stays pending for a later tick.
pub struct DeliveryGate {
    store: Arc<Store>,
    default_notify_hour: u8,
}

impl DeliveryGate {
    pub fn new(store: Arc<Store>, default_notify_hour: u8) -> Self {
        Self {
            store,
            default_notify_hour,
        }
    }

    /// Run one delivery pass for the reference-zone date and hour of `now`.
    ///
    /// Per-record failures are reported in the summary and never block
    /// siblings; only configuration faults and the initial pending query can
    /// fail the pass.
    pub fn run(&self, now: DateTime<Utc>) -> Result<GateRunSummary> {
        ensure_utc_clock()?;
        let today = reference_date(now);
        let current_hour = reference_hour(now);
        info!(%today, current_hour, "delivery pass started");

        let pending = self.store.pending_notifications(today)?;
        let mut summary = GateRunSummary::default();
        let sent_at = now.to_rfc3339();

        for record in pending {
            summary.scanned += 1;

            let pref = match self.store.preference_for(&record.user_id) {
                Ok(Some(p)) => p,
                Ok(None) => {
                    // One user's missing profile must not block the batch.
                    debug!(user_id = %record.user_id, "no preferences; leaving pending");
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(notification_id = %record.id, "preference lookup failed: {e}");
                    summary
                        .errors
                        .push(format!("notification {}: preference lookup: {e}", record.id));
                    continue;
                }
            };

            if !pref.watering_reminders_enabled {
                debug!(user_id = %record.user_id, "reminders disabled; skipping");
                summary.skipped += 1;
                continue;
            }

            let target_hour = pref.preferred_hour.unwrap_or(self.default_notify_hour);
            if current_hour != target_hour {
                debug!(
                    notification_id = %record.id,
                    current_hour,
                    target_hour,
                    "outside delivery hour; leaving pending"
                );
                summary.skipped += 1;
                continue;
            }

            match self.store.mark_sent(&record.id, &sent_at) {
                Ok(true) => {
                    info!(
                        notification_id = %record.id,
                        task_type = %record.task_type,
                        "notification delivered"
                    );
                    summary.delivered += 1;
                }
                Ok(false) => {
                    // Another tick won the sent_at race — a no-op, not a fault.
                    debug!(notification_id = %record.id, "already delivered");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(notification_id = %record.id, "delivery update failed: {e}");
                    summary
                        .errors
                        .push(format!("notification {}: {e}", record.id));
                }
            }
        }

        info!(
            scanned = summary.scanned,
            delivered = summary.delivered,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "delivery pass finished"
        );
        Ok(summary)
    }
}
