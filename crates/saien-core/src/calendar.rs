//! Fixed-zone calendar policy.
//!
//! All due-ness arithmetic runs on calendar dates in JST (UTC+9), never in
//! the process-local zone. A scheduler pod in us-east evaluating "today" in
//! its own zone would drift across the date boundary relative to the users,
//! so every engine entry point converts the current UTC instant through
//! [`reference_date`] / [`reference_hour`] and first calls
//! [`ensure_utc_clock`].

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc};

use crate::error::{Result, SaienError};

/// Fixed reference zone offset: JST is UTC+9 with no DST.
pub const JST_OFFSET_HOURS: i32 = 9;

/// Watering interval bounds after seasonal and personal adjustment.
pub const MIN_WATERING_INTERVAL_DAYS: u32 = 1;
pub const MAX_WATERING_INTERVAL_DAYS: u32 = 14;

/// Delivery hour used when a user has no preferred hour set (07:00 JST).
pub const DEFAULT_NOTIFY_HOUR: u8 = 7;

/// Feedback-cooldown dedup: a watering reminder is suppressed when explicit
/// user feedback arrived within this many days.
pub const FEEDBACK_COOLDOWN_DAYS: i64 = 1;

fn reference_zone() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_HOURS * 3600).unwrap()
}

/// Seasonal scaling factor for the base watering interval.
///
/// Summer (Jun–Aug) waters more often (×0.7), winter (Dec–Feb) less often
/// (×1.5), spring and autumn use the base interval unchanged.
pub fn season_multiplier(date: NaiveDate) -> f64 {
    match date.month() {
        6..=8 => 0.7,
        12 | 1 | 2 => 1.5,
        _ => 1.0,
    }
}

/// Whole calendar days from `planted` to `reference`. Negative when the
/// planting date lies in the future.
pub fn days_since(planted: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - planted).num_days()
}

/// Project a UTC instant into the fixed reference zone.
pub fn reference_time(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&reference_zone())
}

/// The calendar date "today" as the users experience it.
pub fn reference_date(now: DateTime<Utc>) -> NaiveDate {
    reference_time(now).date_naive()
}

/// Current hour of day (0–23) in the reference zone.
pub fn reference_hour(now: DateTime<Utc>) -> u8 {
    reference_time(now).hour() as u8
}

/// Fail fast when the process clock is not normalized to UTC.
///
/// The fixed-offset conversion above is only correct when the instants we
/// start from are genuine UTC; a host configured with a local zone would
/// shift every date boundary. Same guard the batch runner applies before
/// every run.
pub fn ensure_utc_clock() -> Result<()> {
    let offset_secs = chrono::Local::now().offset().fix().local_minus_utc();
    if offset_secs != 0 {
        return Err(SaienError::ClockNotUtc {
            offset_minutes: offset_secs / 60,
        });
    }
    Ok(())
}
