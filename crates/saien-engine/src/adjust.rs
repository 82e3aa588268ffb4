//! Adjustment resolver — turns the per-instance adjustment map into
//! effective day offsets and watering intervals.

use std::collections::HashMap;

use saien_core::calendar::{MAX_WATERING_INTERVAL_DAYS, MIN_WATERING_INTERVAL_DAYS};
use saien_core::config::AdjustmentMode;

/// Adjustment-map key for the watering cadence.
pub const WATERING_ADJUSTMENT_KEY: &str = "watering_interval_adjustment";

/// Resolve the signed day delta for a milestone task. Looked up under
/// `"<task_type>_adjustment"`; absent means no adjustment.
pub fn milestone_delta(adjustments: &HashMap<String, f64>, task_type: &str) -> i64 {
    adjustments
        .get(&format!("{task_type}_adjustment"))
        .copied()
        .unwrap_or(0.0)
        .round() as i64
}

/// Resolve the raw watering delta (days or fraction, depending on mode).
pub fn watering_delta(adjustments: &HashMap<String, f64>) -> f64 {
    adjustments
        .get(WATERING_ADJUSTMENT_KEY)
        .copied()
        .unwrap_or(0.0)
}

/// Effective watering interval in days.
///
/// Seasonal modulation applies first; the personal delta then combines per
/// the configured [`AdjustmentMode`]. The result is clamped to
/// [1, 14] — a value that rounds to 0 or below is forced to 1.
pub fn watering_interval(
    base_interval_days: u32,
    season_multiplier: f64,
    delta: f64,
    mode: AdjustmentMode,
) -> u32 {
    let raw = match mode {
        AdjustmentMode::AdditiveDays => {
            (base_interval_days as f64 * season_multiplier).round() + delta.round()
        }
        AdjustmentMode::Multiplicative => {
            (base_interval_days as f64 * season_multiplier * (1.0 + delta)).round()
        }
    };
    raw.clamp(
        MIN_WATERING_INTERVAL_DAYS as f64,
        MAX_WATERING_INTERVAL_DAYS as f64,
    ) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(key: &str, value: f64) -> HashMap<String, f64> {
        HashMap::from([(key.to_string(), value)])
    }

    #[test]
    fn milestone_delta_defaults_to_zero() {
        assert_eq!(milestone_delta(&HashMap::new(), "thinning"), 0);
        assert_eq!(milestone_delta(&adj("thinning_adjustment", 3.0), "thinning"), 3);
        assert_eq!(milestone_delta(&adj("thinning_adjustment", -2.0), "thinning"), -2);
        // Other tasks' keys don't leak.
        assert_eq!(milestone_delta(&adj("harvest_adjustment", 5.0), "thinning"), 0);
    }

    #[test]
    fn summer_interval_rounds_before_modulo() {
        // 7 × 0.7 = 4.9 → 5
        assert_eq!(watering_interval(7, 0.7, 0.0, AdjustmentMode::AdditiveDays), 5);
    }

    #[test]
    fn additive_delta_shifts_after_seasonal_rounding() {
        assert_eq!(watering_interval(7, 0.7, 2.0, AdjustmentMode::AdditiveDays), 7);
        assert_eq!(watering_interval(7, 0.7, -3.0, AdjustmentMode::AdditiveDays), 2);
    }

    #[test]
    fn multiplicative_delta_scales_before_rounding() {
        // 7 × 1.0 × 0.8 = 5.6 → 6
        assert_eq!(
            watering_interval(7, 1.0, -0.2, AdjustmentMode::Multiplicative),
            6
        );
        // 10 × 1.0 × 1.3 = 13
        assert_eq!(
            watering_interval(10, 1.0, 0.3, AdjustmentMode::Multiplicative),
            13
        );
    }

    #[test]
    fn interval_is_always_within_bounds() {
        // Large negative delta would go to zero or below.
        assert_eq!(watering_interval(2, 0.7, -10.0, AdjustmentMode::AdditiveDays), 1);
        assert_eq!(
            watering_interval(1, 0.7, -1.0, AdjustmentMode::Multiplicative),
            1
        );
        // Winter on a long base interval would exceed the cap.
        assert_eq!(watering_interval(14, 1.5, 0.0, AdjustmentMode::AdditiveDays), 14);
        assert_eq!(
            watering_interval(14, 1.5, 0.5, AdjustmentMode::Multiplicative),
            14
        );
    }
}
