use serde::Serialize;

/// Outcome of one scheduler pass. Every skip or per-row failure is counted
/// here — nothing is swallowed into a successful-looking result.
#[derive(Debug, Default, Serialize)]
pub struct SchedulerRunSummary {
    /// Growing cultivations examined.
    pub scanned: u32,
    /// Notification records actually inserted (uniqueness conflicts excluded).
    pub created: u32,
    /// Cultivations or candidates skipped by policy (future planting date,
    /// missing template variant, dedup, feedback cooldown).
    pub skipped: u32,
    /// Partial-data faults: unreadable rows, one message each.
    pub errors: Vec<String>,
}

/// Outcome of one delivery-gate pass.
#[derive(Debug, Default, Serialize)]
pub struct GateRunSummary {
    /// Pending records examined.
    pub scanned: u32,
    /// Records marked delivered this pass.
    pub delivered: u32,
    /// Records left pending (wrong hour, reminders disabled, missing
    /// preferences) or already delivered by a concurrent tick.
    pub skipped: u32,
    /// Per-record failures; siblings are unaffected.
    pub errors: Vec<String>,
}
