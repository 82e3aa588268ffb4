use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the plant was started. Selects the schedule variant and whether the
/// per-template germination offset applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMethod {
    FromSeed,
    FromSeedling,
}

impl std::fmt::Display for StartMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartMethod::FromSeed => write!(f, "from_seed"),
            StartMethod::FromSeedling => write!(f, "from_seedling"),
        }
    }
}

impl std::str::FromStr for StartMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "from_seed" => Ok(StartMethod::FromSeed),
            "from_seedling" => Ok(StartMethod::FromSeedling),
            other => Err(format!("unknown start method: {other}")),
        }
    }
}

/// Lifecycle state of a cultivation. Only `Growing` instances participate in
/// scheduling; the terminal states are kept for the owner's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CultivationStatus {
    Growing,
    Harvested,
    Failed,
}

impl std::fmt::Display for CultivationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CultivationStatus::Growing => write!(f, "growing"),
            CultivationStatus::Harvested => write!(f, "harvested"),
            CultivationStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for CultivationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "growing" => Ok(CultivationStatus::Growing),
            "harvested" => Ok(CultivationStatus::Harvested),
            "failed" => Ok(CultivationStatus::Failed),
            other => Err(format!("unknown cultivation status: {other}")),
        }
    }
}

/// One dated milestone in a schedule template ("thin seedlings" on day 14,
/// "harvest window" on day 60, …). `day_offset` counts from the recorded
/// planting date, not from germination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneTask {
    pub day_offset: u32,
    pub task_type: String,
    pub description: String,
}

/// Species-level care schedule for one start method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    #[serde(default)]
    pub tasks: Vec<MilestoneTask>,
    /// Base days between waterings absent any adjustment. Must be ≥ 1.
    pub watering_base_interval_days: u32,
    /// Absent means no recurring fertilizer reminder.
    #[serde(default)]
    pub fertilizer_interval_days: Option<u32>,
}

impl ScheduleTemplate {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.watering_base_interval_days == 0 {
            return Err("watering_base_interval_days must be >= 1".to_string());
        }
        if self.fertilizer_interval_days == Some(0) {
            return Err("fertilizer_interval_days must be >= 1 when set".to_string());
        }
        for task in &self.tasks {
            if task.task_type.is_empty() {
                return Err("milestone task_type must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Full schedule payload stored as JSON on the `species` row, keyed by start
/// method. A missing variant means instances with that start method have
/// nothing to schedule from and are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesSchedule {
    #[serde(default)]
    pub from_seed: Option<ScheduleTemplate>,
    #[serde(default)]
    pub from_seedling: Option<ScheduleTemplate>,
    /// Days added to every `from_seed` milestone offset to account for
    /// germination. Per-template policy; 0 means the offsets already include
    /// germination time.
    #[serde(default)]
    pub germination_offset_days: u32,
}

impl SpeciesSchedule {
    pub fn for_method(&self, method: StartMethod) -> Option<&ScheduleTemplate> {
        match method {
            StartMethod::FromSeed => self.from_seed.as_ref(),
            StartMethod::FromSeedling => self.from_seedling.as_ref(),
        }
    }

    /// Strict validation applied on ingestion and again when rows are read
    /// back for a scheduler run.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.from_seed.is_none() && self.from_seedling.is_none() {
            return Err("schedule must define at least one start-method variant".to_string());
        }
        if let Some(ref t) = self.from_seed {
            t.validate().map_err(|e| format!("from_seed: {e}"))?;
        }
        if let Some(ref t) = self.from_seedling {
            t.validate().map_err(|e| format!("from_seedling: {e}"))?;
        }
        Ok(())
    }
}

/// Input for creating a cultivation instance.
#[derive(Debug, Clone)]
pub struct NewCultivation {
    pub user_id: String,
    pub species_id: String,
    pub planted_date: NaiveDate,
    pub start_method: StartMethod,
    pub adjustments: HashMap<String, f64>,
    pub last_feedback_date: Option<NaiveDate>,
}

/// A growing cultivation joined with its species schedule — one scheduler
/// work item.
#[derive(Debug, Clone)]
pub struct CultivationRow {
    pub id: String,
    pub user_id: String,
    pub species_id: String,
    pub species_name: String,
    pub planted_date: NaiveDate,
    pub start_method: StartMethod,
    /// Adjustment key (e.g. `watering_interval_adjustment`) → signed delta.
    pub adjustments: HashMap<String, f64>,
    pub last_feedback_date: Option<NaiveDate>,
    pub schedule: SpeciesSchedule,
}

/// Result of scanning growing cultivations: readable rows plus one message
/// per row that had to be skipped (partial-data faults never abort the scan).
#[derive(Debug, Default)]
pub struct CultivationScan {
    pub rows: Vec<CultivationRow>,
    pub skipped: Vec<String>,
}

/// A notification candidate produced by the scheduler, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub cultivation_id: String,
    pub user_id: String,
    pub task_type: String,
    pub description: String,
    pub scheduled_date: NaiveDate,
}

/// A persisted notification record. `sent_at` is null until the delivery
/// gate marks it delivered; that transition happens exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub cultivation_id: String,
    pub user_id: String,
    pub task_type: String,
    pub description: String,
    pub scheduled_date: NaiveDate,
    pub sent_at: Option<String>,
    pub created_at: String,
}

/// Per-user delivery preferences, read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub user_id: String,
    pub watering_reminders_enabled: bool,
    /// Preferred delivery hour (0–23 JST). Absent means the configured
    /// default hour applies.
    pub preferred_hour: Option<u8>,
}
