use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_NOTIFY_HOUR;

pub const DEFAULT_PORT: u16 = 8745;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (saien.toml + SAIEN_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaienConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// How a per-instance watering adjustment delta combines with the
/// seasonally-adjusted base interval.
///
/// Selected once per deployment; there is deliberately no way to mix both
/// modes in a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentMode {
    /// The delta is a signed number of days added after seasonal rounding.
    #[default]
    AdditiveDays,
    /// The delta is a signed fraction (`-0.2` ⇒ ×0.8) applied to the
    /// seasonally-adjusted interval before rounding.
    Multiplicative,
}

/// Which signals suppress a due watering reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Only the per-day uniqueness check: skip when a record for
    /// (instance, watering, today) already exists.
    #[default]
    ExactDayOnly,
    /// Additionally treat explicit user feedback within the last day as a
    /// signal not to re-prompt.
    FeedbackCooldown,
}

/// Engine policy knobs. The mode/policy pairs replace what used to exist as
/// divergent copies of the scheduling function upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub adjustment_mode: AdjustmentMode,
    #[serde(default)]
    pub dedup_policy: DedupPolicy,
    /// Delivery hour (0–23 JST) for users without a preferred hour.
    #[serde(default = "default_notify_hour")]
    pub default_notify_hour: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adjustment_mode: AdjustmentMode::default(),
            dedup_policy: DedupPolicy::default(),
            default_notify_hour: DEFAULT_NOTIFY_HOUR,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_notify_hour() -> u8 {
    DEFAULT_NOTIFY_HOUR
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.saien/saien.db", home)
}

impl SaienConfig {
    /// Load config from a TOML file with SAIEN_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.saien/saien.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SaienConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SAIEN_").split("_"))
            .extract()
            .map_err(|e| crate::error::SaienError::Config(e.to_string()))?;

        if config.engine.default_notify_hour > 23 {
            return Err(crate::error::SaienError::Config(format!(
                "engine.default_notify_hour must be 0-23, got {}",
                config.engine.default_notify_hour
            )));
        }

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.saien/saien.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pick_additive_exact_day() {
        let cfg = SaienConfig::default();
        assert_eq!(cfg.engine.adjustment_mode, AdjustmentMode::AdditiveDays);
        assert_eq!(cfg.engine.dedup_policy, DedupPolicy::ExactDayOnly);
        assert_eq!(cfg.engine.default_notify_hour, 7);
    }

    #[test]
    fn policy_enums_use_kebab_case() {
        let mode: AdjustmentMode = serde_json::from_str("\"multiplicative\"").unwrap();
        assert_eq!(mode, AdjustmentMode::Multiplicative);
        let policy: DedupPolicy = serde_json::from_str("\"feedback-cooldown\"").unwrap();
        assert_eq!(policy, DedupPolicy::FeedbackCooldown);
        assert_eq!(
            serde_json::to_string(&AdjustmentMode::AdditiveDays).unwrap(),
            "\"additive-days\""
        );
    }
}
