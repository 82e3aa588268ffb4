use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaienError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process clock is not UTC (local offset {offset_minutes} min); run with TZ=UTC")]
    ClockNotUtc { offset_minutes: i32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SaienError {
    /// Short error code string returned in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            SaienError::Config(_) => "CONFIG_ERROR",
            SaienError::ClockNotUtc { .. } => "CLOCK_NOT_UTC",
            SaienError::Serialization(_) => "SERIALIZATION_ERROR",
            SaienError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SaienError>;
