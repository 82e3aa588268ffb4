use saien_core::SaienError;
use saien_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Clock or configuration fault from the core layer — aborts the run.
    #[error(transparent)]
    Core(#[from] SaienError),

    /// Store-layer fault. Template validation failures abort the run; the
    /// batch insert failing fails the whole scheduler pass (retry-safe).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Short error code string returned in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Core(e) => e.code(),
            EngineError::Store(StoreError::InvalidTemplate { .. }) => "CONFIG_ERROR",
            EngineError::Store(StoreError::InvalidPreference { .. }) => "CONFIG_ERROR",
            EngineError::Store(_) => "DATABASE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
