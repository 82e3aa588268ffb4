use thiserror::Error;

/// All store-layer errors. Kept separate from the engine's error type so the
/// gateway can map persistence faults without coupling layers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The species schedule column failed strict validation. This is a
    /// configuration fault: the scheduler run aborts rather than silently
    /// defaulting deep in the calculation.
    #[error("Invalid schedule template for species {species_id}: {reason}")]
    InvalidTemplate { species_id: String, reason: String },

    #[error("Invalid notification preference for user {user_id}: {reason}")]
    InvalidPreference { user_id: String, reason: String },

    #[error("Cultivation not found: {0}")]
    CultivationNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
