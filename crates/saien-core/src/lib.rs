//! `saien-core` — shared configuration, calendar policy, and error types for
//! the saien care-reminder engine.
//!
//! Everything date-related in saien happens in one fixed reference zone
//! (JST, UTC+9); see [`calendar`] for the conversion helpers and the clock
//! guard that every engine entry point calls.

pub mod calendar;
pub mod config;
pub mod error;

pub use config::{AdjustmentMode, DedupPolicy, SaienConfig};
pub use error::{Result, SaienError};
