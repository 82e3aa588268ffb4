//! `saien-store` — the record store for the care-reminder engine.
//!
//! SQLite is the sole point of coordination between scheduler and delivery
//! runs: the `UNIQUE (cultivation_id, task_type, scheduled_date)` constraint
//! on `notifications` is what makes repeated or concurrent runs idempotent,
//! and the `sent_at IS NULL` guard on the delivery update is the only gate
//! against double delivery.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::Store;
