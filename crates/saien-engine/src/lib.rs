//! `saien-engine` — the scheduling-and-delivery-gating core.
//!
//! # Overview
//!
//! Two stateless batch passes, each invoked by an external periodic trigger
//! with an explicit UTC instant (no implicit global clock):
//!
//! | Pass                           | Behaviour                                            |
//! |--------------------------------|------------------------------------------------------|
//! | [`scheduler::SchedulerEngine`] | Emits today's due care tasks as notification records |
//! | [`gate::DeliveryGate`]         | Marks pending records delivered at the right hour    |
//!
//! The scheduler applies seasonal modulation and per-instance adjustments,
//! then dedups against history via the store's per-day uniqueness key, so
//! both passes are safe to re-run at any time.

pub mod adjust;
pub mod error;
pub mod gate;
pub mod scheduler;
pub mod summary;

pub use error::{EngineError, Result};
pub use gate::DeliveryGate;
pub use scheduler::SchedulerEngine;
pub use summary::{GateRunSummary, SchedulerRunSummary};
