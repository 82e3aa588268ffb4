//! Trigger endpoints — POST /runs/{scheduler,delivery,tick}
//!
//! The external cron hits these with no payload; each runs one stateless
//! batch pass and returns its summary. `/runs/tick` is the canonical cron
//! target: scheduler first, delivery gate after, matching the order the
//! record store expects.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use saien_engine::{EngineError, GateRunSummary, SchedulerRunSummary};

use crate::app::AppState;

#[derive(Serialize)]
pub struct RunErrorBody {
    pub error: String,
    pub code: &'static str,
}

type RunFailure = (StatusCode, Json<RunErrorBody>);

fn into_failure(e: EngineError) -> RunFailure {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RunErrorBody {
            error: e.to_string(),
            code: e.code(),
        }),
    )
}

/// POST /runs/scheduler — one scheduling pass for today.
pub async fn run_scheduler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchedulerRunSummary>, RunFailure> {
    state
        .scheduler
        .run(Utc::now())
        .map(Json)
        .map_err(into_failure)
}

/// POST /runs/delivery — one delivery-gate pass for the current hour.
pub async fn run_delivery(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GateRunSummary>, RunFailure> {
    state.gate.run(Utc::now()).map(Json).map_err(into_failure)
}

#[derive(Serialize)]
pub struct TickResponse {
    pub created_count: u32,
    pub delivered_count: u32,
    pub errors: Vec<String>,
}

/// POST /runs/tick — scheduler then delivery gate, combined summary.
pub async fn run_tick(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TickResponse>, RunFailure> {
    let now = Utc::now();
    let scheduled = state.scheduler.run(now).map_err(into_failure)?;
    let delivered = state.gate.run(now).map_err(into_failure)?;

    let mut errors = scheduled.errors;
    errors.extend(delivered.errors);
    Ok(Json(TickResponse {
        created_count: scheduled.created,
        delivered_count: delivered.delivered,
        errors,
    }))
}
