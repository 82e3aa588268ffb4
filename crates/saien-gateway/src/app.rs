use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use saien_core::config::SaienConfig;
use saien_engine::{DeliveryGate, SchedulerEngine};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SaienConfig,
    pub scheduler: SchedulerEngine,
    pub gate: DeliveryGate,
}

impl AppState {
    pub fn new(config: SaienConfig, scheduler: SchedulerEngine, gate: DeliveryGate) -> Self {
        Self {
            config,
            scheduler,
            gate,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/runs/scheduler", post(crate::http::runs::run_scheduler))
        .route("/runs/delivery", post(crate::http::runs::run_delivery))
        .route("/runs/tick", post(crate::http::runs::run_tick))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
