use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saien_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > SAIEN_CONFIG env > ~/.saien/saien.toml
    let config_path = std::env::var("SAIEN_CONFIG").ok();
    let config =
        saien_core::config::SaienConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            saien_core::config::SaienConfig::default()
        });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = Arc::new(saien_store::Store::new(db)?);
    info!("database migrations complete");

    let scheduler = saien_engine::SchedulerEngine::new(Arc::clone(&store), config.engine.clone());
    let gate =
        saien_engine::DeliveryGate::new(Arc::clone(&store), config.engine.default_notify_hour);

    let state = Arc::new(app::AppState::new(config, scheduler, gate));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("saien gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
