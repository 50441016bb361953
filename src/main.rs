use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod pages;
mod reports;
mod state;
mod transactions;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::db::Database;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "laundrypro=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = Arc::new(Database::new(&config.database_url, config.max_connections));

    // The pool is lazy; an unreachable database at boot is retried per request.
    if let Err(e) = db.migrate().await {
        tracing::warn!(error = %e, "migrations not applied; continuing");
    }

    let state = AppState::init(config.clone(), db);
    let app = app::build_app(state);
    app::serve(app, &config).await
}
