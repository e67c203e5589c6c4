use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use fluxoazul::{
    api::{self, AppState},
    config::{CliArgs, Config, StorageKind},
    seed::SeedData,
    storage::{InMemoryStorage, StorageBackend},
    telemetry,
};
use fluxoazul_sqlite::SqliteStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    telemetry::init_logging(&config.logging);
    let metrics = telemetry::init_metrics().context("failed to install metrics recorder")?;

    let storage: Arc<dyn StorageBackend> = match config.storage.backend {
        StorageKind::Memory => {
            tracing::info!("Using in-memory storage");
            Arc::new(InMemoryStorage::new())
        }
        StorageKind::Sqlite => {
            tracing::info!(path = %config.storage.path, "Using SQLite storage");
            Arc::new(SqliteStorage::new(&config.storage.path).context("failed to open SQLite storage")?)
        }
    };

    if let Some(path) = &config.seed {
        let seed = SeedData::load(path).with_context(|| format!("failed to load seed file {}", path))?;
        seed.apply(storage.clone()).context("failed to apply seed data")?;
    }

    if config.auth.enabled {
        tracing::info!(keys = config.auth.api_keys.len(), "API key authentication enabled");
    } else {
        tracing::warn!("Authentication disabled, every caller is treated as admin");
    }
    if config.support_chat.api_key.is_none() {
        tracing::info!("Support chat API key not set, chat endpoint will report it as unavailable");
    }

    let state = AppState::new(&config, storage, metrics);
    let app = api::router(state, Arc::new(config.auth.clone()));

    let addr = config.listen_addr().context("invalid listen address")?;
    tracing::info!(%addr, "API listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
