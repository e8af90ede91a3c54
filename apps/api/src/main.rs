#[macro_use]
mod models;

mod applications;
mod auth;
mod companies;
mod config;
mod dashboard;
mod db;
mod errors;
mod extract;
mod jobs;
mod legacy;
mod profile;
mod resumes;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, PortalStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RozgarHub API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    info!("Record store ready (backend: {})", store.backend());

    let state = AppState::new(store, &config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn PortalStore>> {
    match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
