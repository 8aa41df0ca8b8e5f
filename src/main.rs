//! Papers server: per-user file and folder hierarchy over HTTP.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use papers_api::AppState;
use papers_core::config::{AppConfig, StoreBackend};
use papers_core::error::AppError;
use papers_core::traits::{BlobStore, EntityStore};
use papers_database::migration::run_migrations;
use papers_database::{DatabasePool, MemoryStore, PgNodeStore, PgUserStore};
use papers_entity::node::Node;
use papers_entity::user::User;
use papers_storage::LocalBlobStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("PAPERS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Papers v{}", env!("CARGO_PKG_VERSION"));

    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage.upload_root).await?);
    tracing::info!(root = %config.storage.upload_root, "Blob store ready");

    let mut db = None;
    let (nodes, users): (Arc<dyn EntityStore<Node>>, Arc<dyn EntityStore<User>>) =
        match config.database.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory entity store; data is lost on restart");
                (
                    Arc::new(MemoryStore::<Node>::new()),
                    Arc::new(MemoryStore::<User>::new()),
                )
            }
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                tracing::info!("Running database migrations...");
                run_migrations(pool.pool()).await?;
                let stores: (Arc<dyn EntityStore<Node>>, Arc<dyn EntityStore<User>>) = (
                    Arc::new(PgNodeStore::new(pool.pool().clone())),
                    Arc::new(PgUserStore::new(pool.pool().clone())),
                );
                db = Some(pool);
                stores
            }
        };

    let state = AppState::assemble(config, nodes, users, blobs);
    papers_api::serve(state).await?;

    if let Some(pool) = db {
        pool.close().await;
    }
    tracing::info!("Papers server shut down gracefully");
    Ok(())
}
