pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{LookupError, PipelineError, Stage, StoreError, StoreResult};
pub use logic::{EnrichmentPipeline, HttpNameLookup, NameLookup};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::api::routes::{create_router, AppState};
use crate::config::AppConfig;

/// Router with state attached, ready to serve.
pub fn build_app<S: Store + 'static>(store: Arc<S>, lookup: Arc<dyn NameLookup>) -> Router {
    create_router::<S>().with_state(AppState::new(store, lookup))
}

/// Load config, connect to PostgreSQL, migrate and serve until Ctrl-C/SIGTERM.
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init(&config.logging.level);
    log::info!("Configuration loaded: server={}", config.server_address());

    log::info!("Connecting to PostgreSQL...");
    let postgres_store = PostgresStore::new(&config.database_url(), config.max_connections()).await?;
    log::info!("Database connected");

    if config.database.run_migrations {
        postgres_store.migrate().await?;
        log::info!("Database migrated");
    }

    let lookup = HttpNameLookup::new(&config.enrichment)?;
    let app = build_app(Arc::new(postgres_store), Arc::new(lookup));

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    logging::flush();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}
