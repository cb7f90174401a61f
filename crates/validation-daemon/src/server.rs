//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::{DaemonConfig, StorageBackend};
use crate::engine::ValidationEngine;
use crate::error::{DaemonError, DaemonResult};
use crate::rules::RuleCatalog;
use crate::sparql::{QueryEndpoint, SparqlClient};
use crate::storage::{InMemoryStorage, SparqlStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Validation daemon server
pub struct Server {
    config: DaemonConfig,
    engine: ValidationEngine,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let endpoint: Arc<dyn QueryEndpoint> = Arc::new(
            SparqlClient::new(
                config.store.endpoint.clone(),
                Duration::from_secs(config.store.request_timeout_secs),
            )
            .map_err(|e| DaemonError::Config(format!("Invalid SPARQL client: {}", e)))?,
        );

        let storage: Arc<dyn Storage> = match config.store.backend {
            StorageBackend::Sparql => Arc::new(SparqlStorage::new(
                endpoint.clone(),
                config.store.graph.clone(),
            )),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; executions are lost on restart");
                Arc::new(InMemoryStorage::new())
            }
        };

        let catalog = match &config.catalog_path {
            Some(path) => RuleCatalog::load(path)?,
            None => {
                tracing::warn!("No validation catalog configured; executions will run no validations");
                RuleCatalog::default()
            }
        };

        Ok(Self::with_parts(config, storage, endpoint, catalog))
    }

    /// Create a server from already constructed parts
    pub fn with_parts(
        config: DaemonConfig,
        storage: Arc<dyn Storage>,
        endpoint: Arc<dyn QueryEndpoint>,
        catalog: RuleCatalog,
    ) -> Self {
        let engine = ValidationEngine::new(
            storage,
            endpoint,
            catalog,
            &config.engine,
            &config.resources,
        );
        Self { config, engine }
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        self.engine.catalog().log_summary();

        // Executions interrupted by a previous run must not stay ongoing
        self.engine.manager().recover_on_startup().await?;

        let app = create_router(AppState::new(self.engine.clone()), self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Validation daemon listening on {}", addr);
        tracing::info!(
            endpoint = %self.config.store.endpoint,
            graph = %self.config.store.graph,
            backend = ?self.config.store.backend,
            "Store configured"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Validation daemon shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
