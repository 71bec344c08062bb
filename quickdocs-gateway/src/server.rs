//! Gateway server implementation
//!
//! Main entry point for running the QuickDocs gateway.

use std::sync::Arc;

use tokio::net::TcpListener;

use quickdocs_core::engine::Db;
use quickdocs_core::schema::{ensure_schema, seed_if_empty};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::router::create_router;
use crate::store::Store;

/// Shared state for the gateway
pub struct AppState {
    pub db: Db,
    pub store: Store,
    pub config: GatewayConfig,
}

/// The QuickDocs gateway server
pub struct Gateway {
    config: GatewayConfig,
    state: Option<Arc<AppState>>,
}

impl Gateway {
    /// Create a new gateway with the given configuration
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a gateway builder
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// Initialize the gateway (connect, apply schema, seed on first run)
    pub async fn init(&mut self) -> Result<(), GatewayError> {
        tracing::info!("Initializing QuickDocs gateway...");

        tracing::info!(url = %self.config.database_url, "connecting to database");
        let db = Db::connect(&self.config.database_url)
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        ensure_schema(db.pool())
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;
        if seed_if_empty(db.pool())
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?
        {
            tracing::info!("empty database, loaded sample data");
        }

        let store = Store::new(db.pool().clone());

        self.state = Some(Arc::new(AppState {
            db,
            store,
            config: self.config.clone(),
        }));

        tracing::info!("Gateway initialized");
        Ok(())
    }

    /// Start serving requests
    ///
    /// # Errors
    /// Returns error if server fails to start
    pub async fn serve(&self) -> Result<(), GatewayError> {
        let state = self.state.as_ref().ok_or_else(|| {
            GatewayError::Config("Gateway not initialized. Call init() first.".to_string())
        })?;

        let router = create_router(Arc::clone(state));

        let addr = &self.config.bind_address;
        tracing::info!("QuickDocs gateway starting on {}", addr);
        tracing::info!("   POST /query      - Natural-language queries");
        tracing::info!("   GET  /customers  - Customers and open processes");
        tracing::info!("   GET  /documents  - Submission page data");
        tracing::info!("   GET  /dashboard  - Assignment status overview");
        tracing::info!("   GET  /health     - Health check");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to bind to {addr}: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| GatewayError::Internal(e.into()))?;

        Ok(())
    }
}

/// Builder for the Gateway
#[derive(Debug, Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
}

impl GatewayBuilder {
    /// Set the database URL
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the bind address
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    /// Build the gateway
    pub fn build(self) -> Gateway {
        Gateway::new(self.config)
    }

    /// Build and initialize the gateway
    ///
    /// # Errors
    /// Returns error if initialization fails
    pub async fn build_and_init(self) -> Result<Gateway, GatewayError> {
        let mut gateway = self.build();
        gateway.init().await?;
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_builds_state_and_router() {
        let gateway = Gateway::builder()
            .database("sqlite::memory:")
            .bind("127.0.0.1:0")
            .build_and_init()
            .await
            .unwrap();

        let state = gateway.state.as_ref().unwrap();
        // First run against an empty database loads the sample data.
        let customers = state.store.list_customers().await.unwrap();
        assert!(!customers.is_empty());

        let _router = create_router(Arc::clone(state));
    }

    #[tokio::test]
    async fn test_serve_without_init_is_config_error() {
        let gateway = Gateway::new(GatewayConfig::default());
        let err = gateway.serve().await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
