//! HTTP router.
//!
//! Defines the axum router with all gateway endpoints.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{
    add_customer, customers_page, dashboard, documents_page, execute_query, health_check,
    required_documents, submit_document,
};
use crate::AppState;

/// Create the main router for the gateway
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Natural-language query box
        .route("/query", post(execute_query))
        // Customer registration
        .route("/customers", get(customers_page).post(add_customer))
        // Document submission
        .route("/documents", get(documents_page).post(submit_document))
        .route("/required_documents", get(required_documents))
        // Status dashboard
        .route("/dashboard", get(dashboard))
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}
