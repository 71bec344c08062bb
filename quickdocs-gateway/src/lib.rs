//! # QuickDocs Gateway
//!
//! HTTP service for the QuickDocs document-submission tracker.
//!
//! ## Architecture
//!
//! ```text
//! Client → form/JSON → Gateway → translator/store → SQLite
//! ```
//!
//! The gateway exposes the natural-language `/query` endpoint (translated by
//! `quickdocs-core` and executed with bound parameters) alongside the CRUD
//! routes for registering customers, submitting documents, and the status
//! dashboard.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quickdocs_gateway::Gateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = Gateway::builder()
//!         .database("sqlite://quickdocs.db")
//!         .bind("0.0.0.0:8080")
//!         .build_and_init()
//!         .await?;
//!
//!     gateway.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod store;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use server::{AppState, Gateway};
