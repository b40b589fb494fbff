//! Plan Catalog Library
//!
//! Internet plan catalog and recommendation service for Plan Advisor.
//!
//! This library provides:
//! - An in-memory, read-only catalog store seeded at startup
//! - A query service for filtering, paginated search and price statistics
//! - A recommendation engine that scores plans against user preferences
//! - The axum HTTP layer exposing all of the above as JSON
//!
//! # Quick Start
//!
//! ```no_run
//! use plan_catalog::{
//!     config::PlanCatalogConfig,
//!     fixtures,
//!     handlers::{create_router, AppState},
//!     repository::MemoryPlanRepository,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(PlanCatalogConfig::default());
//!     let repository = Arc::new(MemoryPlanRepository::new(fixtures::default_plans())?);
//!
//!     let app = create_router(AppState::new(config.clone(), repository));
//!     let listener = tokio::net::TcpListener::bind(config.server.socket_addr()?).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

pub mod config;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod repository;
pub mod services;

// Re-export commonly used types
pub use config::{Args, PlanCatalogConfig};
pub use error::ApiError;
pub use handlers::{create_router, AppState};
pub use repository::{MemoryPlanRepository, PlanRepository};
pub use services::{PlanService, RecommendationService};

/// Plan catalog domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Malformed or out-of-range caller input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Required input missing
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PlanError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Result type alias for the plan catalog library
pub type Result<T> = std::result::Result<T, PlanError>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3001;

/// Page size used by `/plans/search` when the client sends none
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Upper bound on a single search page
pub const MAX_PAGE_SIZE: usize = 100;
