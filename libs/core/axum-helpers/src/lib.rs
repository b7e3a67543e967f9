//! # Axum Helpers
//!
//! Shared building blocks for the Axum services in this workspace.
//!
//! ## Modules
//!
//! - **[`envelope`]**: The `{ fulfilled, data, errors, pagination }` response body
//! - **[`validation`]**: Ordered, accumulating field rules
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON)
//! - **[`auth`]**: JWT bearer authentication
//! - **[`server`]**: Server setup, health checks, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let api_routes = Router::new(); // Add your routes
//!     let router = create_router::<ApiDoc>(api_routes, &config)?;
//!
//!     create_production_app(router, &config, async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod envelope;
pub mod extractors;
pub mod server;
pub mod validation;

// Re-export auth types
pub use auth::{Actor, DEFAULT_ACCESS_TOKEN_TTL, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};

// Re-export envelope types
pub use envelope::{Envelope, FieldErrors, Pagination};

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

// Re-export extractors
pub use extractors::{RequestRules, UuidPath, ValidatedJson};

pub use validation::{Rule, RuleSet};
