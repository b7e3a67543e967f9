//! Bearer-token authentication.
//!
//! - [`JwtAuth`] issues and verifies HS256 access tokens
//! - [`jwt_auth_middleware`] guards routes and stores [`JwtClaims`] in request extensions
//! - [`Actor`] hands the authenticated user id to handlers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::{DEFAULT_ACCESS_TOKEN_TTL, JwtConfig};
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{Actor, jwt_auth_middleware};
