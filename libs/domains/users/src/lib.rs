//! Users Domain
//!
//! Registration, login and owner-only management of user accounts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, envelope responses
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Requests   │  ← Authorization and rule sets per body
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, actor checks
//! └──┬───────┬──┘
//!    │       │
//! ┌──▼────┐ ┌▼────────────┐
//! │ Repo  │ │ Credentials │  ← Storage / hashing and tokens
//! └───────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::auth::{JwtAuth, JwtConfig};
//! use domain_users::{Argon2Credentials, InMemoryUserRepository, UserService, handlers};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars"));
//! let service = UserService::new(
//!     InMemoryUserRepository::new(),
//!     Argon2Credentials::new(jwt.clone()),
//! );
//!
//! let router: axum::Router = handlers::router(service, jwt);
//! ```

pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod requests;
pub mod service;

// Re-export commonly used types
pub use credentials::{Argon2Credentials, BearerToken, CredentialService};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{LoginUser, RegisterUser, UpdateUser, User, UserFilter, UserResponse};
pub use postgres::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
