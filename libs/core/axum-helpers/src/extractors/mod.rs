//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with the standard envelope so handlers only ever see
//! parsed, validated input.

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::{RequestRules, ValidatedJson};
