//! Canonical response envelope returned by every endpoint.
//!
//! Every body has the shape `{ fulfilled, data?, errors?, pagination? }`.
//! A key is present only when its value is non-empty; absence (never `null`)
//! means "not applicable".
//!
//! - Success envelopes never carry `errors`.
//! - Failure envelopes never carry `data` or `pagination`.
//! - `pagination` is only attached alongside `data`.
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::envelope::{self, FieldErrors};
//! use serde_json::json;
//!
//! let ok = envelope::build_success(json!({ "token_type": "Bearer" }));
//! assert_eq!(
//!     serde_json::to_value(&ok).unwrap(),
//!     json!({ "fulfilled": true, "data": { "token_type": "Bearer" } })
//! );
//!
//! let failed = envelope::build_error(FieldErrors::single("email", envelope::NOT_FOUND));
//! assert_eq!(
//!     serde_json::to_value(&failed).unwrap(),
//!     json!({ "fulfilled": false, "errors": { "email": ["Not found"] } })
//! );
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Error token for a missing record.
pub const NOT_FOUND: &str = "Not found";
/// Error token for a credential mismatch.
pub const INVALID: &str = "Invalid";
/// Error token for a failed write.
pub const SAVE_FAILED: &str = "Save failed";
/// Error token for a rejected actor.
pub const UNAUTHORIZE: &str = "Unauthorize";
/// Error token for failures the client cannot act on.
pub const INTERNAL_ERROR: &str = "Internal error";

/// Field name to ordered violation messages.
///
/// Each field appears once; its messages keep the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// An error set holding one message for one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends `message` to the messages already recorded for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Offset pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// A built response envelope.
///
/// The two variants make the data/errors exclusivity structural: a success
/// cannot hold errors and a failure cannot hold data.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success {
        data: Option<Value>,
        pagination: Option<Value>,
    },
    Failure {
        errors: FieldErrors,
    },
}

impl Envelope {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Envelope::Success { data, .. } => data.as_ref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn pagination(&self) -> Option<&Value> {
        match self {
            Envelope::Success { pagination, .. } => pagination.as_ref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Envelope::Failure { errors } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }

    /// Renders the envelope as a JSON response with `status`.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("fulfilled", &self.is_fulfilled())?;
        match self {
            Envelope::Success { data, pagination } => {
                if let Some(data) = data {
                    map.serialize_entry("data", data)?;
                }
                if let Some(pagination) = pagination {
                    map.serialize_entry("pagination", pagination)?;
                }
            }
            Envelope::Failure { errors } => {
                if !errors.is_empty() {
                    map.serialize_entry("errors", errors)?;
                }
            }
        }
        map.end()
    }
}

/// OpenAPI description of [`Envelope`].
#[derive(ToSchema)]
#[schema(as = Envelope)]
#[allow(dead_code)]
pub struct EnvelopeSchema {
    fulfilled: bool,
    #[schema(value_type = Option<Object>)]
    data: Option<Value>,
    errors: Option<FieldErrors>,
    pagination: Option<Pagination>,
}

/// `null`, `""`, `[]` and `{}` count as "no value".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn non_empty(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !is_empty_value(v))
}

/// Serializes a payload for the envelope.
///
/// A payload that cannot be represented as JSON becomes an internal-error
/// failure instead of being silently dropped.
fn to_payload<T: Serialize>(payload: T) -> Result<Value, Envelope> {
    serde_json::to_value(payload).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize envelope payload");
        Envelope::Failure {
            errors: FieldErrors::single("server", INTERNAL_ERROR),
        }
    })
}

/// Builds an envelope, dropping empty parts.
///
/// Failures discard `data` and `pagination`; successes discard `errors`.
/// `pagination` survives only when `data` does.
pub fn build(
    fulfilled: bool,
    data: Option<Value>,
    errors: Option<FieldErrors>,
    pagination: Option<Value>,
) -> Envelope {
    if !fulfilled {
        return Envelope::Failure {
            errors: errors.unwrap_or_default(),
        };
    }

    let data = non_empty(data);
    let pagination = if data.is_some() {
        non_empty(pagination)
    } else {
        None
    };

    Envelope::Success { data, pagination }
}

pub fn build_error(errors: FieldErrors) -> Envelope {
    build(false, None, Some(errors), None)
}

pub fn build_success<T: Serialize>(data: T) -> Envelope {
    match to_payload(data) {
        Ok(data) => build(true, Some(data), None, None),
        Err(failure) => failure,
    }
}

pub fn build_success_with_pagination<T: Serialize, P: Serialize>(
    data: T,
    pagination: P,
) -> Envelope {
    let data = match to_payload(data) {
        Ok(data) => data,
        Err(failure) => return failure,
    };
    let pagination = match to_payload(pagination) {
        Ok(pagination) => pagination,
        Err(failure) => return failure,
    };
    build(true, Some(data), None, Some(pagination))
}

/// `{ fulfilled: false, errors: { data: ["Not found"] } }`
pub fn build_not_found() -> Envelope {
    build_error(FieldErrors::single("data", NOT_FOUND))
}

/// `{ fulfilled: false, errors: { user: ["Unauthorize"] } }`
pub fn build_unauthorize() -> Envelope {
    build_error(FieldErrors::single("user", UNAUTHORIZE))
}
