//! UUID path parameter extractor.

use crate::envelope;
use axum::{
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Extractor for a single UUID path parameter.
///
/// An id that does not parse cannot name an existing record, so it is answered
/// like a missing one: `404 {errors: {data: ["Not found"]}}`.
///
/// # Example
/// ```ignore
/// async fn show(UuidPath(id): UuidPath) -> String {
///     format!("User ID: {}", id)
/// }
///
/// let app = Router::new().route("/users/{id}", get(show));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Uuid::parse_str(&id).map(UuidPath).map_err(|_| {
            tracing::debug!(id = %id, "Path id is not a UUID");
            envelope::build_not_found().into_response_with(StatusCode::NOT_FOUND)
        })
    }
}
