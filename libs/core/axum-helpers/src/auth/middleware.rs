use super::jwt::{JwtAuth, JwtClaims};
use crate::envelope;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

fn unauthorized() -> Response {
    envelope::build_unauthorize().into_response_with(StatusCode::UNAUTHORIZED)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer-token authentication middleware.
///
/// Verifies the token and inserts [`JwtClaims`] into request extensions. A
/// missing or invalid token ends the request with
/// `401 {errors: {user: ["Unauthorize"]}}`.
///
/// # Example
///
/// ```ignore
/// let protected = Router::new()
///     .route("/users", get(index))
///     .layer(axum::middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(request.headers()) else {
        tracing::debug!("No bearer token in Authorization header");
        return unauthorized();
    };

    let claims = match auth.verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return unauthorized();
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// The authenticated caller, taken from claims set by [`jwt_auth_middleware`].
///
/// Handlers receive the actor explicitly instead of reading ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl Actor {
    /// Reads the actor from request parts, if the middleware authenticated one.
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        parts
            .extensions
            .get::<JwtClaims>()
            .and_then(JwtClaims::user_id)
            .map(Actor)
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_parts(parts).ok_or_else(unauthorized)
    }
}
