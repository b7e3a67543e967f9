//! Request-body extractor that runs authorization and a [`RuleSet`] before the
//! handler is called.

use crate::envelope::{self, FieldErrors};
use crate::validation::{Input, RuleSet};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Declares how a request body is authorized and validated.
///
/// `authorize` runs first; a `false` result rejects the request with
/// `401 {errors: {user: ["Unauthorize"]}}` before any field rule runs.
/// `rules` then yields the ordered rule set evaluated against the raw input.
#[async_trait]
pub trait RequestRules<S: Send + Sync>: DeserializeOwned + Send {
    async fn authorize(_parts: &mut Parts, _state: &S) -> bool {
        true
    }

    async fn rules(parts: &mut Parts, state: &S) -> RuleSet;
}

/// Body extractor backed by [`RequestRules`].
///
/// Accepts JSON or `application/x-www-form-urlencoded` bodies; an empty body is
/// an empty object so required-field rules report it. Any failure short-circuits
/// with an envelope response and the handler never runs:
///
/// | Step | Failure |
/// |---|---|
/// | authorize | 401 `buildUnauthorize()` |
/// | body parsing | rejection status, `{errors: {body: [..]}}` |
/// | rule set | 422 with the field error set |
/// | typed decode | 422, `{errors: {body: [..]}}` |
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::{RequestRules, ValidatedJson};
/// use axum_helpers::validation::{RuleSet, email, required};
///
/// #[derive(serde::Deserialize)]
/// struct Subscribe { email: String }
///
/// #[async_trait::async_trait]
/// impl<S: Send + Sync> RequestRules<S> for Subscribe {
///     async fn rules(_parts: &mut Parts, _state: &S) -> RuleSet {
///         RuleSet::new().field("email", [required(), email()])
///     }
/// }
///
/// async fn subscribe(ValidatedJson(input): ValidatedJson<Subscribe>) -> String {
///     input.email
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: RequestRules<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        if !T::authorize(&mut parts, state).await {
            tracing::info!(method = %parts.method, uri = %parts.uri, "Request failed authorization");
            return Err(envelope::build_unauthorize().into_response_with(StatusCode::UNAUTHORIZED));
        }

        let rules = T::rules(&mut parts, state).await;
        let input = read_input(Request::from_parts(parts, body), state).await?;

        if let Err(errors) = rules.validate(&input).await {
            tracing::info!(
                fields = ?errors.fields().collect::<Vec<_>>(),
                "Request validation failed"
            );
            return Err(envelope::build_error(errors)
                .into_response_with(StatusCode::UNPROCESSABLE_ENTITY));
        }

        let data = serde_json::from_value::<T>(Value::Object(input))
            .map_err(|e| body_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

        Ok(ValidatedJson(data))
    }
}

fn body_error(status: StatusCode, message: String) -> Response {
    envelope::build_error(FieldErrors::single("body", message)).into_response_with(status)
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

async fn read_input<S: Send + Sync>(req: Request, state: &S) -> Result<Input, Response> {
    if is_form(&req) {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        return Ok(fields
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect());
    }

    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Input::new());
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(body_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The request body must be a JSON object.".to_string(),
        )),
        Err(e) => Err(body_error(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{min_length, required};
    use axum::{Router, body::Body, http::Request, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        name: String,
        #[serde(default)]
        code: Option<String>,
    }

    #[async_trait]
    impl RequestRules<()> for Greeting {
        async fn authorize(parts: &mut Parts, _state: &()) -> bool {
            parts.headers.get("x-deny").is_none()
        }

        async fn rules(_parts: &mut Parts, _state: &()) -> RuleSet {
            RuleSet::new()
                .field("name", [required()])
                .field("code", [min_length(3)])
        }
    }

    async fn greet(ValidatedJson(input): ValidatedJson<Greeting>) -> String {
        format!("hello {} {}", input.name, input.code.unwrap_or_default())
    }

    fn app() -> Router {
        Router::new().route("/", post(greet))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn errors_of(body: &[u8]) -> Value {
        let value: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(value["fulfilled"], false);
        assert!(value.get("data").is_none());
        value["errors"].clone()
    }

    #[tokio::test]
    async fn test_valid_json_reaches_handler() {
        let (status, body) = send(json_request(r#"{"name":"Ach","code":"abc"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hello Ach abc");
    }

    #[tokio::test]
    async fn test_rule_failures_return_422_envelope() {
        let (status, body) = send(json_request(r#"{"name":"","code":"x"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = errors_of(&body);
        assert_eq!(errors["name"][0], "The name field is required.");
        assert_eq!(errors["code"][0], "The code field must be at least 3 characters.");
    }

    #[tokio::test]
    async fn test_empty_body_is_treated_as_empty_input() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(errors_of(&body).get("name").is_some());
    }

    #[tokio::test]
    async fn test_form_bodies_are_accepted() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=Ach+Rozikin"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hello Ach Rozikin ");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_body_error() {
        let (status, body) = send(json_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(errors_of(&body).get("body").is_some());
    }

    #[tokio::test]
    async fn test_non_object_json_is_rejected() {
        let (status, body) = send(json_request("[1,2]")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(errors_of(&body).get("body").is_some());
    }

    #[tokio::test]
    async fn test_type_mismatch_after_rules_is_422() {
        let (status, body) = send(json_request(r#"{"name":42}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(errors_of(&body).get("body").is_some());
    }

    #[tokio::test]
    async fn test_authorization_runs_before_rules() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("x-deny", "1")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(errors_of(&body), serde_json::json!({ "user": ["Unauthorize"] }));
    }
}
