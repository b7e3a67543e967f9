use axum::Router;
use axum_helpers::auth::JwtAuth;
use sea_orm::DatabaseConnection;

use crate::store::Store;

pub mod health;
pub mod users;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes(store: &Store, jwt: JwtAuth) -> Router {
    Router::new().merge(users::router(store, jwt))
}

/// Creates a router with the /ready endpoint that checks the database, if any.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(db: Option<DatabaseConnection>) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::ApiDoc;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::auth::JwtConfig;
    use axum_helpers::server::{create_router, health_router};
    use core_config::{app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let jwt = JwtAuth::new(&JwtConfig::new("app-test-secret-at-least-32-characters"));
        let router = create_router::<ApiDoc>(routes(&Store::InMemory, jwt), &ServerConfig::default())
            .unwrap();
        router
            .merge(health_router(app_info!()))
            .merge(ready_router(None))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_is_served_under_api() {
        let request = Request::post("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "name": "Ach Rozikin",
                    "email": "geronimo794@gmail.com",
                    "password": "JustAPassword2",
                })
                .to_string(),
            ))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["data"]["token_type"], "Bearer");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_envelope() {
        let request = Request::get("/api/nothing-here").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "fulfilled": false, "errors": { "data": ["Not found"] } })
        );
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "accounts_api");

        let response = app()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "status": "ready", "store": "in-memory" })
        );
    }

    #[tokio::test]
    async fn test_openapi_document_lists_user_routes() {
        let response = app()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        assert!(doc["paths"].get("/register").is_some());
        assert!(doc["paths"].get("/users/{id}").is_some());
    }
}
