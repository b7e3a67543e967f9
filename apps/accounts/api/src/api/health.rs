//! Readiness check against the configured user store.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use sea_orm::DatabaseConnection;
use serde_json::json;

/// Readiness check endpoint.
///
/// Pings PostgreSQL when it backs the store; the in-memory store is always ready.
pub async fn ready_handler(State(db): State<Option<DatabaseConnection>>) -> Response {
    let Some(db) = db else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ready", "store": "in-memory" })),
        )
            .into_response();
    };

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            db.ping()
                .await
                .map_err(|e| format!("Database ping failed: {}", e))
        }),
    )];

    run_health_checks(checks).await
}
