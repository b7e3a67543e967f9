use axum_helpers::{
    auth::JwtAuth,
    server::{create_production_app, create_router, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod store;

use config::Config;
use store::Store;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let store = Store::connect(config.database.as_ref()).await?;
    let jwt = JwtAuth::new(&config.jwt);

    // Build router with API routes
    let api_routes = api::routes(&store, jwt);

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes, &config.server)?;

    // Merge health endpoints into the app
    // - /health: liveness check with app name/version
    // - /ready: readiness check against the user store
    let db = store.database();
    let app = router
        .merge(health_router(config.app))
        .merge(api::ready_router(db.clone()));

    info!(
        "Starting {} v{} ({:?} shutdown timeout)",
        config.app.name, config.app.version, config.server.shutdown_timeout
    );

    create_production_app(app, &config.server, async move {
        let Some(db) = db else {
            return;
        };

        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("{} shutdown complete", config.app.name);
    Ok(())
}
