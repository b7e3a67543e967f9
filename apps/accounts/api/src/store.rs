//! User store selection.

use core_config::database::DatabaseConfig;
use domain_users::PostgresUserRepository;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// The store backing the users domain.
pub enum Store {
    InMemory,
    Postgres(DatabaseConnection),
}

impl Store {
    /// Connects to PostgreSQL when configured, otherwise keeps users in memory.
    pub async fn connect(config: Option<&DatabaseConfig>) -> eyre::Result<Self> {
        let Some(config) = config else {
            tracing::warn!("DATABASE_URL not set; users are kept in memory");
            return Ok(Store::InMemory);
        };

        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

        PostgresUserRepository::new(db.clone())
            .ensure_schema()
            .await
            .map_err(|e| eyre::eyre!("Failed to prepare users schema: {}", e))?;

        info!("Connected to PostgreSQL");
        Ok(Store::Postgres(db))
    }

    /// Connection to health-check and close on shutdown, if any.
    pub fn database(&self) -> Option<DatabaseConnection> {
        match self {
            Store::InMemory => None,
            Store::Postgres(db) => Some(db.clone()),
        }
    }
}
