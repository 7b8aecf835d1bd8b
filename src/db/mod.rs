//! Database module providing connection management, migrations, and queries.
//!
//! Query functions are generic over `ConnectionTrait` so handlers can run them
//! on the pool for reads or inside a transaction for writes.

pub mod reports;
pub mod role_groups;
pub mod sessions;
pub mod tags;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::DatabaseSettings;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Shared SeaORM connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect using the configured URL and pool bounds.
    pub async fn new(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut opts = ConnectOptions::new(settings.url.clone());
        opts.max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { conn })
    }

    /// Wrap an existing connection (used by tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
