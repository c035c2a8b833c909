//! Postgres pool for the transactions store

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared connection pool; cloning shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool sized from config (`db_max_connections`).
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Liveness probe used by the health endpoint.
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
