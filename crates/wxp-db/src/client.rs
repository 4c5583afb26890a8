//! Store client and connection management

use crate::schema::{CREATE_POINTS, CREATE_SNAPSHOTS, CREATE_TIMESTAMP_INDEX};
use crate::DbResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Store client wrapping a sqlx connection pool
#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    /// Open (creating if missing) a store at the given path and bootstrap
    /// the schema
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(opts)
            .await?;

        let client = Self { pool };
        client.init_schema().await?;
        Ok(client)
    }

    /// In-memory store for tests; a single pooled connection keeps the
    /// database alive for the client's lifetime
    pub async fn in_memory() -> DbResult<Self> {
        let opts = SqliteConnectOptions::new().filename(":memory:");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let client = Self { pool };
        client.init_schema().await?;
        Ok(client)
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes; idempotent
    pub async fn init_schema(&self) -> DbResult<()> {
        sqlx::query(CREATE_POINTS).execute(&self.pool).await?;
        sqlx::query(CREATE_SNAPSHOTS).execute(&self.pool).await?;
        sqlx::query(CREATE_TIMESTAMP_INDEX)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Test the store connection
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_bootstrap() {
        let client = DbClient::in_memory().await.unwrap();
        client.ping().await.unwrap();

        // Bootstrapping again must be a no-op
        client.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");

        let client = DbClient::open(&path).await.unwrap();
        client.ping().await.unwrap();
        assert!(path.exists());

        client.close().await;
    }
}
