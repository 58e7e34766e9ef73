//! Database connection pool management
//!
//! Provides a wrapper around SQLx's SqlitePool with:
//! - Automatic directory creation for database files
//! - WAL journal mode for concurrent reads
//! - Automatic schema migration on first connection
//! - In-memory mode for testing

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use greenroom_core::config::DatabaseConfig;

use crate::StoreError;

/// Manages a pool of SQLite connections for Greenroom persistence
///
/// File-based pools use WAL journal mode so conflict checks can read
/// while a guarded insert holds the write lock. In-memory pools use a
/// single connection, since SQLite in-memory databases are
/// per-connection.
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from the database configuration
    ///
    /// This will:
    /// 1. Create parent directories if they don't exist
    /// 2. Create the database file if it doesn't exist
    /// 3. Enable WAL journal mode
    /// 4. Run schema migrations
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot be
    /// established, or `StoreError::MigrationFailed` if schema migrations
    /// fail.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::open(&config.path, config.max_connections).await
    }

    /// Creates a new database pool at an explicit path
    pub async fn open(db_path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!(
                    "Failed to connect to database at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::info!(
            path = %db_path.display(),
            "Database pool initialized"
        );

        Ok(Self { pool })
    }

    /// Creates an in-memory database pool for testing
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the connection cannot be
    /// established, or `StoreError::MigrationFailed` if schema migrations
    /// fail.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("Failed to create in-memory database: {}", e))
            })?;

        Self::run_migrations(&pool).await?;

        tracing::debug!("In-memory database pool initialized");

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the initial schema migration
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        let migration_sql = include_str!("migrations/20260715_initial.sql");
        sqlx::raw_sql(migration_sql)
            .execute(pool)
            .await
            .map_err(|e| {
                StoreError::MigrationFailed(format!("Failed to run initial migration: {}", e))
            })?;

        tracing::debug!("Database migrations completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    use greenroom_core::config::DatabaseConfig;

    #[tokio::test]
    async fn test_in_memory_pool_has_schema() {
        let pool = DatabasePool::in_memory().await.unwrap();

        for table in ["resources", "bookings", "conflict_logs"] {
            let row = sqlx::query(
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(pool.pool())
            .await
            .unwrap();
            assert_eq!(row.get::<i64, _>("n"), 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_file_backed_pool_creates_dirs_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("state").join("greenroom.db"),
            max_connections: 2,
        };

        let pool = DatabasePool::new(&config).await.unwrap();
        sqlx::query(
            "INSERT INTO resources \
                 (id, organization_id, title, resource_type, created_at) \
             VALUES ('r1', 'o1', 'Studio', 'space', '2026-01-01T00:00:00+00:00')",
        )
        .execute(pool.pool())
        .await
        .unwrap();
        drop(pool);

        // Reopening runs the (idempotent) migration and sees the row.
        let pool = DatabasePool::new(&config).await.unwrap();
        let row = sqlx::query("SELECT COUNT(*) AS n FROM resources")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("n"), 1);
    }
}
