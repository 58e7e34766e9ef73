//! Greenroom Store - SQLite persistence
//!
//! SQLite-backed storage for:
//! - Bookings and their status/window queries
//! - Resources and their availability flags
//! - Conflict logs with filtering and resource joins
//!
//! ## Architecture
//!
//! This crate implements the `IBookingRepository` port from
//! `greenroom-core` using SQLite as the storage backend. It is a driven
//! (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteBookingRepository`] - Full `IBookingRepository` implementation,
//!   including the transactional double-booking guard
//! - [`StoreError`] - Error types for storage operations
//!
//! ## Usage
//!
//! ```no_run
//! use greenroom_core::config::DatabaseConfig;
//! use greenroom_store::{DatabasePool, SqliteBookingRepository};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(&DatabaseConfig::default()).await?;
//! let repo = SqliteBookingRepository::new(pool.pool().clone());
//! // Use repo as IBookingRepository...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteBookingRepository;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
