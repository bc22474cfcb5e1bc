//! SQLite connection pool management
//!
//! The on-disk tier lives in a local SQLite file. This module provides pool
//! configuration and creation, and creates the cache tables on first use.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::CacheError;

/// Type alias for the SQLite connection pool
pub type CachePool = SqlitePool;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration options for the cache store pool
///
/// # Example
///
/// ```rust
/// use infra_cache::CacheDbConfig;
/// use std::time::Duration;
///
/// let config = CacheDbConfig::new("sqlite://./crm-cache.db")
///     .max_connections(4)
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct CacheDbConfig {
    /// SQLite connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
}

impl CacheDbConfig {
    /// Creates a new configuration with the given connection URL
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection string (e.g., "sqlite://./cache.db")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 4,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// An in-memory store, private to the returned pool
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the maximum number of connections in the pool
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection timeout duration
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

impl Default for CacheDbConfig {
    fn default() -> Self {
        Self::new("sqlite://./crm-cache.db")
    }
}

/// Creates the pool and the cache tables
///
/// # Errors
///
/// Returns `CacheError::ConnectionFailed` if the store cannot be opened
pub async fn create_pool(config: CacheDbConfig) -> Result<CachePool, CacheError> {
    info!(url = %config.url, max_connections = config.max_connections, "Opening cache store");

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?
        .create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout);

    if config.is_in_memory() {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

    migrate(&pool).await?;

    info!("Cache store ready");
    Ok(pool)
}

/// Creates the cache tables if they do not exist
pub async fn migrate(pool: &CachePool) -> Result<(), CacheError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS query_cache (
            key          TEXT PRIMARY KEY NOT NULL,
            segments     TEXT NOT NULL,
            category     TEXT NOT NULL,
            data         TEXT NOT NULL,
            updated_at   INTEGER NOT NULL,
            invalidated  INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pending_mutations (
            seq          INTEGER PRIMARY KEY AUTOINCREMENT,
            id           TEXT NOT NULL UNIQUE,
            kind         TEXT NOT NULL,
            payload      TEXT NOT NULL,
            created_at   INTEGER NOT NULL,
            attempts     INTEGER NOT NULL DEFAULT 0,
            last_error   TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
