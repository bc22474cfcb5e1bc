//! Cache error types
//!
//! This module defines the error types that can occur while reading or
//! writing any cache tier.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to open the SQLite store
    #[error("Failed to connect to cache store: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The key-value storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data was requested while offline and nothing is cached
    #[error("Offline and no cached data for {key}")]
    Offline {
        key: String,
    },

    /// The backend call behind a fetch or mutation failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] PortError),
}

impl CacheError {
    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            CacheError::ConnectionFailed(_) | CacheError::PoolExhausted
        )
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, CacheError::Offline { .. })
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => CacheError::PoolExhausted,
            sqlx::Error::Database(db_err) => CacheError::QueryFailed(db_err.message().to_string()),
            other => CacheError::QueryFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        CacheError::Storage(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let error: CacheError = sqlx::Error::PoolTimedOut.into();
        assert!(error.is_connection_error());
    }

    #[test]
    fn test_offline_display() {
        let error = CacheError::Offline {
            key: "[\"companies\"]".to_string(),
        };
        assert!(error.is_offline());
        assert!(error.to_string().contains("companies"));
    }
}
