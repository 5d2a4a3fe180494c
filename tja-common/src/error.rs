//! Shared error type for the traffic services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of storage, configuration and stored-data decoding
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (database directory, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Camera source id unknown to the repository
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored timestamp that does not decode as RFC 3339
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
