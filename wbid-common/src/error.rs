//! Error type shared by the catalog, configuration and auth layers

use thiserror::Error;

/// Result alias used throughout wbid-common
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised below the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (database folder, upload folder, log file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bootstrap TOML unreadable or a setting out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Form field or query parameter rejected before touching the database
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
