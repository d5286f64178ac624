//! Common error types for fontsource

use thiserror::Error;

/// Common result type for fontsource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the import pipeline and the settings layer
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier unknown to the catalog or to the local settings
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, non-success status or malformed remote response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Stylesheet or settings file could not be written, read or deleted
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Broken internal contract
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an I/O failure on `path` as a persistence error
    pub fn persistence(path: &std::path::Path, err: std::io::Error) -> Self {
        Error::Persistence(format!("{}: {}", path.display(), err))
    }
}
