use thiserror::Error;

use pnp_extract_db::DbError;
use pnp_extract_lib::{ExtractError, MappingError, SettingsError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file or cache setup failed
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// Catalog lookup failed
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The card order doesn't fit the pack
    #[error("Card order error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
