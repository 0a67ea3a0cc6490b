use std::path::PathBuf;

use crate::route::CacheKey;

/// Errors that can occur while looking up catalog data.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Could not get '{0}' from database.")]
    NotFound(String),

    #[error("Malformed data for '{key}': {reason}")]
    Database { key: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (HTTP {status}) for {url}")]
    ServerError { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl DbError {
    pub fn not_found(key: &CacheKey) -> Self {
        Self::NotFound(key.to_string())
    }

    pub fn database(key: &CacheKey, reason: impl Into<String>) -> Self {
        Self::Database {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the failure happened on the way to the API rather than in the
    /// data it returned. A stale disk entry can stand in for these.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::ServerError { .. } | Self::Transport(_)
        )
    }
}

/// Errors raised by the on-disk cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("response has no usable Last-Modified header")]
    LastModifiedMissing,

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine cache directory")]
    NoCacheDir,
}
