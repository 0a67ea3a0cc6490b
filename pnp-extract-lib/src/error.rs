use std::path::PathBuf;

use pnp_extract_core::RangeError;
use pnp_extract_db::{CacheError, DbError};
use thiserror::Error;

/// Errors raised while mapping document positions to catalog positions.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The document position lies outside `1..=max`
    #[error("Card position {position} is outside of the expected range 1-{max}")]
    OutOfRange { position: u32, max: u32 },

    /// The card order could not be parsed against the pack's bounds
    #[error("Invalid card order: {0}")]
    Range(#[from] RangeError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Errors raised while assembling the metadata of one card image.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// No card in the pack sits at or after the mapped position
    #[error(
        "Could not find card (document position {document}, cycle position {cycle}) in pack metadata"
    )]
    PositionNotFound { document: u32, cycle: u32 },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl MergeError {
    /// Whether the failure invalidates the whole run rather than one image.
    pub fn is_structural(&self) -> bool {
        match self {
            Self::Mapping(MappingError::Db(_)) | Self::Db(_) => false,
            Self::Mapping(_) | Self::PositionNotFound { .. } => true,
        }
    }
}

/// Errors raised by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid page selection: {0}")]
    Pages(#[from] RangeError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("A {rows}x{cols} grid holds more cards than a page can")]
    GridTooLarge { rows: u32, cols: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading settings and assembling the catalog cache.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Db(#[from] DbError),
}
