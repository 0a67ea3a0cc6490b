//! Catalog-aware card extraction: maps the card images of a print-and-play
//! document to NetrunnerDB records and decides where each one is written.

pub mod catalog;
pub mod error;
pub mod extract;
pub mod merge;
pub mod position;
pub mod settings;
pub mod template;

pub use catalog::{CycleListing, PackSummary, format_pack_listing, list_packs};
pub use error::{ExtractError, MappingError, MergeError, SettingsError};
pub use extract::{
    CardImage, CardImageProducer, CardSink, Extraction, ExtractionSummary, GridProducer,
    PlanSink, PlannedCard,
};
pub use merge::{CardMetadata, MetadataMerger, PNG_METADATA_KEYS, PNG_METADATA_PREFIX};
pub use position::{MappedPosition, PackBounds, PositionMapper};
pub use settings::{CatalogOptions, RunOptions, Settings, settings_path};
pub use template::FilenameTemplate;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
