//! Shared building blocks for pnp-extract: the number selection syntax and the
//! schema-less catalog record type.

pub mod error;
pub mod range;
pub mod record;

pub use error::RangeError;
pub use range::{RangeSet, RangeSpec};
pub use record::{CatalogRecord, is_truthy, lookup, to_plain_string};
