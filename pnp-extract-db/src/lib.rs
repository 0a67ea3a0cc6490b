pub mod cache;
pub mod disk;
pub mod error;
pub mod route;
pub mod source;

pub use cache::LayeredCache;
pub use disk::{CACHE_FRESHNESS, CachedFile, DiskEntry, DiskTier, default_cache_dir};
pub use error::{CacheError, DbError};
pub use route::{CacheKey, Collection};
pub use source::{DEFAULT_HOST, NetrunnerDbClient, Source, SourceResponse};
