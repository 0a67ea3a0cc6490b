//! Settings file and run options.
//!
//! The settings file lives at `~/.config/pnp-extract/settings.toml`. Every
//! value in it can be overridden from the command line:
//!
//! ```toml
//! [api]
//! host = "https://netrunnerdb.com/api/2.0/public/"
//!
//! [cache]
//! directory = "/home/me/.cache/pnp-extract"
//! freshness_hours = 24
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use pnp_extract_db::{
    CACHE_FRESHNESS, DEFAULT_HOST, DiskTier, LayeredCache, NetrunnerDbClient, default_cache_dir,
};
use serde::Deserialize;

use crate::error::SettingsError;
use crate::position::DEFAULT_CARD_ORDER;
use crate::template::{DEFAULT_CARD_TEMPLATE, DEFAULT_EXTRA_TEMPLATE};

/// Pages selected when none are given. The first page is usually a cover.
pub const DEFAULT_PAGES: &str = "2-";

/// Canonical path to the settings file: `~/.config/pnp-extract/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("pnp-extract").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub directory: Option<PathBuf>,
    pub freshness_hours: Option<u64>,
}

impl Settings {
    /// Load the settings file. A missing file means default settings.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// How the catalog cache is put together.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Never contact the API; serve the disk cache only
    pub offline: bool,
    /// Skip the disk cache entirely
    pub no_disk_cache: bool,
    pub cache_dir: Option<PathBuf>,
    pub api_host: Option<String>,
    pub freshness: Option<Duration>,
}

impl CatalogOptions {
    /// Resolve the cache directory using a priority chain:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. `cache.directory` in `settings.toml`
    /// 3. The platform cache directory
    pub fn cache_dir(&self, settings: &Settings) -> Result<PathBuf, SettingsError> {
        if let Some(dir) = self.cache_dir.as_ref().or(settings.cache.directory.as_ref()) {
            return Ok(dir.clone());
        }
        Ok(default_cache_dir()?)
    }

    pub fn api_host(&self, settings: &Settings) -> String {
        self.api_host
            .clone()
            .or_else(|| settings.api.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn freshness(&self, settings: &Settings) -> Duration {
        self.freshness
            .or_else(|| {
                settings
                    .cache
                    .freshness_hours
                    .map(|hours| Duration::from_secs(hours.saturating_mul(60 * 60)))
            })
            .unwrap_or(CACHE_FRESHNESS)
    }

    /// Build the layered cache these options describe.
    pub fn build_cache(&self, settings: &Settings) -> Result<LayeredCache, SettingsError> {
        let mut cache = LayeredCache::new();

        if self.no_disk_cache {
            log::debug!("Disk cache disabled");
        } else {
            let dir = self.cache_dir(settings)?;
            let freshness = self.freshness(settings);
            log::debug!(
                "Disk cache at {} (fresh for {}s)",
                dir.display(),
                freshness.as_secs()
            );
            cache = cache.with_disk(DiskTier::new(dir).with_freshness(freshness));
        }

        if self.offline {
            log::debug!("Offline: the API will not be contacted");
        } else {
            let host = self.api_host(settings);
            log::debug!("Using API at {host}");
            cache = cache.with_source(NetrunnerDbClient::new(host)?);
        }

        Ok(cache)
    }
}

/// Options of one extraction run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pack_code: Option<String>,
    pub card_order: String,
    /// Extra cards before the first catalog card
    pub extra_start: u32,
    /// Extra cards after the last catalog card
    pub extra_end: u32,
    pub pages: String,
    pub card_template: String,
    pub extra_template: String,
    pub directory: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pack_code: None,
            card_order: DEFAULT_CARD_ORDER.to_string(),
            extra_start: 0,
            extra_end: 0,
            pages: DEFAULT_PAGES.to_string(),
            card_template: DEFAULT_CARD_TEMPLATE.to_string(),
            extra_template: DEFAULT_EXTRA_TEMPLATE.to_string(),
            directory: PathBuf::from("."),
            force: false,
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
