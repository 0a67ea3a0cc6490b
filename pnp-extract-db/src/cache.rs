//! The catalog cache: memory over disk over the remote API.
//!
//! Each layer is optional except memory. Without a [`Source`] the cache runs
//! offline and serves whatever the disk holds. Without a [`DiskTier`] every
//! first lookup goes straight to the source.
//!
//! Memory entries live for the lifetime of the [`LayeredCache`] value and are
//! never invalidated. Disk entries are trusted for the tier's freshness window,
//! then revalidated with a conditional request.

use std::collections::HashMap;

use pnp_extract_core::{CatalogRecord, is_truthy};
use serde_json::Value;

use crate::disk::{DiskEntry, DiskTier};
use crate::error::{CacheError, DbError};
use crate::route::{CacheKey, Collection};
use crate::source::{Source, SourceResponse};

/// Catalog lookups backed by memory, an optional disk cache and an optional source.
#[derive(Default)]
pub struct LayeredCache {
    source: Option<Box<dyn Source>>,
    disk: Option<DiskTier>,
    memory: HashMap<CacheKey, Value>,
}

impl LayeredCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_disk(mut self, disk: DiskTier) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn is_offline(&self) -> bool {
        self.source.is_none()
    }

    pub fn disk(&self) -> Option<&DiskTier> {
        self.disk.as_ref()
    }

    /// Every record of a list route, e.g. all packs.
    pub fn list(&mut self, collection: Collection) -> Result<Vec<CatalogRecord>, DbError> {
        let key = CacheKey::list(collection);
        let data = self.call(&key)?;
        Ok(CatalogRecord::wrap_all(data.clone()))
    }

    /// A single record by code, e.g. the pack `core`.
    pub fn get(&mut self, collection: Collection, id: &str) -> Result<CatalogRecord, DbError> {
        let key = CacheKey::get(collection, id);
        let data = self.call(&key)?;
        CatalogRecord::wrap_all(data.clone())
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(&key))
    }

    pub fn cards(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Card)
    }

    pub fn cycles(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Cycle)
    }

    pub fn factions(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Faction)
    }

    pub fn packs(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Pack)
    }

    pub fn sides(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Side)
    }

    pub fn types(&mut self) -> Result<Vec<CatalogRecord>, DbError> {
        self.list(Collection::Type)
    }

    pub fn card(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Card, code)
    }

    pub fn cycle(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Cycle, code)
    }

    pub fn faction(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Faction, code)
    }

    pub fn pack(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Pack, code)
    }

    pub fn side(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Side, code)
    }

    pub fn type_(&mut self, code: &str) -> Result<CatalogRecord, DbError> {
        self.get(Collection::Type, code)
    }

    /// The memory tier. Only successful lookups are remembered.
    fn call(&mut self, key: &CacheKey) -> Result<&Value, DbError> {
        if self.memory.contains_key(key) {
            log::debug!("Cache hit: {key}");
        } else {
            log::debug!("Cache miss: {key}");
            let raw = self.load(key)?;
            let data = unpack(raw.as_deref(), key)?;
            self.memory.insert(key.clone(), data);
        }
        self.memory.get(key).ok_or_else(|| DbError::not_found(key))
    }

    fn load(&self, key: &CacheKey) -> Result<Option<String>, DbError> {
        match (&self.disk, &self.source) {
            (Some(disk), Some(source)) => refresh(disk, source.as_ref(), key),
            (Some(disk), None) => read_offline(disk, key),
            (None, Some(source)) => match source.fetch(key, None)? {
                SourceResponse::Success { body, .. } => Ok(Some(body)),
                SourceResponse::NotModified | SourceResponse::NotFound => {
                    Err(DbError::not_found(key))
                }
            },
            (None, None) => Ok(None),
        }
    }
}

fn read_offline(disk: &DiskTier, key: &CacheKey) -> Result<Option<String>, DbError> {
    let Some(mut entry) = disk.entry(key) else {
        log::debug!("Cache miss (offline): {key}");
        return Ok(None);
    };
    Ok(Some(entry.read()?.to_owned()))
}

/// Serve a disk entry, revalidating it against the source once it is stale.
fn refresh(
    disk: &DiskTier,
    source: &dyn Source,
    key: &CacheKey,
) -> Result<Option<String>, DbError> {
    let mut entry = disk.entry(key);
    log::debug!(
        "Disk cache {}: {key}",
        if entry.is_some() { "hit" } else { "miss" }
    );

    if let Some(fresh) = entry.as_mut().filter(|e| !e.older_than(disk.freshness())) {
        log::debug!("Cache fresh: {key}");
        return Ok(Some(fresh.read()?.to_owned()));
    }

    let modified_since = entry.as_ref().and_then(|e| e.modified_at().ok());
    let response = match source.fetch(key, modified_since) {
        Ok(response) => response,
        Err(e) if e.is_transport() => {
            let Some(mut stale) = entry else {
                return Err(e);
            };
            log::warn!("Using stale cache for '{key}': {e}");
            return Ok(Some(stale.read()?.to_owned()));
        }
        Err(e) => return Err(e),
    };

    match response {
        SourceResponse::NotModified => {
            let Some(mut entry) = entry else {
                return Err(DbError::not_found(key));
            };
            log::info!("Cache up-to-date: {key}");
            let content = entry.read()?.to_owned();
            if let Err(e) = entry.touch() {
                log::error!("Couldn't refresh cache entry '{key}': {e}");
            }
            Ok(Some(content))
        }
        SourceResponse::NotFound => Err(DbError::not_found(key)),
        SourceResponse::Success {
            body,
            last_modified,
        } => {
            let mut entry = entry.unwrap_or_else(|| disk.new_entry(key));
            if let Err(e) = persist(&mut entry, &body, last_modified) {
                log::error!("Couldn't store response '{key}': {e}");
            }
            Ok(Some(body))
        }
    }
}

fn persist(
    entry: &mut DiskEntry,
    body: &str,
    last_modified: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<(), CacheError> {
    let last_modified = last_modified.ok_or(CacheError::LastModifiedMissing)?;
    entry.store(body, last_modified)
}

/// Decode a response and pull out its `data`, checking the `success` flag.
fn unpack(raw: Option<&str>, key: &CacheKey) -> Result<Value, DbError> {
    let raw = raw.ok_or_else(|| DbError::not_found(key))?;
    let mut json: Value =
        serde_json::from_str(raw).map_err(|e| DbError::database(key, e.to_string()))?;

    if !is_truthy(json.get("success")) {
        return Err(DbError::not_found(key));
    }

    Ok(json.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
