//! On-disk cache of API responses.
//!
//! Each response is stored verbatim at `<root>/<route>[/<id>].json`. The file's
//! mtime is set to the `Last-Modified` time the API reported, so it can be sent
//! back as `If-Modified-Since`. The time the entry was cached comes from the
//! inode change time (birth time off Unix), which is why refreshing an entry
//! rewrites the whole file instead of editing its metadata.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use filetime::FileTime;

use crate::error::{CacheError, DbError};
use crate::route::{CACHE_EXTENSION, CacheKey, decode_param};

/// How long a cached response is trusted before asking the API again.
pub const CACHE_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

const TEMP_EXTENSION: &str = "json.tmp";

/// Default cache directory: `~/.cache/pnp-extract` (or the platform equivalent).
pub fn default_cache_dir() -> Result<PathBuf, CacheError> {
    let base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
    Ok(base.join("pnp-extract"))
}

/// A single cached API response.
#[derive(Debug)]
pub struct DiskEntry {
    path: PathBuf,
    content: Option<String>,
}

impl DiskEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// The entry for `key` under `root`, if a file exists for it.
    pub fn fetch(root: &Path, key: &CacheKey) -> Option<Self> {
        let path = root.join(key.relative_path());
        path.is_file().then(|| Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `Last-Modified` time reported by the API when this entry was stored.
    pub fn modified_at(&self) -> Result<DateTime<Utc>, CacheError> {
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.read_error(e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    /// When the entry was last written.
    pub fn cached_at(&self) -> Result<SystemTime, CacheError> {
        fs::metadata(&self.path)
            .and_then(|m| changed_time(&m))
            .map_err(|e| self.read_error(e))
    }

    /// True when more than `window` has passed since the entry was written.
    /// An entry whose timestamps can't be read counts as stale.
    pub fn older_than(&self, window: Duration) -> bool {
        match self.cached_at() {
            Ok(cached_at) => cached_at
                .checked_add(window)
                .is_some_and(|expires| SystemTime::now() > expires),
            Err(e) => {
                log::debug!("Treating {} as stale: {e}", self.path.display());
                true
            }
        }
    }

    pub fn read(&mut self) -> Result<&str, CacheError> {
        if self.content.is_none() {
            let content = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
            self.content = Some(content);
        }
        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Rewrite the entry with its current content, resetting its cached-at time.
    pub fn touch(&mut self) -> Result<(), CacheError> {
        let modified_at = self.modified_at()?;
        let content = self.read()?.to_owned();
        self.rewrite(&content, modified_at)
    }

    /// Replace the entry's content and upstream modification time.
    pub fn store(&mut self, content: &str, modified_at: DateTime<Utc>) -> Result<(), CacheError> {
        self.rewrite(content, modified_at)?;
        self.content = Some(content.to_owned());
        log::info!(
            "Stored {} bytes into {} (last-modified: {modified_at})",
            content.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write to a sibling temp file, stamp it, then rename it over the entry so
    /// a reader never sees a half-written file.
    fn rewrite(&self, content: &str, modified_at: DateTime<Utc>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let tmp = self.path.with_extension(TEMP_EXTENSION);
        let mtime = FileTime::from_system_time(SystemTime::from(modified_at));
        let result = fs::write(&tmp, content)
            .and_then(|()| filetime::set_file_mtime(&tmp, mtime))
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(e));
        }
        Ok(())
    }

    fn read_error(&self, source: io::Error) -> CacheError {
        CacheError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: io::Error) -> CacheError {
        CacheError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn changed_time(meta: &fs::Metadata) -> io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;

    let secs = u64::try_from(meta.ctime()).map_err(io::Error::other)?;
    let nanos = u32::try_from(meta.ctime_nsec()).map_err(io::Error::other)?;
    Ok(SystemTime::UNIX_EPOCH + Duration::new(secs, nanos))
}

#[cfg(not(unix))]
fn changed_time(meta: &fs::Metadata) -> io::Result<SystemTime> {
    meta.created()
}

/// Information about a cached response for display purposes.
#[derive(Debug, Clone)]
pub struct CachedFile {
    /// Route and params, e.g. `pack/core`
    pub key: String,
    pub file_size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// The disk layer of the catalog cache: a root directory and a freshness window.
#[derive(Debug, Clone)]
pub struct DiskTier {
    root: PathBuf,
    freshness: Duration,
}

impl DiskTier {
    /// The root is created lazily, on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            freshness: CACHE_FRESHNESS,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// The existing entry for `key`, if any.
    pub fn entry(&self, key: &CacheKey) -> Option<DiskEntry> {
        DiskEntry::fetch(&self.root, key)
    }

    /// A not-yet-written entry for `key`.
    pub fn new_entry(&self, key: &CacheKey) -> DiskEntry {
        DiskEntry::new(self.root.join(key.relative_path()))
    }

    /// List every cached response, sorted by key.
    pub fn list(&self) -> Result<Vec<CachedFile>, DbError> {
        let mut entries = Vec::new();
        for path in self.cache_files()? {
            let meta = fs::metadata(&path)?;
            entries.push(CachedFile {
                key: self.key_for(&path),
                file_size: meta.len(),
                last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Remove every cached response. Returns the number of bytes freed.
    ///
    /// Only cache files are removed; anything else under the root is left alone.
    pub fn clear(&self) -> Result<u64, DbError> {
        let mut total_size = 0u64;
        for path in self.cache_files()? {
            if let Ok(meta) = fs::metadata(&path) {
                total_size += meta.len();
            }
            fs::remove_file(&path)?;
        }

        // Drop the route directories that are now empty.
        if self.root.is_dir() {
            for entry in fs::read_dir(&self.root)?.flatten() {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                match fs::remove_dir(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {}
                    Err(e) => log::debug!("Could not remove {}: {e}", path.display()),
                }
            }
        }

        Ok(total_size)
    }

    /// Total size of cached responses in bytes.
    pub fn total_size(&self) -> Result<u64, DbError> {
        Ok(self.list()?.iter().map(|f| f.file_size).sum())
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>, DbError> {
        let mut files = Vec::new();
        if self.root.is_dir() {
            collect_files(&self.root, &mut files)?;
        }
        Ok(files)
    }

    fn key_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .with_extension("")
            .components()
            .map(|c| decode_param(&c.as_os_str().to_string_lossy()))
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/disk_tests.rs"]
mod tests;
