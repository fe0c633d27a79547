//! Persisted size cache.
//!
//! Maps `url_fingerprint(url)` to the byte size confirmed by a successful
//! probe. Entries never expire and failures are never stored, so unknown
//! sizes are probed again on every run.
//!
//! The file is a single postcard blob. A missing or unreadable file loads as
//! an empty cache; a failed write is logged and otherwise ignored. A dirty
//! cache is flushed when it is dropped, so every exit path persists what the
//! run learned unless [`SizeCache::discard`] is called.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CoreError, CoreResult};
use crate::fingerprint::url_fingerprint;

const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: BTreeMap<String, u64>,
}

#[derive(Debug)]
pub struct SizeCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, u64>,
    dirty: bool,
}

impl SizeCache {
    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load the cache at `path`. Never fails: problems yield an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match postcard::from_bytes::<CacheFile>(&bytes) {
                Ok(file) if file.version == CACHE_FORMAT_VERSION => file.entries,
                Ok(file) => {
                    warn!(
                        path = %path.display(),
                        version = file.version,
                        "unsupported cache version, starting empty"
                    );
                    BTreeMap::new()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt cache, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable cache, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    pub fn get(&self, url: &str) -> Option<u64> {
        self.entries.get(&url_fingerprint(url)).copied()
    }

    /// Record a confirmed size.
    pub fn put(&mut self, url: &str, size_bytes: u64) {
        let previous = self.entries.insert(url_fingerprint(url), size_bytes);
        if previous != Some(size_bytes) {
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the cache atomically (temp file, then rename).
    pub fn persist(&mut self) -> CoreResult<()> {
        let Some(path) = self.path.clone() else {
            self.dirty = false;
            return Ok(());
        };

        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        let bytes = postcard::to_allocvec(&file).map_err(|e| CoreError::CachePersistence {
            message: format!("failed to encode cache: {}", e),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::CachePersistence {
                message: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &bytes).map_err(|e| CoreError::CachePersistence {
            message: format!("failed to write temp file: {}", e),
        })?;
        std::fs::rename(&temp_path, &path).map_err(|e| CoreError::CachePersistence {
            message: format!("failed to rename temp file: {}", e),
        })?;

        self.dirty = false;
        debug!(path = %path.display(), entries = self.entries.len(), "persisted size cache");
        Ok(())
    }

    /// Best-effort [`persist`](Self::persist): failures are logged. Returns
    /// whether the cache is clean afterwards.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return true;
        }
        match self.persist() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save size cache");
                false
            }
        }
    }

    /// Drop without writing.
    pub fn discard(mut self) {
        self.dirty = false;
    }

    /// Delete the cache file at `path`. Returns whether a file was removed.
    pub fn clear_file(path: &Path) -> CoreResult<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }
}

impl Drop for SizeCache {
    fn drop(&mut self) {
        if self.dirty {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (SizeCache, PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache").join("sizes.bin");
        (SizeCache::load(&path), path, temp_dir)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (cache, _, _dir) = create_test_cache();
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_persist_and_reload() {
        let (mut cache, path, _dir) = create_test_cache();
        cache.put("https://x/a.mov", 1536);
        cache.persist().unwrap();

        let reloaded = SizeCache::load(&path);
        assert_eq!(reloaded.get("https://x/a.mov"), Some(1536));
        assert_eq!(reloaded.get("https://x/b.mov"), None);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let (_, path, _dir) = create_test_cache();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

        let cache = SizeCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_drop_flushes_dirty_cache() {
        let (mut cache, path, _dir) = create_test_cache();
        cache.put("https://x/a.mov", 99);
        drop(cache);

        assert_eq!(SizeCache::load(&path).get("https://x/a.mov"), Some(99));
    }

    #[test]
    fn test_discard_skips_flush() {
        let (mut cache, path, _dir) = create_test_cache();
        cache.put("https://x/a.mov", 99);
        cache.discard();

        assert!(!path.exists());
    }

    #[test]
    fn test_keys_are_fingerprints() {
        let (mut cache, path, _dir) = create_test_cache();
        cache.put("https://x/a.mov", 5);
        cache.persist().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let file: CacheFile = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(
            file.entries.keys().collect::<Vec<_>>(),
            vec![&url_fingerprint("https://x/a.mov")]
        );
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let mut cache = SizeCache::load(blocker.join("sizes.bin"));
        cache.put("https://x/a.mov", 1);
        assert!(matches!(
            cache.persist(),
            Err(CoreError::CachePersistence { .. })
        ));
        assert!(!cache.flush());
        cache.discard();
    }

    #[test]
    fn test_clear_file() {
        let (mut cache, path, _dir) = create_test_cache();
        cache.put("https://x/a.mov", 1);
        cache.persist().unwrap();

        assert!(SizeCache::clear_file(&path).unwrap());
        assert!(!SizeCache::clear_file(&path).unwrap());
    }
}
