//! Catalog configuration: which manifests to read and where the cache lives.
//!
//! ```yaml
//! base_path: app/src/main/res/raw
//! workers: 20
//! cache_file: /var/tmp/footprint/video-sizes.bin
//! manifests:
//!   - path: tvos15.json
//!     platform: Apple
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Default width of the probe worker pool.
pub const DEFAULT_WORKERS: usize = 20;

/// Cache file name used when no platform cache directory is available.
pub const FALLBACK_CACHE_FILE: &str = ".video_size_cache.bin";

/// One manifest and the platform label its variants get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSource {
    pub path: PathBuf,
    pub platform: String,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>, platform: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            platform: platform.into(),
        }
    }

    /// Parse `PATH=PLATFORM`.
    pub fn parse(arg: &str) -> CoreResult<Self> {
        match arg.rsplit_once('=') {
            Some((path, platform)) if !path.is_empty() && !platform.trim().is_empty() => {
                Ok(Self::new(path, platform.trim()))
            }
            _ => Err(CoreError::Config {
                message: format!("expected PATH=PLATFORM, got '{}'", arg),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory relative manifest paths are resolved against.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Manifests in processing order.
    #[serde(default = "default_manifests")]
    pub manifests: Vec<ManifestSource>,

    /// Concurrent probe workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Size cache location; `None` uses [`default_cache_file`].
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

fn default_base_path() -> PathBuf {
    PathBuf::from("app/src/main/res/raw")
}

fn default_manifests() -> Vec<ManifestSource> {
    vec![
        ManifestSource::new("tvos15.json", "Apple"),
        ManifestSource::new("fireos8.json", "Amazon"),
        ManifestSource::new("comm1.json", "Jetson Creative"),
        ManifestSource::new("comm2.json", "Robin Fourcade"),
    ]
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            manifests: default_manifests(),
            workers: default_workers(),
            cache_file: None,
        }
    }
}

impl CatalogConfig {
    /// Read a YAML catalog file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| CoreError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `FOOTPRINT_WORKERS` | Probe worker pool width |
    /// | `FOOTPRINT_CACHE_FILE` | Size cache location |
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(workers) = std::env::var("FOOTPRINT_WORKERS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.workers = workers;
        }
        if let Ok(path) = std::env::var("FOOTPRINT_CACHE_FILE") {
            if !path.is_empty() {
                self.cache_file = Some(PathBuf::from(path));
            }
        }
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.workers == 0 {
            return Err(CoreError::Config {
                message: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_manifests(mut self, manifests: Vec<ManifestSource>) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_cache_file(mut self, cache_file: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(cache_file.into());
        self
    }

    /// Full path of a manifest; absolute paths are kept as-is.
    pub fn resolve(&self, source: &ManifestSource) -> PathBuf {
        if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.base_path.join(&source.path)
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_file)
    }
}

/// `<cache dir>/footprint/video-sizes.bin`, or [`FALLBACK_CACHE_FILE`] in the
/// working directory.
pub fn default_cache_file() -> PathBuf {
    dirs::cache_dir()
        .map(|base| base.join("footprint").join("video-sizes.bin"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_FILE))
}
