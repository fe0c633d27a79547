use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder for a resolution or format that cannot be read from the key.
pub const UNKNOWN: &str = "unknown";

/// One asset entry of a manifest.
pub type Asset = Map<String, Value>;

/// Validated manifest: a document whose `assets` field is a list.
///
/// Entries of `assets` that are not JSON objects are kept here and skipped
/// during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub(crate) assets: Vec<Value>,
}

impl ManifestDocument {
    /// Asset entries that are JSON objects, in document order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter_map(Value::as_object)
    }

    /// Number of raw entries in `assets`, including non-object ones.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// One (resolution, format)-specific URL of a video asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVariant {
    pub url: String,
    /// Caller-supplied source label (e.g. "Apple").
    pub platform: String,
    pub resolution: String,
    pub format: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub title: String,
    /// `None` means the size is unknown, not zero.
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl VideoVariant {
    /// Bucket key: `"<resolution>-<format>"`.
    pub fn res_format_key(&self) -> String {
        format!("{}-{}", self.resolution, self.format)
    }
}
