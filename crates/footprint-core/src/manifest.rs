//! Manifest loading.
//!
//! A manifest is accepted only whole: a JSON object with a list-typed
//! `assets` field. Anything else is rejected for that manifest and the
//! caller moves on to the next one.

use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::config::{CatalogConfig, ManifestSource};
use crate::errors::{CoreError, CoreResult};
use crate::extract::extract;
use crate::model::{ManifestDocument, VideoVariant};

/// Parse manifest text. `origin` names the source in error messages.
pub fn load(text: &str, origin: &str) -> CoreResult<ManifestDocument> {
    let value: Value = serde_json::from_str(text).map_err(|e| CoreError::MalformedInput {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    let schema = |message: &str| CoreError::SchemaViolation {
        origin: origin.to_string(),
        message: message.to_string(),
    };

    let Value::Object(mut root) = value else {
        return Err(schema("manifest is not an object"));
    };

    match root.remove("assets") {
        Some(Value::Array(assets)) => Ok(ManifestDocument { assets }),
        Some(_) => Err(schema("'assets' is not a list")),
        None => Err(schema("manifest missing 'assets' key")),
    }
}

/// Read and parse a manifest file.
pub async fn load_file(path: &Path) -> CoreResult<ManifestDocument> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| CoreError::io(path, e))?;
    load(&text, &path.display().to_string())
}

/// Per-manifest result of loading a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestStatus {
    Loaded { variants: usize },
    Failed { reason: String },
}

/// Variants of every manifest that loaded, plus per-manifest status.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub variants: Vec<VideoVariant>,
    pub manifests: Vec<(ManifestSource, ManifestStatus)>,
}

impl CatalogLoad {
    pub fn manifest_errors(&self) -> usize {
        self.manifests
            .iter()
            .filter(|(_, status)| matches!(status, ManifestStatus::Failed { .. }))
            .count()
    }

    /// Fails with [`CoreError::NoVariantsFound`] when nothing was extracted.
    pub fn require_variants(self) -> CoreResult<Self> {
        if self.variants.is_empty() {
            return Err(CoreError::NoVariantsFound {
                manifest_errors: self.manifest_errors(),
            });
        }
        Ok(self)
    }
}

/// Load every manifest of the catalog in order, skipping the ones that fail.
pub async fn load_catalog(config: &CatalogConfig) -> CatalogLoad {
    let mut out = CatalogLoad::default();

    for source in &config.manifests {
        let path = config.resolve(source);
        let status = match load_file(&path).await {
            Ok(document) => {
                let variants = extract(&document, &source.platform);
                info!(
                    manifest = %path.display(),
                    platform = %source.platform,
                    variants = variants.len(),
                    "loaded manifest"
                );
                let count = variants.len();
                out.variants.extend(variants);
                ManifestStatus::Loaded { variants: count }
            }
            Err(e) => {
                warn!(manifest = %path.display(), error = %e, "skipping manifest");
                ManifestStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        out.manifests.push((source.clone(), status));
    }

    out
}
