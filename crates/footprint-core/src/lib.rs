//! Catalog size reconciliation.
//!
//! Loads per-platform video manifests, extracts every (resolution, format)
//! URL, resolves remote byte sizes through a bounded worker pool backed by a
//! persistent cache, and aggregates the totals per platform.
//!
//! ```no_run
//! use std::sync::Arc;
//! use footprint_core::{aggregate, load_catalog, CatalogConfig, Coordinator, Filters, SizeCache};
//! use footprint_probe::ProbeClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::default();
//! let mut catalog = load_catalog(&config).await.require_variants()?;
//! let mut cache = SizeCache::load(config.cache_path());
//!
//! let coordinator = Coordinator::new(Arc::new(ProbeClient::from_env()?));
//! let stats = coordinator.resolve_sizes(&mut catalog.variants, &mut cache).await;
//! let totals = aggregate(&catalog.variants, &Filters::default());
//! # let _ = (stats, totals);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod bitrate;
pub mod cache;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod fingerprint;
pub mod manifest;
pub mod model;
pub mod report;

pub use aggregate::{aggregate, Aggregation, AggregationBucket, BucketMap, Filters};
pub use cache::SizeCache;
pub use config::{CatalogConfig, ManifestSource};
pub use errors::{CoreError, CoreResult};
pub use extract::extract;
pub use fetch::{Coordinator, FetchStats, SizeProbe};
pub use manifest::{load_catalog, CatalogLoad, ManifestStatus};
pub use model::{ManifestDocument, VideoVariant};
