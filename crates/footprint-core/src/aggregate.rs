//! Grouping of variants by platform and resolution-format.
//!
//! Every matching variant increments its bucket's `count`; a known size adds
//! to `total_size_bytes`, an unknown size increments `failed_count`. All maps
//! are `BTreeMap`s so iteration (and therefore report output) is sorted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::VideoVariant;

/// Conjunctive, case-insensitive filters. `None` leaves a dimension open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub platform: Option<String>,
    pub resolution: Option<String>,
    pub format: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.platform.is_none() && self.resolution.is_none() && self.format.is_none()
    }

    pub fn matches(&self, variant: &VideoVariant) -> bool {
        fn dim(filter: &Option<String>, value: &str) -> bool {
            filter
                .as_deref()
                .map_or(true, |f| f.eq_ignore_ascii_case(value))
        }
        dim(&self.platform, &variant.platform)
            && dim(&self.resolution, &variant.resolution)
            && dim(&self.format, &variant.format)
    }

    /// `Platform=Apple, Resolution=4K, Format=Any`
    pub fn describe(&self) -> String {
        let any = |f: &Option<String>| f.clone().unwrap_or_else(|| "Any".to_string());
        format!(
            "Platform={}, Resolution={}, Format={}",
            any(&self.platform),
            any(&self.resolution),
            any(&self.format)
        )
    }
}

/// Totals for one (platform, resolution, format) group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationBucket {
    pub resolution: String,
    pub format: String,
    pub count: usize,
    pub total_size_bytes: u64,
    pub failed_count: usize,
    #[serde(skip)]
    pub videos: Vec<VideoVariant>,
}

impl AggregationBucket {
    fn new(variant: &VideoVariant) -> Self {
        Self {
            resolution: variant.resolution.clone(),
            format: variant.format.clone(),
            ..Self::default()
        }
    }

    fn add(&mut self, variant: &VideoVariant) {
        self.count += 1;
        match variant.size_bytes {
            Some(size) => self.total_size_bytes += size,
            None => self.failed_count += 1,
        }
        self.videos.push(variant.clone());
    }

    /// Members that contributed a size.
    pub fn sized_count(&self) -> usize {
        self.count - self.failed_count
    }
}

/// `"resolution-format"` → bucket.
pub type ResFormatBuckets = BTreeMap<String, AggregationBucket>;

/// platform → `"resolution-format"` → bucket.
pub type BucketMap = BTreeMap<String, ResFormatBuckets>;

/// Per-platform grouping plus the cross-platform breakdown of the same
/// filtered variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub platforms: BucketMap,
    pub breakdown: ResFormatBuckets,
}

pub fn aggregate(variants: &[VideoVariant], filters: &Filters) -> Aggregation {
    let mut out = Aggregation::default();

    for variant in variants.iter().filter(|v| filters.matches(v)) {
        let key = variant.res_format_key();

        out.platforms
            .entry(variant.platform.clone())
            .or_default()
            .entry(key.clone())
            .or_insert_with(|| AggregationBucket::new(variant))
            .add(variant);

        out.breakdown
            .entry(key)
            .or_insert_with(|| AggregationBucket::new(variant))
            .add(variant);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(platform: &str, resolution: &str, format: &str, size: Option<u64>) -> VideoVariant {
        VideoVariant {
            url: format!("https://x/{platform}/{resolution}-{format}"),
            platform: platform.into(),
            resolution: resolution.into(),
            format: format.into(),
            asset_id: String::new(),
            title: String::new(),
            size_bytes: size,
        }
    }

    fn sample() -> Vec<VideoVariant> {
        vec![
            v("Apple", "4K", "HDR", Some(100)),
            v("Apple", "4K", "HDR", None),
            v("Apple", "1080", "SDR", Some(50)),
            v("Amazon", "4K", "HDR", Some(7)),
            v("Amazon", "1080", "H264", Some(0)),
        ]
    }

    #[test]
    fn test_bucket_invariants() {
        let agg = aggregate(&sample(), &Filters::default());
        for buckets in agg.platforms.values() {
            for bucket in buckets.values() {
                let sized: Vec<_> = bucket.videos.iter().filter_map(|v| v.size_bytes).collect();
                assert_eq!(bucket.count, bucket.failed_count + sized.len());
                assert_eq!(bucket.total_size_bytes, sized.iter().sum::<u64>());
                assert_eq!(bucket.sized_count(), sized.len());
            }
        }

        let apple_4k = &agg.platforms["Apple"]["4K-HDR"];
        assert_eq!(apple_4k.count, 2);
        assert_eq!(apple_4k.total_size_bytes, 100);
        assert_eq!(apple_4k.failed_count, 1);
    }

    #[test]
    fn test_zero_size_is_known() {
        let agg = aggregate(&sample(), &Filters::default());
        let bucket = &agg.platforms["Amazon"]["1080-H264"];
        assert_eq!(bucket.failed_count, 0);
        assert_eq!(bucket.total_size_bytes, 0);
    }

    #[test]
    fn test_breakdown_spans_platforms() {
        let agg = aggregate(&sample(), &Filters::default());
        let hdr = &agg.breakdown["4K-HDR"];
        assert_eq!(hdr.count, 3);
        assert_eq!(hdr.total_size_bytes, 107);
        assert_eq!(hdr.failed_count, 1);
        assert_eq!(
            agg.breakdown.keys().collect::<Vec<_>>(),
            vec!["1080-H264", "1080-SDR", "4K-HDR"]
        );
    }

    #[test]
    fn test_filter_platform_and_resolution() {
        let filters = Filters {
            platform: Some("apple".into()),
            resolution: Some("4k".into()),
            format: None,
        };
        let agg = aggregate(&sample(), &filters);

        assert_eq!(agg.platforms.keys().collect::<Vec<_>>(), vec!["Apple"]);
        assert_eq!(
            agg.platforms["Apple"].keys().collect::<Vec<_>>(),
            vec!["4K-HDR"]
        );
        assert_eq!(filters.describe(), "Platform=apple, Resolution=4k, Format=Any");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let variants = sample();
        let filters = Filters {
            format: Some("HDR".into()),
            ..Filters::default()
        };
        let first = aggregate(&variants, &filters);
        let second = aggregate(&variants, &filters);
        assert_eq!(first, second);
        assert_eq!(
            first.platforms.keys().collect::<Vec<_>>(),
            second.platforms.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate(&[], &Filters::default());
        assert!(agg.platforms.is_empty());
        assert!(agg.breakdown.is_empty());
    }
}
