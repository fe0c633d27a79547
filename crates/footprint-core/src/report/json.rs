use serde_json::{json, Map, Value};

use crate::aggregate::{Aggregation, AggregationBucket, Filters, ResFormatBuckets};
use crate::fetch::FetchStats;
use crate::report::console::format_size;

fn bucket_json(bucket: &AggregationBucket) -> Value {
    json!({
        "resolution": bucket.resolution,
        "format": bucket.format,
        "count": bucket.count,
        "total_size_bytes": bucket.total_size_bytes,
        "failed_count": bucket.failed_count,
        "human_size": format_size(Some(bucket.total_size_bytes)),
    })
}

fn buckets_json(buckets: &ResFormatBuckets) -> Value {
    Value::Object(
        buckets
            .iter()
            .map(|(key, bucket)| (key.clone(), bucket_json(bucket)))
            .collect::<Map<String, Value>>(),
    )
}

/// Machine-readable report. Key order follows the sorted aggregation.
pub fn to_json(aggregation: &Aggregation, stats: &FetchStats, filters: &Filters) -> Value {
    let platforms: Map<String, Value> = aggregation
        .platforms
        .iter()
        .map(|(platform, buckets)| (platform.clone(), buckets_json(buckets)))
        .collect();

    json!({
        "fetch": {
            "successful": stats.successful,
            "failed": stats.failed,
            "cache_hits": stats.cache_hits,
            "probed": stats.probed,
        },
        "filters": {
            "platform": filters.platform,
            "resolution": filters.resolution,
            "format": filters.format,
        },
        "platforms": platforms,
        "breakdown": buckets_json(&aggregation.breakdown),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::VideoVariant;

    #[test]
    fn test_json_report_shape() {
        let variants = vec![VideoVariant {
            url: "https://x/a.mov".into(),
            platform: "Apple".into(),
            resolution: "4K".into(),
            format: "HDR".into(),
            asset_id: "A".into(),
            title: String::new(),
            size_bytes: Some(1536),
        }];
        let filters = Filters::default();
        let report = to_json(
            &aggregate(&variants, &filters),
            &FetchStats {
                successful: 1,
                ..FetchStats::default()
            },
            &filters,
        );

        let bucket = &report["platforms"]["Apple"]["4K-HDR"];
        assert_eq!(bucket["count"], 1);
        assert_eq!(bucket["total_size_bytes"], 1536);
        assert_eq!(bucket["human_size"], "1.50 KB");
        assert_eq!(report["breakdown"]["4K-HDR"]["failed_count"], 0);
        assert_eq!(report["fetch"]["successful"], 1);
        assert!(report["filters"]["platform"].is_null());
    }
}
