use std::fmt::Write as _;

use crate::aggregate::{BucketMap, ResFormatBuckets};
use crate::fetch::FetchStats;

/// Default title of the per-platform summary.
pub const SUMMARY_TITLE: &str = "VIDEO SIZE SUMMARY BY PLATFORM, RESOLUTION AND FORMAT";

/// Title of the cross-platform breakdown.
pub const BREAKDOWN_TITLE: &str = "BREAKDOWN BY RESOLUTION AND FORMAT ACROSS ALL PLATFORMS";

const RULE_WIDTH: usize = 80;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with two decimals: `1536` → `"1.50 KB"`.
///
/// Absent and zero sizes render as `"Unknown"`.
pub fn format_size(size_bytes: Option<u64>) -> String {
    let Some(bytes) = size_bytes.filter(|b| *b > 0) else {
        return "Unknown".to_string();
    };

    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

fn rule(out: &mut String, ch: char) {
    out.extend(std::iter::repeat(ch).take(RULE_WIDTH));
    out.push('\n');
}

fn header(out: &mut String, title: &str) {
    out.push('\n');
    rule(out, '=');
    out.push_str(title);
    out.push('\n');
    rule(out, '=');
}

fn failed_note(failed: usize) -> String {
    if failed > 0 {
        format!(" ({} failed)", failed)
    } else {
        String::new()
    }
}

fn bucket_lines(out: &mut String, buckets: &ResFormatBuckets, indent: &str) {
    for (key, bucket) in buckets {
        let _ = writeln!(
            out,
            "{}{}: {} videos, Total: {}{}",
            indent,
            key,
            bucket.count,
            format_size(Some(bucket.total_size_bytes)),
            failed_note(bucket.failed_count)
        );
    }
}

/// Per-platform summary, platforms and buckets in sorted order.
pub fn format_summary(buckets: &BucketMap, title: &str) -> String {
    let mut out = String::new();
    header(&mut out, title);

    if buckets.is_empty() {
        out.push_str("\nNo videos found matching the criteria.\n");
        return out;
    }

    for (platform, res_formats) in buckets {
        let _ = writeln!(out, "\n{}:", platform.to_uppercase());
        out.extend(std::iter::repeat('-').take(40));
        out.push('\n');
        bucket_lines(&mut out, res_formats, "  ");
    }
    out
}

/// Cross-platform resolution-format breakdown.
pub fn format_breakdown(breakdown: &ResFormatBuckets) -> String {
    let mut out = String::new();
    header(&mut out, BREAKDOWN_TITLE);
    bucket_lines(&mut out, breakdown, "");
    out
}

pub fn format_fetch_summary(stats: &FetchStats) -> String {
    format!(
        "\nFetch summary:\n  Successful: {}\n  Failed: {}\n  Success rate: {:.1}%\n",
        stats.successful,
        stats.failed,
        stats.success_rate()
    )
}

pub fn format_footer(elapsed_secs: f64) -> String {
    let mut out = String::new();
    out.push('\n');
    rule(&mut out, '=');
    let _ = writeln!(out, "Total execution time: {:.2} seconds", elapsed_secs);
    rule(&mut out, '=');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, Filters};
    use crate::model::VideoVariant;

    fn v(platform: &str, resolution: &str, format: &str, size: Option<u64>) -> VideoVariant {
        VideoVariant {
            url: String::new(),
            platform: platform.into(),
            resolution: resolution.into(),
            format: format.into(),
            asset_id: String::new(),
            title: String::new(),
            size_bytes: size,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(Some(1536)), "1.50 KB");
        assert_eq!(format_size(Some(512)), "512.00 B");
        assert_eq!(format_size(Some(1024 * 1024)), "1.00 MB");
        assert_eq!(format_size(Some(3 * 1024 * 1024 * 1024)), "3.00 GB");
        assert_eq!(format_size(Some(1024u64.pow(5) * 2)), "2.00 PB");
        assert_eq!(format_size(None), "Unknown");
        assert_eq!(format_size(Some(0)), "Unknown");
    }

    #[test]
    fn test_summary_is_sorted_and_annotated() {
        let agg = aggregate(
            &[
                v("Apple", "4K", "HDR", Some(2048)),
                v("Apple", "1080", "SDR", None),
                v("Amazon", "4K", "HDR", Some(1024)),
            ],
            &Filters::default(),
        );
        let text = format_summary(&agg.platforms, SUMMARY_TITLE);

        let amazon = text.find("AMAZON:").unwrap();
        let apple = text.find("APPLE:").unwrap();
        assert!(amazon < apple);
        assert!(text.contains("  4K-HDR: 1 videos, Total: 1.00 KB\n"));
        assert!(text.contains("  1080-SDR: 1 videos, Total: Unknown (1 failed)\n"));
        assert!(text.find("1080-SDR").unwrap() < text.find("  4K-HDR: 1 videos, Total: 2.00 KB").unwrap());
    }

    #[test]
    fn test_summary_empty() {
        let text = format_summary(&BucketMap::new(), "FILTERED RESULTS: x");
        assert!(text.contains("FILTERED RESULTS: x"));
        assert!(text.contains("No videos found matching the criteria."));
    }

    #[test]
    fn test_breakdown_lines() {
        let agg = aggregate(
            &[
                v("Apple", "4K", "HDR", Some(1024)),
                v("Amazon", "4K", "HDR", None),
            ],
            &Filters::default(),
        );
        let text = format_breakdown(&agg.breakdown);
        assert!(text.contains(BREAKDOWN_TITLE));
        assert!(text.contains("4K-HDR: 2 videos, Total: 1.00 KB (1 failed)\n"));
    }

    #[test]
    fn test_fetch_summary() {
        let stats = FetchStats {
            successful: 3,
            failed: 1,
            cache_hits: 2,
            probed: 2,
        };
        let text = format_fetch_summary(&stats);
        assert!(text.contains("Success rate: 75.0%"));
    }
}
