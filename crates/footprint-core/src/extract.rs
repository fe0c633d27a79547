//! Variant extraction: `url-<resolution>[-<format tokens>]` fields to records.

use serde_json::Value;
use url::Url;

use crate::model::{Asset, ManifestDocument, VideoVariant, UNKNOWN};

/// Prefix of asset fields that carry a video URL.
pub const URL_FIELD_PREFIX: &str = "url-";

const KEY_DELIMITER: char = '-';

/// Flatten a manifest into variants labelled with `platform`.
///
/// Fields with another prefix, non-string values or non-HTTP(S) URLs are
/// skipped. Asset order and field order are preserved; nothing is deduplicated.
pub fn extract(document: &ManifestDocument, platform: &str) -> Vec<VideoVariant> {
    let mut variants = Vec::new();

    for asset in document.assets() {
        for (key, value) in asset {
            let Some((resolution, format)) = parse_variant_key(key) else {
                continue;
            };
            let Some(url) = value.as_str().filter(|u| is_http_url(u)) else {
                continue;
            };

            variants.push(VideoVariant {
                url: url.to_string(),
                platform: platform.to_string(),
                resolution,
                format,
                asset_id: string_field(asset, "id"),
                title: asset_title(asset),
                size_bytes: None,
            });
        }
    }

    variants
}

/// Split a field key into `(resolution, format)`.
///
/// `url-4K-HDR` → `("4K", "HDR")`, `url-1080-H264-SDR` → `("1080", "H264-SDR")`,
/// `url-` → `("unknown", "unknown")`. Returns `None` without the prefix.
pub fn parse_variant_key(key: &str) -> Option<(String, String)> {
    let rest = key.strip_prefix(URL_FIELD_PREFIX)?;
    let (resolution, format) = match rest.split_once(KEY_DELIMITER) {
        Some((resolution, format)) => (resolution, format),
        None => (rest, ""),
    };
    Some((or_unknown(resolution), or_unknown(format)))
}

fn or_unknown(token: &str) -> String {
    if token.is_empty() {
        UNKNOWN.to_string()
    } else {
        token.to_string()
    }
}

fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn string_field(asset: &Asset, key: &str) -> String {
    asset
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn asset_title(asset: &Asset) -> String {
    asset
        .get("accessibilityLabel")
        .or_else(|| asset.get("title"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::load;

    #[test]
    fn test_extracts_resolution_and_format_pairs() {
        let doc = load(
            r#"{"assets": [{
                "id": "A1",
                "accessibilityLabel": "Hawaii",
                "url-4K-HDR": "https://x/a.mp4",
                "url-1080-SDR": "https://x/b.mp4"
            }]}"#,
            "tvos15.json",
        )
        .unwrap();

        let variants = extract(&doc, "Apple");
        let pairs: Vec<_> = variants
            .iter()
            .map(|v| (v.resolution.as_str(), v.format.as_str()))
            .collect();
        assert_eq!(pairs, vec![("4K", "HDR"), ("1080", "SDR")]);
        assert!(variants.iter().all(|v| v.platform == "Apple"));
        assert_eq!(variants[0].asset_id, "A1");
        assert_eq!(variants[0].title, "Hawaii");
        assert_eq!(variants[0].size_bytes, None);
    }

    #[test]
    fn test_parse_variant_key() {
        assert_eq!(
            parse_variant_key("url-1080-H264-SDR"),
            Some(("1080".into(), "H264-SDR".into()))
        );
        assert_eq!(
            parse_variant_key("url-4K"),
            Some(("4K".into(), UNKNOWN.into()))
        );
        assert_eq!(
            parse_variant_key("url-"),
            Some((UNKNOWN.into(), UNKNOWN.into()))
        );
        assert_eq!(parse_variant_key("shotID"), None);
        assert_eq!(parse_variant_key("pointsOfInterest"), None);
    }

    #[test]
    fn test_skips_non_conforming_fields() {
        let doc = load(
            r#"{"assets": [
                {"id": "a", "url-4K-HDR": 42, "url-1080-SDR": "ftp://x/a.mov",
                 "preview": "https://x/p.jpg", "url-720-H264": "not a url"},
                "not an asset",
                {"id": "b", "title": "Fallback", "url-1080-H264": "http://x/b.mov"}
            ]}"#,
            "m.json",
        )
        .unwrap();

        let variants = extract(&doc, "Amazon");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].asset_id, "b");
        assert_eq!(variants[0].title, "Fallback");
        assert_eq!(variants[0].format, "H264");
    }

    #[test]
    fn test_preserves_order_without_dedup() {
        let doc = load(
            r#"{"assets": [
                {"id": "1", "url-4K-SDR": "https://x/same.mov"},
                {"id": "2", "url-4K-SDR": "https://x/same.mov"}
            ]}"#,
            "m.json",
        )
        .unwrap();

        let ids: Vec<_> = extract(&doc, "Apple")
            .into_iter()
            .map(|v| v.asset_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
