//! Probe configuration and response header parsing.

use serde::{Deserialize, Serialize};

/// Certificate validation policy for probe requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsPolicy {
    /// Accept invalid certificates. Some CDN hosts in the catalog present
    /// broken chains on every request; only HEAD and single-byte range
    /// requests are ever sent.
    #[default]
    Relaxed,

    /// Full certificate validation.
    Strict,
}

/// Prober configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum attempts per URL (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles for every further attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Apply ±10% jitter to backoff delays.
    #[serde(default = "default_jitter")]
    pub jitter: bool,

    /// Certificate validation policy.
    #[serde(default)]
    pub tls: TlsPolicy,

    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_jitter() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!("footprint-probe/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            jitter: default_jitter(),
            tls: TlsPolicy::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProbeConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `FOOTPRINT_PROBE_TIMEOUT` | Per-request timeout in seconds |
    /// | `FOOTPRINT_MAX_ATTEMPTS` | Attempts per URL |
    /// | `FOOTPRINT_RETRY_BASE_MS` | First backoff delay in milliseconds |
    /// | `FOOTPRINT_STRICT_TLS` | Enforce certificate validation |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: env_parse("FOOTPRINT_PROBE_TIMEOUT").unwrap_or(defaults.timeout_secs),
            max_attempts: env_parse("FOOTPRINT_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
            base_delay_ms: env_parse("FOOTPRINT_RETRY_BASE_MS").unwrap_or(defaults.base_delay_ms),
            tls: if env_flag("FOOTPRINT_STRICT_TLS") {
                TlsPolicy::Strict
            } else {
                TlsPolicy::Relaxed
            },
            ..defaults
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the attempt limit. Zero is treated as one.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the first backoff delay.
    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Enable or disable backoff jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the certificate policy.
    pub fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Size-related headers of a probe response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeHeaders {
    /// Content-Length.
    pub content_length: Option<u64>,

    /// Total from `Content-Range: bytes a-b/total`.
    pub range_total: Option<u64>,
}

impl SizeHeaders {
    /// Parse headers from a response.
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        Self {
            content_length: headers
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
            range_total: headers
                .get(reqwest::header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total),
        }
    }
}

/// Extract the complete length from a `Content-Range` value.
///
/// Accepts `bytes 0-0/12345`; an unknown total (`*`) yields `None`.
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (unit, rest) = value.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (_, total) = rest.rsplit_once('/')?;
    total.trim().parse().ok()
}
