//! Remote byte-size prober for video assets.
//!
//! Each probe tries a `HEAD` request and reads `Content-Length`; when that is
//! missing it sends `GET` with `Range: bytes=0-0` and reads the total from
//! `Content-Range`. Nothing beyond one byte of body is ever transferred.
//!
//! # Quick Start
//!
//! ```no_run
//! use footprint_probe::{ProbeClient, ProbeConfig};
//!
//! # async fn example() -> Result<(), footprint_probe::ProbeError> {
//! let client = ProbeClient::new(ProbeConfig::default())?;
//! let size = client.probe("https://example.com/video.mov").await?;
//! println!("{} bytes", size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FOOTPRINT_PROBE_TIMEOUT` | Request timeout in seconds (default: 10) |
//! | `FOOTPRINT_MAX_ATTEMPTS` | Attempts per URL (default: 3) |
//! | `FOOTPRINT_RETRY_BASE_MS` | First backoff delay in ms, doubled per retry (default: 1000) |
//! | `FOOTPRINT_STRICT_TLS` | Validate certificates (default: relaxed) |

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::ProbeClient;
pub use error::{ProbeError, ProbeResult};
pub use retry::{Backoff, ProbeState, RetryPolicy};
pub use types::{parse_content_range_total, ProbeConfig, SizeHeaders, TlsPolicy};
