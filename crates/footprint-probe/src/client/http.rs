//! HTTP layer: the two probe phases and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs drives
//! retries and never looks at a response.

use reqwest::header::RANGE;
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::types::SizeHeaders;

/// Outcome of the metadata (HEAD) phase.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HeadOutcome {
    Length(u64),
    NoLength,
}

/// HTTP backend for making requests.
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
}

impl HttpBackend {
    /// One attempt: HEAD first, then a single-byte range GET.
    pub(crate) async fn probe_once(&self, url: &str) -> ProbeResult<u64> {
        if let HeadOutcome::Length(size) = self.head(url).await? {
            debug!(url, size, "size from content-length");
            return Ok(size);
        }

        let size = self.first_byte_range(url).await?;
        debug!(url, size, "size from content-range");
        Ok(size)
    }

    async fn head(&self, url: &str) -> ProbeResult<HeadOutcome> {
        let response = self.client.request(Method::HEAD, url).send().await?;
        let status = response.status();

        if status.is_success() {
            let headers = SizeHeaders::from_headers(response.headers());
            return Ok(match headers.content_length {
                Some(len) if len > 0 => HeadOutcome::Length(len),
                _ => HeadOutcome::NoLength,
            });
        }

        match classify_status(status) {
            // Some origins reject HEAD outright but honour ranged GETs.
            Err(ProbeError::Status { status }) if is_method_rejection(status) => {
                debug!(url, status, "HEAD rejected, falling back to range request");
                Ok(HeadOutcome::NoLength)
            }
            Err(e) => Err(e),
            Ok(()) => Ok(HeadOutcome::NoLength),
        }
    }

    async fn first_byte_range(&self, url: &str) -> ProbeResult<u64> {
        let response = self
            .client
            .request(Method::GET, url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await?;

        classify_status(response.status())?;

        SizeHeaders::from_headers(response.headers())
            .range_total
            .ok_or(ProbeError::Undetermined)
    }
}

/// Map a non-success status to an error. 2xx and 3xx pass through.
fn classify_status(status: StatusCode) -> ProbeResult<()> {
    match status.as_u16() {
        200..=399 => Ok(()),
        code => Err(ProbeError::Status { status: code }),
    }
}

fn is_method_rejection(status: u16) -> bool {
    matches!(status, 403 | 405 | 501)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(classify_status(StatusCode::PARTIAL_CONTENT).is_ok());
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Err(ProbeError::Status { status: 404 })
        ));
        assert!(classify_status(StatusCode::BAD_GATEWAY)
            .unwrap_err()
            .is_transient());
    }
}
