//! Size probe client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::retry::{ProbeState, RetryPolicy};
use crate::types::{ProbeConfig, TlsPolicy};

mod http;

use http::HttpBackend;

/// Determines the byte size of remote files without downloading them.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    http: HttpBackend,
    policy: RetryPolicy,
}

impl ProbeClient {
    pub fn new(config: ProbeConfig) -> ProbeResult<Self> {
        let mut default_headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| ProbeError::Config {
                message: format!("invalid user agent: {}", e),
            })?;
        default_headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .danger_accept_invalid_certs(config.tls == TlsPolicy::Relaxed)
            .build()
            .map_err(|e| ProbeError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend { client },
            policy: RetryPolicy::from_config(&config),
        })
    }

    pub fn from_env() -> ProbeResult<Self> {
        Self::new(ProbeConfig::from_env())
    }

    /// Determine the size of `url`, retrying transient failures with backoff.
    pub async fn probe(&self, url: &str) -> ProbeResult<u64> {
        let mut state = ProbeState::Pending;

        loop {
            state = match state {
                ProbeState::Pending => state.begin(),
                ProbeState::Attempting { attempt } => {
                    debug!(url, attempt, "probing size");
                    let result = self.http.probe_once(url).await;
                    state.record(result, &self.policy)
                }
                ProbeState::RetryWait {
                    next_attempt,
                    delay,
                } => {
                    warn!(
                        url,
                        retry = next_attempt - 1,
                        max_attempts = self.policy.max_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        "retrying probe"
                    );
                    tokio::time::sleep(delay).await;
                    state.begin()
                }
                ProbeState::Success { .. } | ProbeState::Exhausted { .. } => {
                    return state.into_result();
                }
            };
        }
    }
}
