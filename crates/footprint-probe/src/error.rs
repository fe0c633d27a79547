//! Error types for the size prober.

/// Probe errors.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Request timed out.
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// Connection could not be established.
    #[error("connection error: {message}")]
    Connect { message: String },

    /// Any other transport-level failure (TLS, protocol, body read).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Server answered with a status that cannot carry a size.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// Both phases answered but neither reported a total size.
    #[error("size not reported by server")]
    Undetermined,

    /// All attempts failed with transient errors.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ProbeError>,
    },

    /// Client could not be built from the configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ProbeError {
    /// Whether another attempt on the same URL may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. } => true,
            Self::Status { status } => *status == 429 || (500..=599).contains(status),
            Self::Undetermined | Self::Exhausted { .. } | Self::Config { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout { message }
        } else if err.is_connect() {
            Self::Connect { message }
        } else {
            Self::Transport { message }
        }
    }
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;
