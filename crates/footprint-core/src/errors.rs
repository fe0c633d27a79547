//! Error types for the reconciliation engine.

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Manifest text is not valid JSON.
    #[error("malformed manifest {origin}: {message}")]
    MalformedInput { origin: String, message: String },

    /// Manifest parsed but does not have the expected shape.
    #[error("schema violation in {origin}: {message}")]
    SchemaViolation { origin: String, message: String },

    /// Filesystem error.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Size cache could not be written.
    #[error("cache persistence failed: {message}")]
    CachePersistence { message: String },

    /// No manifest produced any variant.
    #[error("no videos found in any manifest ({manifest_errors} manifest error(s))")]
    NoVariantsFound { manifest_errors: usize },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoVariantsFound { .. } => 1,
            Self::Io { .. } => 1,
            Self::Config { .. } => 2,
            Self::MalformedInput { .. } | Self::SchemaViolation { .. } => 2,
            Self::CachePersistence { .. } => 2,
        }
    }

    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
