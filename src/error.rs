use thiserror::Error;

/// Result type for storage operations
pub type OssResult<T> = Result<T, OssError>;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum OssError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("storage backend unavailable: {source}")]
    BackendUnavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O failure: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("archive composition failed: {reason}")]
    Compression {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl OssError {
    /// Create an invalid argument error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendUnavailable {
            source: Box::new(error),
        }
    }

    /// Create a compression error with no underlying cause
    pub fn compression<S: Into<String>>(reason: S) -> Self {
        Self::Compression {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a compression error wrapping the failure that aborted composition
    pub fn compression_from<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Compression {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True when the error reports a missing bucket or object
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
