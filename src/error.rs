//! Error types for the lead widget.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the widget backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}: {detail}")]
    Status {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("No leads found: {reason}")]
    NoLeads { reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Whether the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Just the reason, without endpoint or status. This is what the user sees.
    pub fn detail(&self) -> &str {
        match self {
            Self::Status { detail, .. } => detail,
            Self::Transport { reason, .. }
            | Self::InvalidResponse { reason, .. }
            | Self::NoLeads { reason } => reason,
            Self::Client(reason) => reason,
        }
    }
}

/// Voice capture errors.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input available: {0}")]
    Unavailable(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the widget.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_endpoint_and_code() {
        let err = ApiError::Status {
            endpoint: "/transcribe".to_string(),
            status: 415,
            detail: "Unsupported audio format".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "/transcribe returned HTTP 415: Unsupported audio format"
        );
        assert!(!err.is_transport());
        assert_eq!(err.detail(), "Unsupported audio format");
    }

    #[test]
    fn detail_drops_endpoint() {
        let err = ApiError::InvalidResponse {
            endpoint: "/transcribe".to_string(),
            reason: "No speech detected".to_string(),
        };
        assert_eq!(err.detail(), "No speech detected");
    }

    #[test]
    fn nested_errors_convert() {
        let err: Error = RecordingError::PermissionDenied("blocked".into()).into();
        assert!(matches!(err, Error::Recording(RecordingError::PermissionDenied(_))));
        assert!(err.to_string().contains("blocked"));
    }
}
