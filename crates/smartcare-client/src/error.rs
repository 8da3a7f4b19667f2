use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the transport, session and resource layers.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("401: {message}")]
    Unauthorized { message: String },

    #[error("{status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("{status}: {message}")]
    ServerFault { status: u16, message: String },

    #[error("Malformed credential artifact: {0}")]
    MalformedArtifact(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Client store error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Translate a non-2xx status and the server's message text.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status.as_u16() {
            401 => Self::Unauthorized { message },
            code @ 500..=599 => Self::ServerFault {
                status: code,
                message,
            },
            code => Self::Rejected {
                status: code,
                message,
            },
        }
    }

    pub fn malformed_artifact(reason: impl Into<String>) -> Self {
        Self::MalformedArtifact(reason.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// HTTP status carried by the error, if it came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Rejected { status, .. } | Self::ServerFault { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided message text, or the rendered error otherwise.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized { message }
            | Self::Rejected { message, .. }
            | Self::ServerFault { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether repeating the same request could succeed. Hooks never retry
    /// on their own; front ends may offer it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ServerFault { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::Network,
            Self::Unauthorized { .. } => ErrorCategory::Unauthorized,
            Self::Rejected { .. } => ErrorCategory::Rejected,
            Self::ServerFault { .. } => ErrorCategory::ServerFault,
            Self::MalformedArtifact(_) => ErrorCategory::Artifact,
            Self::Decode(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration(format!("invalid URL: {err}"))
    }
}

/// Error categories for logging and notification variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Unauthorized,
    Rejected,
    ServerFault,
    Artifact,
    Serialization,
    Configuration,
    Storage,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Rejected => "rejected",
            Self::ServerFault => "server_fault",
            Self::Artifact => "artifact",
            Self::Serialization => "serialization",
            Self::Configuration => "configuration",
            Self::Storage => "storage",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_translation() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, "Unauthorized");
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));

        let err = ClientError::from_status(StatusCode::NOT_FOUND, "Patient not found");
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert_eq!(err.to_string(), "404: Patient not found");

        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream");
        assert_eq!(err.category(), ErrorCategory::ServerFault);
        assert_eq!(err.message(), "upstream");
        assert!(err.is_retryable());
        assert!(!ClientError::from_status(StatusCode::BAD_REQUEST, "bad").is_retryable());
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        let err = ClientError::malformed_artifact("not a token");
        assert_eq!(err.status(), None);
        assert_eq!(err.category(), ErrorCategory::Artifact);
        assert_eq!(ErrorCategory::Artifact.to_string(), "artifact");
    }
}
