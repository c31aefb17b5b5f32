//! Error types for agent operations.

use thiserror::Error;

/// Errors that can occur while talking to a provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Agent configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Whether another provider might serve the same request.
    ///
    /// Only responses that blame the shape of the request itself are
    /// terminal: 400, 413 and 422. Auth, missing-route and rate-limit
    /// failures belong to one provider and leave the others worth trying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Upstream { status, .. } => !matches!(status, 400 | 413 | 422),
            _ => true,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            AgentError::Timeout(timeout_ms)
        } else {
            AgentError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16) -> AgentError {
        AgentError::Upstream {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(AgentError::Network("refused".into()).is_retryable());
        assert!(AgentError::Timeout(5000).is_retryable());
        assert!(AgentError::InvalidResponse("junk".into()).is_retryable());
        assert!(upstream(500).is_retryable());
        assert!(upstream(503).is_retryable());
        assert!(upstream(402).is_retryable());
        assert!(upstream(429).is_retryable());
        assert!(upstream(401).is_retryable());
        assert!(upstream(403).is_retryable());
        assert!(upstream(404).is_retryable());
        assert!(!upstream(400).is_retryable());
        assert!(!upstream(413).is_retryable());
        assert!(!upstream(422).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            upstream(503).to_string(),
            "Provider error 503: ".to_string()
        );
        assert_eq!(AgentError::Timeout(250).to_string(), "Request timeout after 250ms");
    }
}
