//! Error types for health probing.

use crate::agent::AgentError;
use thiserror::Error;

/// Reasons a probe can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HealthCheckError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Invalid response
    #[error("invalid response: {0}")]
    ParseError(String),

    /// Provider cannot be probed as configured
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HealthCheckError {
    /// Convert an agent error into the probe taxonomy.
    pub fn from_agent_error(err: AgentError, timeout_seconds: u64) -> Self {
        match err {
            AgentError::Network(msg) => HealthCheckError::ConnectionFailed(msg),
            AgentError::Timeout(_) => HealthCheckError::Timeout(timeout_seconds),
            AgentError::Upstream { status, .. } => HealthCheckError::HttpError(status),
            AgentError::InvalidResponse(msg) => HealthCheckError::ParseError(msg),
            AgentError::Configuration(msg) => HealthCheckError::Configuration(msg),
        }
    }
}
