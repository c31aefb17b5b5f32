//! Error types for routing failures

use thiserror::Error;

use super::decision::{summarize_attempts, AttemptRecord};

/// Errors surfaced to the caller of `Router::route`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// An explicit selection named an id the registry does not know
    #[error("provider '{id}' not found")]
    ProviderNotFound { id: String },

    /// Every candidate was tried (or none existed)
    #[error("no providers available: {}", summarize_attempts(.attempts))]
    NoProvidersAvailable { attempts: Vec<AttemptRecord> },

    /// A provider rejected the request itself; retrying elsewhere would not help
    #[error("request rejected by provider '{provider_id}': {reason}")]
    Rejected {
        provider_id: String,
        reason: String,
        attempts: Vec<AttemptRecord>,
    },
}

impl RoutingError {
    /// Attempts made before the error, empty for selection failures.
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            RoutingError::ProviderNotFound { .. } => &[],
            RoutingError::NoProvidersAvailable { attempts } => attempts,
            RoutingError::Rejected { attempts, .. } => attempts,
        }
    }
}
