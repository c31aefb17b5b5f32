//! Provider agents: the outbound protocol spoken to each compute provider.
//!
//! An agent knows how to ask a provider to describe itself, how to check
//! that it is reachable, and how to run one inference call. Discovery, the
//! prober and the router all talk to providers through this trait so they
//! can treat local nodes and cloud providers uniformly.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub mod cloud;
pub mod error;
pub mod factory;
pub mod local;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub use cloud::CloudAgent;
pub use error::AgentError;
pub use factory::{AgentFactory, HttpAgentFactory};
pub use local::LocalNodeAgent;
pub use types::{ChatMessage, InferenceRequest, InferenceResponse, SelfDescription, Usage};

/// Unified interface for all provider kinds.
///
/// Object-safe, used as `Arc<dyn ProviderAgent>`. Dropping any returned
/// future aborts the in-flight HTTP request.
#[async_trait]
pub trait ProviderAgent: Send + Sync + 'static {
    /// Base endpoint this agent talks to.
    fn endpoint(&self) -> &str;

    /// Ask the provider for its models, price and region.
    async fn describe(&self) -> Result<SelfDescription, AgentError>;

    /// Lightweight reachability check.
    ///
    /// Returns the advertised models, which may be empty when the provider
    /// answers but does not list any.
    async fn health_check(&self) -> Result<Vec<String>, AgentError>;

    /// Execute one non-streaming chat completion.
    ///
    /// # Returns
    ///
    /// - `Err(AgentError::Upstream)` if the provider answered with an error status
    /// - `Err(AgentError::Network)` if the connection failed
    /// - `Err(AgentError::Timeout)` if the request exceeded its deadline
    /// - `Err(AgentError::InvalidResponse)` if the body is not a chat completion
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, AgentError>;
}

/// Map a non-success response into `AgentError::Upstream`, keeping a short
/// prefix of the body for diagnostics.
pub(crate) async fn upstream_error(response: reqwest::Response) -> AgentError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    AgentError::Upstream { status, message }
}

/// Read and parse a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AgentError> {
    let body = response.text().await.map_err(|e| {
        AgentError::InvalidResponse(format!("Failed to read {} body: {}", what, e))
    })?;
    serde_json::from_str(&body)
        .map_err(|e| AgentError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_handles_slashes() {
        assert_eq!(
            join_url("http://localhost:3001/", "/v1/models"),
            "http://localhost:3001/v1/models"
        );
        assert_eq!(join_url("https://x/api/v1", "models"), "https://x/api/v1/models");
    }
}
