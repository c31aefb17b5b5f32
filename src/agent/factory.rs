//! Agent factory: builds the right `ProviderAgent` for a provider kind.

use super::{CloudAgent, LocalNodeAgent, ProviderAgent};
use crate::registry::ProviderKind;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Source of agents for discovery, probing and dispatch.
///
/// The HTTP implementation is used in production; tests plug in factories
/// that return scripted agents.
pub trait AgentFactory: Send + Sync + 'static {
    fn agent_for(&self, endpoint: &str, kind: &ProviderKind) -> Arc<dyn ProviderAgent>;
}

/// Builds HTTP agents over one shared connection pool.
///
/// # Examples
///
/// ```
/// use mesh::agent::{AgentFactory, HttpAgentFactory};
/// use mesh::registry::ProviderKind;
/// use std::time::Duration;
///
/// let factory = HttpAgentFactory::new(Duration::from_secs(5), Duration::from_secs(60));
/// let agent = factory.agent_for("http://localhost:3001", &ProviderKind::local());
/// assert_eq!(agent.endpoint(), "http://localhost:3001");
/// ```
pub struct HttpAgentFactory {
    client: Arc<Client>,
    probe_timeout: Duration,
    request_timeout: Duration,
}

impl HttpAgentFactory {
    pub fn new(probe_timeout: Duration, request_timeout: Duration) -> Self {
        Self::with_client(Arc::new(Client::new()), probe_timeout, request_timeout)
    }

    pub fn with_client(client: Arc<Client>, probe_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            client,
            probe_timeout,
            request_timeout,
        }
    }
}

impl AgentFactory for HttpAgentFactory {
    fn agent_for(&self, endpoint: &str, kind: &ProviderKind) -> Arc<dyn ProviderAgent> {
        match kind {
            ProviderKind::LocalNode { .. } => Arc::new(LocalNodeAgent::new(
                endpoint.to_string(),
                Arc::clone(&self.client),
                self.probe_timeout,
                self.request_timeout,
            )),
            ProviderKind::CloudProvider {
                api_model,
                api_key_env,
            } => Arc::new(CloudAgent::new(
                endpoint.to_string(),
                api_model.clone(),
                api_key_env.clone(),
                Arc::clone(&self.client),
                self.probe_timeout,
                self.request_timeout,
            )),
        }
    }
}
