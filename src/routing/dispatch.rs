//! The opaque "make the inference call" boundary.

use crate::agent::{AgentFactory, InferenceRequest, InferenceResponse};
use crate::registry::Provider;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of one dispatch, as the router needs to see it.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    Success(InferenceResponse),
    /// This provider failed; another one may succeed
    Retryable(String),
    /// The request itself is bad; stop trying
    Terminal(String),
}

/// Performs a single inference call against one provider.
///
/// Payment or authorization negotiation wraps an implementation of this
/// trait; the router only interprets the three result kinds.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch(&self, provider: &Provider, request: InferenceRequest) -> DispatchResult;
}

/// Dispatches through the provider's agent.
pub struct AgentDispatcher {
    factory: Arc<dyn AgentFactory>,
}

impl AgentDispatcher {
    pub fn new(factory: Arc<dyn AgentFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Dispatcher for AgentDispatcher {
    async fn dispatch(&self, provider: &Provider, request: InferenceRequest) -> DispatchResult {
        let agent = self.factory.agent_for(&provider.endpoint, &provider.kind);
        match agent.infer(request).await {
            Ok(response) => DispatchResult::Success(response),
            Err(e) if e.is_retryable() => DispatchResult::Retryable(e.to_string()),
            Err(e) => DispatchResult::Terminal(e.to_string()),
        }
    }
}
