//! Scripted agents for unit tests.

use super::{
    AgentError, AgentFactory, ChatMessage, InferenceRequest, InferenceResponse, ProviderAgent,
    SelfDescription,
};
use crate::agent::types::Choice;
use crate::registry::ProviderKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a scripted provider answers.
#[derive(Clone)]
pub(crate) struct MockBehavior {
    pub health: Result<Vec<String>, AgentError>,
    pub describe: Result<SelfDescription, AgentError>,
    pub infer: Result<InferenceResponse, AgentError>,
    pub delay: Duration,
}

impl MockBehavior {
    pub fn healthy() -> Self {
        Self {
            health: Ok(vec!["llama3".to_string()]),
            describe: Ok(SelfDescription {
                models: vec!["llama3".to_string()],
                ..Default::default()
            }),
            infer: Ok(completion("ok")),
            delay: Duration::ZERO,
        }
    }

    pub fn down() -> Self {
        let refused = AgentError::Network("connection refused".to_string());
        Self {
            health: Err(refused.clone()),
            describe: Err(refused.clone()),
            infer: Err(refused),
            delay: Duration::ZERO,
        }
    }

    pub fn with_infer(mut self, result: Result<InferenceResponse, AgentError>) -> Self {
        self.infer = result;
        self
    }

    pub fn with_describe(mut self, result: Result<SelfDescription, AgentError>) -> Self {
        self.describe = result;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub(crate) fn completion(content: &str) -> InferenceResponse {
    InferenceResponse {
        id: "chatcmpl-mock".to_string(),
        object: "chat.completion".to_string(),
        created: 0,
        model: "mock".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage::assistant(content),
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

#[derive(Default)]
struct Shared {
    behaviors: Mutex<HashMap<String, MockBehavior>>,
    calls: Mutex<Vec<(&'static str, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Factory handing out agents whose answers are looked up per endpoint at
/// call time. Unknown endpoints refuse connections.
#[derive(Clone, Default)]
pub(crate) struct MockFactory {
    shared: Arc<Shared>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, endpoint: &str, behavior: MockBehavior) {
        self.shared
            .behaviors
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), behavior);
    }

    /// Endpoints called with `op` ("describe", "health", "infer"), in call order.
    pub fn calls(&self, op: &str) -> Vec<String> {
        self.shared
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == op)
            .map(|(_, endpoint)| endpoint.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }
}

impl AgentFactory for MockFactory {
    fn agent_for(&self, endpoint: &str, _kind: &ProviderKind) -> Arc<dyn ProviderAgent> {
        Arc::new(MockAgent {
            endpoint: endpoint.to_string(),
            shared: Arc::clone(&self.shared),
        })
    }
}

struct MockAgent {
    endpoint: String,
    shared: Arc<Shared>,
}

impl MockAgent {
    async fn enter(&self, op: &'static str) -> MockBehavior {
        self.shared
            .calls
            .lock()
            .unwrap()
            .push((op, self.endpoint.clone()));
        let behavior = self
            .shared
            .behaviors
            .lock()
            .unwrap()
            .get(&self.endpoint)
            .cloned()
            .unwrap_or_else(MockBehavior::down);

        let now = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !behavior.delay.is_zero() {
            tokio::time::sleep(behavior.delay).await;
        }
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        behavior
    }
}

#[async_trait]
impl ProviderAgent for MockAgent {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn describe(&self) -> Result<SelfDescription, AgentError> {
        self.enter("describe").await.describe
    }

    async fn health_check(&self) -> Result<Vec<String>, AgentError> {
        self.enter("health").await.health
    }

    async fn infer(&self, _request: InferenceRequest) -> Result<InferenceResponse, AgentError> {
        self.enter("infer").await.infer
    }
}
