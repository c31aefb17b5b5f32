//! Request and response bodies for the HTTP surface.

use crate::agent::{ChatMessage, InferenceRequest};
use crate::registry::{Provider, ProviderStatus};
use crate::routing::{RouteOptions, SelectionStrategy};
use serde::{Deserialize, Serialize};

/// Chat completion request (OpenAI shape plus routing overrides).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatCompletionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub stream: bool,
    /// Pin the request to one provider id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingOverrides>,
}

/// Per-request overrides of the configured routing options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RoutingOverrides {
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub fallback_to_any: Option<bool>,
    #[serde(default)]
    pub min_reputation: Option<u8>,
}

impl RoutingOverrides {
    pub fn apply(&self, mut options: RouteOptions) -> RouteOptions {
        if let Some(strategy) = &self.strategy {
            options.strategy = strategy.clone();
        }
        if let Some(max_retries) = self.max_retries {
            options.max_retries = max_retries;
        }
        if let Some(fallback) = self.fallback_to_any {
            options.fallback_to_any = fallback;
        }
        if let Some(floor) = self.min_reputation {
            options.min_reputation = floor;
        }
        options
    }
}

impl ChatCompletionRequest {
    /// The inference payload sent to providers.
    pub fn to_inference(&self) -> InferenceRequest {
        InferenceRequest {
            model: self.model.clone(),
            messages: self.messages.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Routing options for this request.
    ///
    /// A pinned provider (header first, then body) overrides any strategy.
    pub fn route_options(&self, base: RouteOptions, header_provider: Option<&str>) -> RouteOptions {
        let mut options = match &self.routing {
            Some(overrides) => overrides.apply(base),
            None => base,
        };
        if let Some(id) = header_provider.or(self.provider.as_deref()) {
            options.strategy = SelectionStrategy::Explicit(id.to_string());
        }
        options
    }
}

/// `GET /v1/providers` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersQuery {
    #[serde(default)]
    pub status: Option<ProviderStatus>,
}

/// `GET /v1/providers` response.
#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub object: String,
    pub data: Vec<Provider>,
    pub total: usize,
    pub online: usize,
}

impl ProvidersResponse {
    pub fn new(data: Vec<Provider>, total: usize, online: usize) -> Self {
        Self {
            object: "list".to_string(),
            data,
            total,
            online,
        }
    }
}

/// `GET /v1/route` query: which provider would serve a request right now.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecideQuery {
    #[serde(default)]
    pub strategy: Option<SelectionStrategy>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub min_reputation: Option<u8>,
}

impl DecideQuery {
    pub fn route_options(&self, base: RouteOptions) -> RouteOptions {
        let overrides = RoutingOverrides {
            strategy: self.strategy.clone(),
            max_retries: self.max_retries,
            fallback_to_any: None,
            min_reputation: self.min_reputation,
        };
        let mut options = overrides.apply(base);
        if let Some(id) = &self.provider {
            options.strategy = SelectionStrategy::Explicit(id.clone());
        }
        options
    }
}

/// `POST /v1/providers` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddProviderRequest {
    pub endpoint: String,
}
