//! Agent for OpenAI-compatible cloud inference APIs.

use super::types::ModelList;
use super::{
    join_url, read_json, upstream_error, AgentError, InferenceRequest, InferenceResponse,
    ProviderAgent, SelfDescription,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Cloud fallback provider:
/// - Health check and model listing via GET {base}/models
/// - Chat completion via POST {base}/chat/completions with Bearer token
///
/// The API key is read from the configured environment variable at call
/// time, so rotating the key does not require re-registering the provider.
pub struct CloudAgent {
    base_url: String,
    api_model: String,
    api_key_env: Option<String>,
    client: Arc<Client>,
    probe_timeout: Duration,
    request_timeout: Duration,
}

impl CloudAgent {
    pub fn new(
        base_url: String,
        api_model: String,
        api_key_env: Option<String>,
        client: Arc<Client>,
        probe_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            api_model,
            api_key_env,
            client,
            probe_timeout,
            request_timeout,
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, AgentError> {
        match &self.api_key_env {
            None => Ok(builder),
            Some(var) => {
                let key = std::env::var(var).map_err(|e| {
                    AgentError::Configuration(format!(
                        "Failed to read API key from env var '{}': {}",
                        var, e
                    ))
                })?;
                Ok(builder.bearer_auth(key))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, AgentError> {
        let builder = self
            .client
            .get(join_url(&self.base_url, "models"))
            .timeout(self.probe_timeout);
        let response = self
            .authorize(builder)?
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, self.probe_timeout.as_millis() as u64))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        let models: ModelList = read_json(response, "model list").await?;
        Ok(models.into_ids())
    }
}

#[async_trait]
impl ProviderAgent for CloudAgent {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn describe(&self) -> Result<SelfDescription, AgentError> {
        let mut models = self.list_models().await?;
        if !models.contains(&self.api_model) {
            models.insert(0, self.api_model.clone());
        }
        Ok(SelfDescription {
            models,
            ..Default::default()
        })
    }

    async fn health_check(&self) -> Result<Vec<String>, AgentError> {
        self.list_models().await
    }

    async fn infer(&self, mut request: InferenceRequest) -> Result<InferenceResponse, AgentError> {
        if request.model.is_none() {
            request.model = Some(self.api_model.clone());
        }

        let builder = self
            .client
            .post(join_url(&self.base_url, "chat/completions"))
            .json(&request)
            .timeout(self.request_timeout);
        let response = self
            .authorize(builder)?
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, self.request_timeout.as_millis() as u64))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        read_json(response, "chat completion").await
    }
}
