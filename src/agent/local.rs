//! Agent for local compute nodes (scheduler endpoints on the LAN or loopback).

use super::types::ModelList;
use super::{
    join_url, read_json, upstream_error, AgentError, InferenceRequest, InferenceResponse,
    ProviderAgent, SelfDescription,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Talks to a local node's scheduler:
/// - Self-description via GET /v1/node/info, or GET /v1/models when the node has no info route
/// - Health check via GET /v1/models
/// - Chat completion via POST /v1/chat/completions
pub struct LocalNodeAgent {
    endpoint: String,
    client: Arc<Client>,
    probe_timeout: Duration,
    request_timeout: Duration,
}

impl LocalNodeAgent {
    pub fn new(
        endpoint: String,
        client: Arc<Client>,
        probe_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            client,
            probe_timeout,
            request_timeout,
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, AgentError> {
        self.client
            .get(join_url(&self.endpoint, path))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, self.probe_timeout.as_millis() as u64))
    }

    async fn list_models(&self) -> Result<Vec<String>, AgentError> {
        let response = self.get("/v1/models").await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        let models: ModelList = read_json(response, "model list").await?;
        Ok(models.into_ids())
    }
}

#[async_trait]
impl ProviderAgent for LocalNodeAgent {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn describe(&self) -> Result<SelfDescription, AgentError> {
        let response = self.get("/v1/node/info").await?;
        if response.status() == StatusCode::NOT_FOUND {
            let models = self.list_models().await?;
            return Ok(SelfDescription {
                models,
                ..Default::default()
            });
        }
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        read_json(response, "node info").await
    }

    async fn health_check(&self) -> Result<Vec<String>, AgentError> {
        let response = self.get("/v1/models").await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        // Reachable is what matters; a node with an odd listing still counts.
        match read_json::<ModelList>(response, "model list").await {
            Ok(models) => Ok(models.into_ids()),
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "Unparseable model list");
                Ok(Vec::new())
            }
        }
    }

    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, AgentError> {
        let response = self
            .client
            .post(join_url(&self.endpoint, "/v1/chat/completions"))
            .json(&request)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AgentError::from_reqwest(e, self.request_timeout.as_millis() as u64))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        read_json(response, "chat completion").await
    }
}
