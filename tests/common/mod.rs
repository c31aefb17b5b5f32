//! Shared test utilities for mesh integration tests.
//!
//! Provides wiremock-backed scheduler nodes and an app builder so each test
//! file does not repeat the same plumbing.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use mesh::api::{create_router, AppState};
use mesh::config::MeshConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Mock Scheduler Nodes
// =============================================================================

/// Chat completion body as a node returns it.
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "llama3",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
    })
}

/// Mount `/v1/node/info` and `/v1/models` on a node.
pub async fn mount_node_info(server: &MockServer, name: &str, price: f64, models: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/v1/node/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "models": models,
            "price_per_1k": price,
            "region": "EU",
        })))
        .mount(server)
        .await;
    mount_models(server, models).await;
}

/// Mount the model listing used for health probes.
pub async fn mount_models(server: &MockServer, models: &[&str]) {
    let data: Vec<Value> = models.iter().map(|m| json!({"id": m})).collect();
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": data})))
        .mount(server)
        .await;
}

/// Mount a successful chat completion answering `content`.
pub async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

/// Mount a chat completion that fails with `status`.
pub async fn mount_completion_error(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string("node error"))
        .mount(server)
        .await;
}

/// A fully working node: describes itself, answers probes and completions.
pub async fn healthy_node(name: &str, price: f64, content: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_node_info(&server, name, price, &["llama3"]).await;
    mount_completion(&server, content).await;
    server
}

/// A node that is reachable for discovery and probes but fails every completion.
pub async fn failing_node(name: &str, price: f64, status: u16) -> MockServer {
    let server = MockServer::start().await;
    mount_node_info(&server, name, price, &["llama3"]).await;
    mount_completion_error(&server, status).await;
    server
}

/// An endpoint nothing listens on.
pub fn dead_endpoint() -> String {
    "http://127.0.0.1:1".to_string()
}

// =============================================================================
// Config and App Builders
// =============================================================================

/// Config with the given seeds, fast timeouts and no static providers.
pub fn config_with_seeds(seeds: Vec<String>) -> MeshConfig {
    let mut config = MeshConfig::default();
    config.discovery.seeds = seeds;
    config.health_check.timeout_seconds = 2;
    config.routing.dispatch_timeout_seconds = 5;
    config
}

/// Build state over real HTTP agents and run one discovery cycle.
pub async fn discovered_state(config: MeshConfig) -> Arc<AppState> {
    let state = Arc::new(AppState::from_config(config).unwrap());
    state.discovery.run_cycle().await;
    state
}

/// Send one request through the router.
pub async fn send(state: &Arc<AppState>, request: Request<Body>) -> Response<Body> {
    let mut app = create_router(Arc::clone(state));
    app.call(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// JSON POST request.
pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Plain GET request.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Minimal chat completion request body.
pub fn chat_body(prompt: &str) -> Value {
    json!({
        "messages": [{"role": "user", "content": prompt}]
    })
}
