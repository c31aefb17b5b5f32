//! # HTTP API
//!
//! Thin axum surface over the registry, discovery loop and router.
//!
//! ## Endpoints
//!
//! - `POST /v1/chat/completions` - Route a chat completion to a provider
//! - `GET /v1/providers` - List known providers (`?status=online` filters)
//! - `POST /v1/providers` - Register an endpoint and probe it out of band
//! - `GET /v1/market` - Market snapshot
//! - `GET /v1/route` - Dry-run routing decision (`?strategy=cost_based`)
//! - `GET /health` - Mesh health with provider counts
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use mesh::api::{create_router, AppState};
//! use mesh::config::MeshConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = Arc::new(AppState::from_config(MeshConfig::default())?);
//! let app = create_router(Arc::clone(&state));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8400").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors use the OpenAI envelope. When every allowed attempt failed the
//! response is a 503 that lists each attempt:
//! ```json
//! {
//!   "error": {
//!     "message": "no providers available: node-a (http://a:3001): connection refused",
//!     "type": "server_error",
//!     "code": "service_unavailable",
//!     "attempts": [{"provider_id": "node-a", "endpoint": "http://a:3001", ...}]
//!   }
//! }
//! ```

mod completions;
mod decide;
mod error;
mod health;
mod market;
mod providers;
pub mod types;

pub use completions::{ATTEMPTS_HEADER, PROVIDER_HEADER, REQUEST_ID_HEADER};
pub use error::{ApiError, ApiErrorBody};
pub use types::*;

use crate::agent::{AgentFactory, HttpAgentFactory};
use crate::config::MeshConfig;
use crate::discovery::DiscoveryService;
use crate::health::HealthProber;
use crate::metrics::MetricsCollector;
use crate::registry::Registry;
use crate::routing::{AgentDispatcher, Router as MeshRouter};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (10 MB).
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub registry: Arc<Registry>,
    pub discovery: Arc<DiscoveryService>,
    pub router: Arc<MeshRouter>,
    pub config: Arc<MeshConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Assemble state from already-built components.
    pub fn new(
        registry: Arc<Registry>,
        discovery: Arc<DiscoveryService>,
        router: Arc<MeshRouter>,
        config: Arc<MeshConfig>,
    ) -> Self {
        let start_time = Instant::now();

        // A recorder may already be installed (tests, repeated construction);
        // fall back to a detached handle then.
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&registry),
            start_time,
            prometheus_handle,
        ));

        Self {
            registry,
            discovery,
            router,
            config,
            start_time,
            metrics_collector,
        }
    }

    /// Build every component from configuration over HTTP agents and
    /// register the statically configured providers.
    ///
    /// The discovery loop is not started.
    pub fn from_config(config: MeshConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let factory: Arc<dyn AgentFactory> = Arc::new(HttpAgentFactory::new(
            config.health_check.timeout(),
            config.server.request_timeout(),
        ));
        Self::with_factory(config, factory)
    }

    /// Like [`AppState::from_config`] with a caller-supplied agent factory.
    pub fn with_factory(
        config: MeshConfig,
        factory: Arc<dyn AgentFactory>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Arc::new(Registry::with_policy(config.registry.clone()));
        let prober = Arc::new(HealthProber::new(
            Arc::clone(&registry),
            Arc::clone(&factory),
            config.health_check.clone(),
        ));
        let discovery = Arc::new(DiscoveryService::new(
            Arc::clone(&registry),
            prober,
            Arc::clone(&factory),
            config.discovery.clone(),
        ));

        let descriptors = config
            .providers
            .iter()
            .map(|p| p.to_descriptor(config.discovery.default_price_per_1k))
            .collect::<Result<Vec<_>, _>>()?;
        discovery.register_static(descriptors)?;

        let router = Arc::new(MeshRouter::new(
            Arc::clone(&registry),
            Arc::new(AgentDispatcher::new(factory)),
        ));

        Ok(Self::new(registry, discovery, router, Arc::new(config)))
    }
}

/// Create the main API router with all endpoints configured.
///
/// At most `server.max_concurrent_requests` requests are in flight; the rest
/// queue for a slot.
pub fn create_router(state: Arc<AppState>) -> Router {
    let concurrency = state.config.server.max_concurrent_requests;
    Router::new()
        .route("/v1/chat/completions", post(completions::handle))
        .route("/v1/providers", get(providers::list).post(providers::add))
        .route("/v1/market", get(market::handle))
        .route("/v1/route", get(decide::handle))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(GlobalConcurrencyLimitLayer::new(concurrency))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
