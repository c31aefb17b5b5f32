//! # Metrics Collection Module
//!
//! Prometheus export for routing and health signals, served at `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `mesh_routes_total{strategy, status}` - Routed requests by final status
//! - `mesh_route_attempts_total{provider, outcome}` - Individual dispatch attempts
//!
//! **Histograms:**
//! - `mesh_dispatch_duration_seconds{provider}` - Successful dispatch duration
//! - `mesh_probe_latency_seconds{provider}` - Successful probe latency
//!
//! **Gauges:**
//! - `mesh_providers_total` - Registered providers
//! - `mesh_providers_online` - Providers currently online

pub mod handler;

use crate::registry::Registry;
use std::sync::Arc;
use std::time::Instant;

/// Central coordinator for gauge computation and rendering.
pub struct MetricsCollector {
    registry: Arc<Registry>,
    start_time: Instant,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        registry: Arc<Registry>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            registry,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh provider gauges from the registry.
    pub fn update_provider_gauges(&self) {
        record_provider_gauges(self.registry.provider_count(), self.registry.online_count());
    }

    /// Seconds since the server started.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Set the provider count gauges.
pub fn record_provider_gauges(total: usize, online: usize) {
    metrics::gauge!("mesh_providers_total").set(total as f64);
    metrics::gauge!("mesh_providers_online").set(online as f64);
}

/// Install the Prometheus recorder with latency buckets in seconds.
///
/// Probes are expected well under a second; dispatches cover full inference
/// calls and get a wider range.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let probe_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
    let dispatch_buckets = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("mesh_probe_latency_seconds".to_string()),
            probe_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("mesh_dispatch_duration_seconds".to_string()),
            dispatch_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}
