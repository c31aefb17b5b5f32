//! Health probing for registered providers.
//!
//! The prober checks reachability and latency of providers with a bounded
//! timeout and a bounded fan-out, then folds each result into the registry.
//! Probe failures are absorbed here: they demote the provider and are
//! logged, but never surface as request errors.

mod config;
mod error;


pub use config::*;
pub use error::*;

use crate::agent::AgentFactory;
use crate::registry::{ProbeReport, Provider, ProviderStatus, Registry};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Probes providers and applies the results to the registry.
pub struct HealthProber {
    registry: Arc<Registry>,
    factory: Arc<dyn AgentFactory>,
    config: HealthCheckConfig,
}

impl HealthProber {
    pub fn new(
        registry: Arc<Registry>,
        factory: Arc<dyn AgentFactory>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            registry,
            factory,
            config,
        }
    }

    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Probe one provider without touching the registry.
    ///
    /// Timeouts and transport errors both produce an unreachable report.
    pub async fn probe(&self, provider: &Provider) -> ProbeReport {
        let agent = self.factory.agent_for(&provider.endpoint, &provider.kind);
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.config.timeout(), agent.health_check()).await;
        let latency_ms = start.elapsed().as_millis() as u32;

        let result = match outcome {
            Ok(Ok(models)) => Ok(models),
            Ok(Err(e)) => Err(HealthCheckError::from_agent_error(
                e,
                self.config.timeout_seconds,
            )),
            Err(_) => Err(HealthCheckError::Timeout(self.config.timeout_seconds)),
        };

        match result {
            Ok(models) => {
                metrics::histogram!("mesh_probe_latency_seconds",
                    "provider" => provider.id.clone()
                )
                .record(latency_ms as f64 / 1000.0);
                ProbeReport::reachable(latency_ms, models)
            }
            Err(error) => {
                tracing::debug!(
                    provider_id = %provider.id,
                    endpoint = %provider.endpoint,
                    error = %error,
                    "Probe failed"
                );
                ProbeReport::unreachable(latency_ms, error.to_string())
            }
        }
    }

    /// Fold a probe result into the registry and log status transitions.
    pub fn apply_result(&self, provider_id: &str, report: &ProbeReport) {
        match self.registry.record_probe(provider_id, report) {
            Ok(change) if change.changed() => {
                if change.current == ProviderStatus::Offline {
                    tracing::warn!(
                        provider_id = provider_id,
                        old_status = %change.previous,
                        new_status = %change.current,
                        error = report.error.as_deref().unwrap_or(""),
                        "Provider status changed"
                    );
                } else {
                    tracing::info!(
                        provider_id = provider_id,
                        old_status = %change.previous,
                        new_status = %change.current,
                        latency_ms = report.latency_ms,
                        "Provider status changed"
                    );
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(provider_id = provider_id, error = %e, "Dropping probe result");
            }
        }
    }

    /// Probe a single provider and apply the result.
    pub async fn probe_and_apply(&self, provider: &Provider) -> ProbeReport {
        let report = self.probe(provider).await;
        self.apply_result(&provider.id, &report);
        report
    }

    /// Probe many providers concurrently, at most `max_concurrent_probes` at
    /// a time. Results are applied to the registry one at a time as they
    /// complete, so a slow provider never delays recording a fast one.
    pub async fn probe_many(&self, providers: Vec<Provider>) -> Vec<(String, ProbeReport)> {
        let limit = self.config.max_concurrent_probes.max(1);
        let mut in_flight = stream::iter(providers)
            .map(|provider| async move {
                let report = self.probe(&provider).await;
                (provider.id, report)
            })
            .buffer_unordered(limit);

        let mut results = Vec::new();
        while let Some((id, report)) = in_flight.next().await {
            self.apply_result(&id, &report);
            results.push((id, report));
        }
        results
    }

    /// Probe every provider whose last probe is older than `stale_after_seconds`.
    pub async fn probe_due(&self) -> Vec<(String, ProbeReport)> {
        if !self.config.enabled {
            return Vec::new();
        }
        let due = self
            .registry
            .providers_due_for_probe(self.config.stale_after());
        if due.is_empty() {
            return Vec::new();
        }
        let results = self.probe_many(due).await;
        tracing::debug!(
            providers_probed = results.len(),
            reachable = results.iter().filter(|(_, r)| r.reachable).count(),
            "Probe round completed"
        );
        results
    }
}
