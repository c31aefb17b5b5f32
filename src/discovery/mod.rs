//! Seed-polling provider discovery
//!
//! Every cycle the service asks each known endpoint to describe itself,
//! upserts what it learns into the registry, then lets the health prober
//! refresh stale entries. A fresh market snapshot is published to
//! subscribers at the end of every cycle.

pub mod endpoint;
mod error;


pub use error::DiscoveryError;

pub use crate::config::DiscoveryConfig;

use crate::agent::{AgentFactory, SelfDescription};
use crate::health::HealthProber;
use crate::market::{self, MarketSnapshot};
use crate::registry::{
    DiscoverySource, Provider, ProviderDescriptor, ProviderKind, Registry, UpsertOutcome,
};
use endpoint::{display_name, infer_region, normalize_endpoint, provider_id_for};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Buffered snapshots per subscriber before it starts lagging.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Counts from one discovery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Endpoints that answered with a self-description
    pub described: usize,
    /// Endpoints that could not be described
    pub unreachable: usize,
    /// Probes run after the describe phase
    pub probed: usize,
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Background discovery loop over a set of seed endpoints.
pub struct DiscoveryService {
    registry: Arc<Registry>,
    prober: Arc<HealthProber>,
    factory: Arc<dyn AgentFactory>,
    config: DiscoveryConfig,
    seeds: RwLock<Vec<String>>,
    snapshots: broadcast::Sender<MarketSnapshot>,
    running: Mutex<Option<RunningLoop>>,
}

impl DiscoveryService {
    /// Create the service. Seeds that are not valid http(s) URLs are
    /// skipped with a warning.
    pub fn new(
        registry: Arc<Registry>,
        prober: Arc<HealthProber>,
        factory: Arc<dyn AgentFactory>,
        config: DiscoveryConfig,
    ) -> Self {
        let mut seeds: Vec<String> = Vec::new();
        for seed in &config.seeds {
            match normalize_endpoint(seed) {
                Ok(endpoint) if !seeds.contains(&endpoint) => seeds.push(endpoint),
                Ok(_) => {}
                Err(e) => tracing::warn!(seed = %seed, error = %e, "Ignoring invalid seed"),
            }
        }
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        Self {
            registry,
            prober,
            factory,
            config,
            seeds: RwLock::new(seeds),
            snapshots,
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Current seed list, configured seeds first.
    pub async fn seeds(&self) -> Vec<String> {
        self.seeds.read().await.clone()
    }

    /// Receive a market snapshot after every completed cycle.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketSnapshot> {
        self.snapshots.subscribe()
    }

    /// Upsert statically configured providers.
    pub fn register_static(
        &self,
        descriptors: Vec<ProviderDescriptor>,
    ) -> Result<usize, DiscoveryError> {
        let count = descriptors.len();
        for descriptor in descriptors {
            tracing::info!(
                provider_id = %descriptor.id,
                endpoint = %descriptor.endpoint,
                kind = descriptor.kind.label(),
                "Registering static provider"
            );
            self.registry.upsert(descriptor)?;
        }
        Ok(count)
    }

    /// Launch the recurring cycle. The first cycle runs immediately.
    ///
    /// Returns `false` when discovery is disabled or a loop is already running.
    pub fn start(self: &Arc<Self>, interval: Duration) -> bool {
        if !self.config.enabled {
            tracing::info!("Discovery disabled");
            return false;
        }

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        let service = Arc::clone(self);
        let token = cancel.clone();
        let interval = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(interval_ms = interval.as_millis() as u64, "Discovery loop started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Discovery loop shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = service.run_cycle() => {}
                        }
                    }
                }
            }
        });

        *running = Some(RunningLoop { cancel, handle });
        true
    }

    /// Halt the background loop and wait for it to finish.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(RunningLoop { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Discovery task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    /// Register an endpoint right away and refresh it out of band.
    ///
    /// The returned entry is provisional (`unknown`) until the spawned
    /// describe and probe complete.
    pub async fn add_provider(self: &Arc<Self>, endpoint: &str) -> Result<Provider, DiscoveryError> {
        let endpoint = normalize_endpoint(endpoint).map_err(DiscoveryError::InvalidEndpoint)?;

        {
            let mut seeds = self.seeds.write().await;
            if !seeds.contains(&endpoint) {
                seeds.push(endpoint.clone());
            }
        }

        let id = provider_id_for(&endpoint);
        if !self.registry.contains(&id) {
            self.registry
                .upsert(self.descriptor_for(&endpoint, None, DiscoverySource::Manual))?;
            tracing::info!(provider_id = %id, endpoint = %endpoint, "Provider added manually");
        }

        let service = Arc::clone(self);
        let target = endpoint.clone();
        tokio::spawn(async move {
            if let Err(e) = service.refresh_endpoint(&target).await {
                tracing::warn!(endpoint = %target, error = %e, "Out-of-band refresh failed");
            }
        });

        Ok(self.registry.get(&id)?)
    }

    /// Describe and probe one endpoint now, returning its updated entry.
    pub async fn refresh_endpoint(&self, endpoint: &str) -> Result<Provider, DiscoveryError> {
        let endpoint = normalize_endpoint(endpoint).map_err(DiscoveryError::InvalidEndpoint)?;
        let description = self.describe(&endpoint).await;
        self.apply_description(&endpoint, description, DiscoverySource::Manual)?;

        let provider = self.registry.get(&provider_id_for(&endpoint))?;
        self.prober.probe_and_apply(&provider).await;
        Ok(self.registry.get(&provider.id)?)
    }

    /// Run one discovery cycle.
    ///
    /// Failures are isolated per endpoint: an unreachable seed still gets a
    /// registry entry and never stops the others from being described or
    /// probed.
    pub async fn run_cycle(&self) -> CycleSummary {
        let targets = self.targets().await;
        let limit = self.prober.config().max_concurrent_probes.max(1);

        let mut described = stream::iter(targets)
            .map(|endpoint| async move {
                let description = self.describe(&endpoint).await;
                (endpoint, description)
            })
            .buffer_unordered(limit);

        let mut summary = CycleSummary::default();
        while let Some((endpoint, description)) = described.next().await {
            if description.is_some() {
                summary.described += 1;
            } else {
                summary.unreachable += 1;
            }
            if let Err(e) = self.apply_description(&endpoint, description, DiscoverySource::Seed) {
                tracing::warn!(endpoint = %endpoint, error = %e, "Skipping discovered endpoint");
            }
        }
        drop(described);

        summary.probed = self.prober.probe_due().await.len();

        let snapshot = market::snapshot(&self.registry);
        crate::metrics::record_provider_gauges(
            snapshot.summary.total_providers,
            snapshot.summary.online_providers,
        );
        tracing::debug!(
            described = summary.described,
            unreachable = summary.unreachable,
            probed = summary.probed,
            online = snapshot.summary.online_providers,
            "Discovery cycle completed"
        );
        // No receivers is fine
        let _ = self.snapshots.send(snapshot);

        summary
    }

    /// Seeds plus every endpoint that entered the registry through discovery.
    async fn targets(&self) -> Vec<String> {
        let mut targets = self.seeds.read().await.clone();
        for provider in self.registry.list() {
            if provider.source != DiscoverySource::Static && !targets.contains(&provider.endpoint) {
                targets.push(provider.endpoint);
            }
        }
        targets
    }

    async fn describe(&self, endpoint: &str) -> Option<SelfDescription> {
        let agent = self.factory.agent_for(endpoint, &ProviderKind::local());
        match tokio::time::timeout(self.prober.config().timeout(), agent.describe()).await {
            Ok(Ok(description)) => Some(description),
            Ok(Err(e)) => {
                tracing::debug!(endpoint = %endpoint, error = %e, "Self-description failed");
                None
            }
            Err(_) => {
                tracing::debug!(endpoint = %endpoint, "Self-description timed out");
                None
            }
        }
    }

    /// Upsert what an endpoint said about itself.
    ///
    /// Without a description a provisional entry is created for a new
    /// endpoint, and an existing entry is left as it is.
    fn apply_description(
        &self,
        endpoint: &str,
        description: Option<SelfDescription>,
        source: DiscoverySource,
    ) -> Result<(), DiscoveryError> {
        let id = provider_id_for(endpoint);
        if description.is_none() && self.registry.contains(&id) {
            return Ok(());
        }

        let descriptor = self.descriptor_for(endpoint, description, source);
        if self.registry.upsert(descriptor)? == UpsertOutcome::Inserted {
            tracing::info!(provider_id = %id, endpoint = %endpoint, "Discovered provider");
        }
        Ok(())
    }

    fn descriptor_for(
        &self,
        endpoint: &str,
        description: Option<SelfDescription>,
        source: DiscoverySource,
    ) -> ProviderDescriptor {
        let description = description.unwrap_or_default();
        let price = match description.price_per_1k {
            Some(price) if price.is_finite() && price >= 0.0 => price,
            Some(price) => {
                tracing::warn!(endpoint = %endpoint, price, "Ignoring invalid advertised price");
                self.config.default_price_per_1k
            }
            None => self.config.default_price_per_1k,
        };

        ProviderDescriptor::new(
            provider_id_for(endpoint),
            description.name.unwrap_or_else(|| display_name(endpoint)),
            endpoint,
            ProviderKind::LocalNode {
                gpu: description.gpu,
            },
            source,
        )
        .with_models(description.models)
        .with_price(price)
        .with_region(description.region.unwrap_or_else(|| infer_region(endpoint)))
    }
}
