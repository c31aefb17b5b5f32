//! Provider Registry module.
//!
//! Thread-safe in-memory table of known compute providers and their health.

mod error;
mod policy;
mod provider;

pub use error::*;
pub use policy::RegistryPolicy;
pub use provider::*;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Whether an upsert created a new entry or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Status before and after applying a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: ProviderStatus,
    pub current: ProviderStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// The Provider Registry stores all known compute providers.
///
/// Entries live in a sharded concurrent map, so mutations of one id are
/// serialized while readers only wait for the length of a single mutation.
/// Every read returns owned copies; nothing outside the registry can change
/// health state or counters except through the `record_*` mutators.
///
/// # Examples
///
/// ```
/// use mesh::registry::{
///     DiscoverySource, ProbeReport, ProviderDescriptor, ProviderKind, ProviderStatus, Registry,
/// };
///
/// let registry = Registry::new();
/// registry
///     .upsert(ProviderDescriptor::new(
///         "node-a",
///         "Node A",
///         "http://localhost:3001",
///         ProviderKind::local(),
///         DiscoverySource::Static,
///     ))
///     .unwrap();
///
/// registry
///     .record_probe("node-a", &ProbeReport::reachable(40, vec![]))
///     .unwrap();
/// assert_eq!(registry.get("node-a").unwrap().status, ProviderStatus::Online);
/// ```
pub struct Registry {
    providers: DashMap<String, Provider>,
    next_registration: AtomicU64,
    policy: RegistryPolicy,
}

impl Registry {
    /// Create an empty registry with the default policy.
    pub fn new() -> Self {
        Self::with_policy(RegistryPolicy::default())
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            providers: DashMap::new(),
            next_registration: AtomicU64::new(0),
            policy,
        }
    }

    pub fn policy(&self) -> &RegistryPolicy {
        &self.policy
    }

    /// Insert a provider, or merge identity and capability fields into an
    /// existing entry with the same id.
    ///
    /// Health state and counters of an existing entry are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidDescriptor` for an empty id or endpoint,
    /// or a price that is negative or not finite.
    pub fn upsert(&self, descriptor: ProviderDescriptor) -> Result<UpsertOutcome, RegistryError> {
        if descriptor.id.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor(
                "provider id must not be empty".to_string(),
            ));
        }
        if descriptor.endpoint.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor(format!(
                "provider '{}' has an empty endpoint",
                descriptor.id
            )));
        }
        if !descriptor.price_per_1k.is_finite() || descriptor.price_per_1k < 0.0 {
            return Err(RegistryError::InvalidDescriptor(format!(
                "provider '{}' has invalid price {}",
                descriptor.id, descriptor.price_per_1k
            )));
        }

        match self.providers.entry(descriptor.id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge_descriptor(descriptor);
                Ok(UpsertOutcome::Updated)
            }
            Entry::Vacant(entry) => {
                let registration = self.next_registration.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(
                    provider_id = %descriptor.id,
                    endpoint = %descriptor.endpoint,
                    source = ?descriptor.source,
                    "Registered provider"
                );
                entry.insert(Provider::from_descriptor(descriptor, registration));
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Point-in-time copy of all providers in registration order.
    pub fn list(&self) -> Vec<Provider> {
        let now = Utc::now();
        let freshness = self.policy.freshness();
        let mut providers: Vec<Provider> = self
            .providers
            .iter()
            .map(|entry| entry.value().view_at(now, freshness))
            .collect();
        providers.sort_by_key(|p| p.registration);
        providers
    }

    /// Providers currently reported `online`, in registration order.
    pub fn list_online(&self) -> Vec<Provider> {
        self.list().into_iter().filter(|p| p.is_online()).collect()
    }

    /// Get a provider by exact id.
    pub fn get(&self, id: &str) -> Result<Provider, RegistryError> {
        self.providers
            .get(id)
            .map(|entry| entry.value().view_at(Utc::now(), self.policy.freshness()))
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn online_count(&self) -> usize {
        let now = Utc::now();
        let freshness = self.policy.freshness();
        self.providers
            .iter()
            .filter(|entry| entry.value().view_at(now, freshness).is_online())
            .count()
    }

    /// Record the outcome of one dispatch attempt.
    ///
    /// Counters, rolling uptime, dispatch latency and reputation are updated
    /// under the entry's lock, so concurrent outcomes for one id never tear.
    /// Returns the updated provider.
    pub fn record_outcome(
        &self,
        id: &str,
        success: bool,
        observed_latency_ms: u32,
    ) -> Result<Provider, RegistryError> {
        let mut provider = self
            .providers
            .get_mut(id)
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))?;

        provider.total_requests += 1;
        if success {
            provider.successful_requests += 1;
            provider.last_seen = Some(Utc::now());
            provider.observe_dispatch_latency(observed_latency_ms, &self.policy);
        } else {
            provider.failed_requests += 1;
        }
        provider.observe_availability(success, &self.policy);
        provider.window.push(success, self.policy.reputation_window);
        provider.reputation = provider.window.reputation();

        Ok(provider.view_at(Utc::now(), self.policy.freshness()))
    }

    /// Apply a probe result.
    ///
    /// A reachable probe marks the provider online, smooths latency and
    /// refreshes its models. An unreachable probe demotes it to offline and
    /// leaves reputation alone.
    pub fn record_probe(&self, id: &str, report: &ProbeReport) -> Result<StatusChange, RegistryError> {
        let mut provider = self
            .providers
            .get_mut(id)
            .ok_or_else(|| RegistryError::ProviderNotFound(id.to_string()))?;

        let now = Utc::now();
        let previous = provider.view_at(now, self.policy.freshness()).status;

        provider.last_probed = Some(now);
        if report.reachable {
            provider.status = ProviderStatus::Online;
            provider.last_probe_success = Some(now);
            provider.last_seen = Some(now);
            provider.last_error = None;
            provider.observe_probe_latency(report.latency_ms, &self.policy);
            if !report.models_advertised.is_empty() {
                provider.models = report.models_advertised.clone();
            }
        } else {
            provider.status = ProviderStatus::Offline;
            provider.last_error = report.error.clone();
        }
        provider.observe_availability(report.reachable, &self.policy);

        Ok(StatusChange {
            previous,
            current: provider.status,
        })
    }

    /// Providers never probed, or whose last probe is older than `stale_after`.
    pub fn providers_due_for_probe(&self, stale_after: Duration) -> Vec<Provider> {
        let now = Utc::now();
        self.list()
            .into_iter()
            .filter(|p| match p.last_probed {
                None => true,
                Some(at) => (now - at).to_std().map(|age| age >= stale_after).unwrap_or(false),
            })
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
