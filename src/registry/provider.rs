//! Provider data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::policy::{ema, RegistryPolicy};

/// Health status of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Online,
    Offline,
    Unknown,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderStatus::Online => "online",
            ProviderStatus::Offline => "offline",
            ProviderStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ProviderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "online" => Ok(ProviderStatus::Online),
            "offline" => Ok(ProviderStatus::Offline),
            "unknown" => Ok(ProviderStatus::Unknown),
            other => Err(format!("unknown provider status: {}", other)),
        }
    }
}

/// How a provider entered the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    /// Listed in the configuration file
    Static,
    /// Found by polling a seed endpoint
    Seed,
    /// Registered at runtime through `add_provider`
    Manual,
}

/// Capability payload that differs between local nodes and cloud providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderKind {
    LocalNode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gpu: Option<String>,
    },
    CloudProvider {
        api_model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key_env: Option<String>,
    },
}

impl ProviderKind {
    pub fn local() -> Self {
        ProviderKind::LocalNode { gpu: None }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::LocalNode { .. } => "local",
            ProviderKind::CloudProvider { .. } => "cloud",
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, ProviderKind::CloudProvider { .. })
    }
}

/// Identity and capability fields accepted by [`Registry::upsert`](super::Registry::upsert).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub region: String,
    pub kind: ProviderKind,
    /// Advertised model identifiers; an empty list means "not advertised yet"
    #[serde(default)]
    pub models: Vec<String>,
    pub price_per_1k: f64,
    pub source: DiscoverySource,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ProviderDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
        kind: ProviderKind,
        source: DiscoverySource,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
            region: "Unknown".to_string(),
            kind,
            models: Vec::new(),
            price_per_1k: 0.0,
            source,
            metadata: HashMap::new(),
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn with_price(mut self, price_per_1k: f64) -> Self {
        self.price_per_1k = price_per_1k;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Result of a single reachability probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub reachable: bool,
    pub latency_ms: u32,
    pub models_advertised: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    pub fn reachable(latency_ms: u32, models_advertised: Vec<String>) -> Self {
        Self {
            reachable: true,
            latency_ms,
            models_advertised,
            error: None,
        }
    }

    pub fn unreachable(latency_ms: u32, error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            latency_ms,
            models_advertised: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Bounded trailing window of dispatch outcomes.
#[derive(Debug, Clone, Default)]
pub(crate) struct OutcomeWindow {
    outcomes: VecDeque<bool>,
}

impl OutcomeWindow {
    pub(crate) fn push(&mut self, success: bool, capacity: usize) {
        self.outcomes.push_back(success);
        while self.outcomes.len() > capacity.max(1) {
            self.outcomes.pop_front();
        }
    }

    pub(crate) fn successes(&self) -> u64 {
        self.outcomes.iter().filter(|ok| **ok).count() as u64
    }

    pub(crate) fn failures(&self) -> u64 {
        self.outcomes.iter().filter(|ok| !**ok).count() as u64
    }

    /// Reputation in [0, 100]. An empty window means "no evidence against".
    pub(crate) fn reputation(&self) -> u8 {
        let successes = self.successes();
        let total = successes + self.failures();
        if total == 0 {
            return 100;
        }
        let score = (100.0 * successes as f64 / total as f64).round();
        score.clamp(0.0, 100.0) as u8
    }
}

/// A registered compute provider.
///
/// Instances handed out by the registry are point-in-time copies. Health
/// fields and counters only change through registry mutators.
#[derive(Debug, Clone, Serialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub region: String,
    pub kind: ProviderKind,
    pub models: Vec<String>,
    pub price_per_1k: f64,
    pub status: ProviderStatus,
    /// Smoothed probe latency
    pub latency_ms: u32,
    /// Smoothed dispatch latency as observed by the router
    pub dispatch_latency_ms: u32,
    /// Rolling availability percentage
    pub uptime: f64,
    pub reputation: u8,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_probed: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub source: DiscoverySource,
    pub metadata: HashMap<String, String>,
    /// Monotonic registration order
    pub registration: u64,
    #[serde(skip)]
    pub(crate) window: OutcomeWindow,
    #[serde(skip)]
    pub(crate) latency_samples: u64,
    #[serde(skip)]
    pub(crate) dispatch_samples: u64,
    #[serde(skip)]
    pub(crate) availability_samples: u64,
    #[serde(skip)]
    pub(crate) last_probe_success: Option<DateTime<Utc>>,
}

impl Provider {
    pub(crate) fn from_descriptor(descriptor: ProviderDescriptor, registration: u64) -> Self {
        Self {
            id: descriptor.id,
            name: descriptor.name,
            endpoint: descriptor.endpoint,
            region: descriptor.region,
            kind: descriptor.kind,
            models: descriptor.models,
            price_per_1k: descriptor.price_per_1k,
            status: ProviderStatus::Unknown,
            latency_ms: 0,
            dispatch_latency_ms: 0,
            uptime: 0.0,
            reputation: 100,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            first_seen: Utc::now(),
            last_seen: None,
            last_probed: None,
            last_error: None,
            source: descriptor.source,
            metadata: descriptor.metadata,
            registration,
            window: OutcomeWindow::default(),
            latency_samples: 0,
            dispatch_samples: 0,
            availability_samples: 0,
            last_probe_success: None,
        }
    }

    /// Overwrite identity and capability fields from a fresh descriptor.
    ///
    /// The original discovery source is kept. Models are only replaced when
    /// the descriptor advertises some.
    pub(crate) fn merge_descriptor(&mut self, descriptor: ProviderDescriptor) {
        self.name = descriptor.name;
        self.endpoint = descriptor.endpoint;
        self.region = descriptor.region;
        self.kind = descriptor.kind;
        self.price_per_1k = descriptor.price_per_1k;
        if !descriptor.models.is_empty() {
            self.models = descriptor.models;
        }
        self.metadata.extend(descriptor.metadata);
    }

    pub fn is_online(&self) -> bool {
        self.status == ProviderStatus::Online
    }

    /// Successful dispatches inside the trailing reputation window.
    pub fn recent_successes(&self) -> u64 {
        self.window.successes()
    }

    /// Lifetime success ratio, `None` before any request was routed here.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_requests == 0 {
            None
        } else {
            Some(self.successful_requests as f64 / self.total_requests as f64)
        }
    }

    pub(crate) fn observe_availability(&mut self, available: bool, policy: &RegistryPolicy) {
        let sample = if available { 100.0 } else { 0.0 };
        self.uptime = if self.availability_samples == 0 {
            sample
        } else {
            ema(self.uptime, sample, policy.uptime_smoothing)
        };
        self.availability_samples += 1;
    }

    pub(crate) fn observe_probe_latency(&mut self, latency_ms: u32, policy: &RegistryPolicy) {
        self.latency_ms = if self.latency_samples == 0 {
            latency_ms
        } else {
            ema(
                self.latency_ms as f64,
                latency_ms as f64,
                policy.latency_smoothing,
            )
            .round() as u32
        };
        self.latency_samples += 1;
    }

    pub(crate) fn observe_dispatch_latency(&mut self, latency_ms: u32, policy: &RegistryPolicy) {
        self.dispatch_latency_ms = if self.dispatch_samples == 0 {
            latency_ms
        } else {
            ema(
                self.dispatch_latency_ms as f64,
                latency_ms as f64,
                policy.latency_smoothing,
            )
            .round() as u32
        };
        self.dispatch_samples += 1;
    }

    /// Copy with the freshness window applied to `status`.
    pub(crate) fn view_at(&self, now: DateTime<Utc>, freshness: Duration) -> Provider {
        let mut view = self.clone();
        if view.status == ProviderStatus::Online && !self.probe_is_fresh(now, freshness) {
            view.status = ProviderStatus::Unknown;
        }
        view
    }

    fn probe_is_fresh(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        match self.last_probe_success {
            Some(at) => match (now - at).to_std() {
                Ok(age) => age <= freshness,
                // Probe timestamp slightly in the future of `now`
                Err(_) => true,
            },
            None => false,
        }
    }
}
