//! Configuration for health probing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for provider health probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether probing is enabled
    pub enabled: bool,
    /// Timeout for each probe request
    pub timeout_seconds: u64,
    /// Upper bound on simultaneous outstanding probes
    pub max_concurrent_probes: usize,
    /// A provider is re-probed once its last probe is this old
    pub stale_after_seconds: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_seconds: 5,
            max_concurrent_probes: 8,
            stale_after_seconds: 30,
        }
    }
}

impl HealthCheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_seconds)
    }
}
