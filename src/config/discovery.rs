//! Discovery configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seed-polling discovery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    /// Seconds between discovery cycles
    pub interval_seconds: u64,
    /// Scheduler endpoints asked to describe themselves every cycle
    pub seeds: Vec<String>,
    /// Price assumed for nodes that do not advertise one
    pub default_price_per_1k: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            seeds: vec!["http://localhost:3001".to_string()],
            default_price_per_1k: 0.001,
        }
    }
}

impl DiscoveryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}
