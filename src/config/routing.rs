//! Routing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::routing::{RouteOptions, SelectionStrategy};

/// Default routing options applied when a request does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub strategy: SelectionStrategy,
    pub max_retries: u32,
    pub fallback_to_any: bool,
    /// Per-dispatch deadline; a timed-out dispatch still spends one retry
    pub dispatch_timeout_seconds: u64,
    /// Reputation (0-100) the first choice must have; retries accept any
    pub min_reputation: u8,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::LatencyBased,
            max_retries: 2,
            fallback_to_any: true,
            dispatch_timeout_seconds: 60,
            min_reputation: 50,
        }
    }
}

impl RoutingConfig {
    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            strategy: self.strategy.clone(),
            max_retries: self.max_retries,
            fallback_to_any: self.fallback_to_any,
            dispatch_timeout: Duration::from_secs(self.dispatch_timeout_seconds),
            min_reputation: self.min_reputation,
        }
    }
}
