//! Market snapshot aggregation.
//!
//! A snapshot is a read-only projection of the registry at one instant. The
//! summary only ever looks at online providers so that offline pricing is
//! never presented as currently available.

use crate::registry::{Provider, Registry};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of every known provider plus a summary.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub providers: Vec<Provider>,
    pub timestamp: DateTime<Utc>,
    pub summary: MarketSummary,
}

/// Aggregates over the online subset of providers.
///
/// Every average and extreme is `0` when no provider is online.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub total_providers: usize,
    pub online_providers: usize,
    pub average_latency_ms: f64,
    pub lowest_latency_ms: u32,
    pub highest_latency_ms: u32,
    pub average_price: f64,
    pub lowest_price: f64,
    pub highest_price: f64,
    /// Successful dispatches inside each online provider's reputation window
    pub total_capacity: u64,
}

impl MarketSummary {
    pub fn from_providers(providers: &[Provider]) -> Self {
        let online: Vec<&Provider> = providers.iter().filter(|p| p.is_online()).collect();

        if online.is_empty() {
            return Self {
                total_providers: providers.len(),
                online_providers: 0,
                average_latency_ms: 0.0,
                lowest_latency_ms: 0,
                highest_latency_ms: 0,
                average_price: 0.0,
                lowest_price: 0.0,
                highest_price: 0.0,
                total_capacity: 0,
            };
        }

        let count = online.len() as f64;
        let prices = online.iter().map(|p| p.price_per_1k);
        let latencies = online.iter().map(|p| p.latency_ms);

        Self {
            total_providers: providers.len(),
            online_providers: online.len(),
            average_latency_ms: latencies.clone().map(f64::from).sum::<f64>() / count,
            lowest_latency_ms: latencies.clone().min().unwrap_or(0),
            highest_latency_ms: latencies.max().unwrap_or(0),
            average_price: prices.clone().sum::<f64>() / count,
            lowest_price: prices.clone().fold(f64::INFINITY, f64::min),
            highest_price: prices.fold(f64::NEG_INFINITY, f64::max),
            total_capacity: online.iter().map(|p| p.recent_successes()).sum(),
        }
    }
}

impl MarketSnapshot {
    /// Build a snapshot from an already-taken provider list.
    pub fn from_providers(providers: Vec<Provider>, timestamp: DateTime<Utc>) -> Self {
        let summary = MarketSummary::from_providers(&providers);
        Self {
            providers,
            timestamp,
            summary,
        }
    }
}

/// Take a fresh snapshot of the registry.
pub fn snapshot(registry: &Registry) -> MarketSnapshot {
    MarketSnapshot::from_providers(registry.list(), Utc::now())
}
