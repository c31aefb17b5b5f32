//! Selection strategies and their deterministic orderings.

use crate::registry::{Provider, ProviderStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// How the router ranks providers for a request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelectionStrategy {
    /// Lowest smoothed probe latency first
    #[default]
    LatencyBased,

    /// Next provider in registration order after the last one used
    RoundRobin,

    /// Lowest advertised price first
    CostBased,

    /// Pin one provider by exact id, regardless of its health
    Explicit(String),
}

impl SelectionStrategy {
    /// Label without the pinned id, for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionStrategy::LatencyBased => "latency_based",
            SelectionStrategy::RoundRobin => "round_robin",
            SelectionStrategy::CostBased => "cost_based",
            SelectionStrategy::Explicit(_) => "explicit",
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((prefix, id)) = trimmed.split_once(':') {
            if prefix.eq_ignore_ascii_case("explicit") {
                let id = id.trim();
                if id.is_empty() {
                    return Err("explicit strategy needs a provider id".to_string());
                }
                return Ok(SelectionStrategy::Explicit(id.to_string()));
            }
        }
        match trimmed.to_lowercase().replace('-', "_").as_str() {
            "latency_based" | "latency" => Ok(SelectionStrategy::LatencyBased),
            "round_robin" => Ok(SelectionStrategy::RoundRobin),
            "cost_based" | "cost" => Ok(SelectionStrategy::CostBased),
            _ => Err(format!("Unknown selection strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionStrategy::Explicit(id) => write!(f, "explicit:{}", id),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl TryFrom<String> for SelectionStrategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SelectionStrategy> for String {
    fn from(strategy: SelectionStrategy) -> Self {
        strategy.to_string()
    }
}

/// Lower latency, then higher reputation, then smaller id.
pub fn by_latency(a: &Provider, b: &Provider) -> Ordering {
    a.latency_ms
        .cmp(&b.latency_ms)
        .then_with(|| b.reputation.cmp(&a.reputation))
        .then_with(|| a.id.cmp(&b.id))
}

/// Lower price, then higher reputation, then smaller id.
pub fn by_cost(a: &Provider, b: &Provider) -> Ordering {
    a.price_per_1k
        .total_cmp(&b.price_per_1k)
        .then_with(|| b.reputation.cmp(&a.reputation))
        .then_with(|| a.id.cmp(&b.id))
}

/// Order providers for a ranking strategy.
///
/// Round-robin and explicit orderings keep registration order here; the
/// rotation itself lives in the router.
pub fn rank(strategy: &SelectionStrategy, providers: &mut [Provider]) {
    match strategy {
        SelectionStrategy::LatencyBased => providers.sort_by(by_latency),
        SelectionStrategy::CostBased => providers.sort_by(by_cost),
        SelectionStrategy::RoundRobin | SelectionStrategy::Explicit(_) => {
            providers.sort_by_key(|p| p.registration)
        }
    }
}

/// Rotate registration-ordered providers so the first one follows `last_used`.
pub fn rotate_after(providers: &mut Vec<Provider>, last_used: Option<u64>) {
    providers.sort_by_key(|p| p.registration);
    if let Some(last) = last_used {
        let split = providers
            .iter()
            .position(|p| p.registration > last)
            .unwrap_or(providers.len());
        providers.rotate_left(split);
    }
}

/// Move the best-ranked provider with at least `min_reputation` to the front.
///
/// Alternates keep their ranked order with no reputation floor. When no
/// provider qualifies the ranking is left as is.
pub fn promote_reputable(providers: &mut [Provider], min_reputation: u8) {
    if let Some(pos) = providers.iter().position(|p| p.reputation >= min_reputation) {
        providers[..=pos].rotate_right(1);
    }
}

/// Preference among providers considered for the last-resort attempt.
pub(crate) fn status_rank(status: ProviderStatus) -> u8 {
    match status {
        ProviderStatus::Online => 0,
        ProviderStatus::Unknown => 1,
        ProviderStatus::Offline => 2,
    }
}
