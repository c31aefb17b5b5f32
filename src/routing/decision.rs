//! Per-request routing values: options, the decision, and attempt records.

use crate::agent::InferenceResponse;
use serde::Serialize;
use std::time::Duration;

use super::SelectionStrategy;

/// Caller-supplied routing options for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    pub strategy: SelectionStrategy,
    /// Dispatch attempts allowed after the first one
    pub max_retries: u32,
    /// Once ranked candidates are exhausted, make one last call to any
    /// untried provider, whatever its status
    pub fallback_to_any: bool,
    pub dispatch_timeout: Duration,
    /// Reputation floor for the primary choice; alternates ignore it
    pub min_reputation: u8,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::LatencyBased,
            max_retries: 2,
            fallback_to_any: true,
            dispatch_timeout: Duration::from_secs(60),
            min_reputation: 50,
        }
    }
}

impl RouteOptions {
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Hard ceiling on dispatches for one request.
    pub fn attempt_budget(&self) -> usize {
        self.max_retries as usize + 1
    }
}

/// The chosen provider and the ordered alternates behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub provider_id: String,
    pub strategy: SelectionStrategy,
    pub fallbacks: Vec<String>,
}

/// What happened on one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    /// Retryable failure; the next candidate is tried
    Failed(String),
    /// Terminal failure; no other provider would do better
    Rejected(String),
    /// Dispatch exceeded its deadline (milliseconds)
    TimedOut(u64),
}

impl AttemptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failed(_) => "failed",
            AttemptOutcome::Rejected(_) => "rejected",
            AttemptOutcome::TimedOut(_) => "timeout",
        }
    }

    pub fn reason(&self) -> String {
        match self {
            AttemptOutcome::Success => "ok".to_string(),
            AttemptOutcome::Failed(reason) | AttemptOutcome::Rejected(reason) => reason.clone(),
            AttemptOutcome::TimedOut(ms) => format!("timed out after {}ms", ms),
        }
    }
}

/// One dispatch attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub provider_id: String,
    pub endpoint: String,
    pub latency_ms: u32,
    pub outcome: AttemptOutcome,
    /// True for the fallback-to-any attempt
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub last_resort: bool,
}

/// A successful route: the response plus how it was obtained.
#[derive(Debug, Clone)]
pub struct RouteSuccess {
    pub response: InferenceResponse,
    pub provider_id: String,
    pub endpoint: String,
    pub attempts: Vec<AttemptRecord>,
}

pub(crate) fn summarize_attempts(attempts: &[AttemptRecord]) -> String {
    if attempts.is_empty() {
        return "no provider was attempted".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} ({}): {}", a.provider_id, a.endpoint, a.outcome.reason()))
        .collect::<Vec<_>>()
        .join("; ")
}
