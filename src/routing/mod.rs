//! Request routing across the provider pool
//!
//! The router picks a provider per request under a selection strategy,
//! dispatches the call, and fails over to ranked alternates. Every attempt's
//! outcome is written back to the registry as health signal.
//!
//! Per request: select, dispatch, then either succeed, retry with the next
//! candidate, or give up once the attempt budget or candidate list runs out.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

pub mod decision;
pub mod dispatch;
pub mod error;
pub mod strategies;


pub use decision::{AttemptOutcome, AttemptRecord, RouteOptions, RouteSuccess, RoutingDecision};
pub use dispatch::{AgentDispatcher, DispatchResult, Dispatcher};
pub use error::RoutingError;
pub use strategies::SelectionStrategy;

use crate::agent::InferenceRequest;
use crate::registry::{Provider, Registry};

/// Result of a single dispatch attempt inside the retry loop.
enum Step {
    Done(RouteSuccess),
    Next,
    Stop(RoutingError),
}

/// Selects providers and drives the dispatch/retry state machine.
pub struct Router {
    registry: Arc<Registry>,
    dispatcher: Arc<dyn Dispatcher>,
    /// Registration number of the provider most recently chosen by round-robin
    round_robin_cursor: Mutex<Option<u64>>,
}

impl Router {
    pub fn new(registry: Arc<Registry>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
            round_robin_cursor: Mutex::new(None),
        }
    }

    /// Ordered candidates for `strategy`: primary first, then alternates.
    ///
    /// Only online providers are ranked, except for an explicit selection,
    /// which returns the pinned provider whatever its status. The primary
    /// must meet `min_reputation` when any online provider does.
    fn candidates(
        &self,
        options: &RouteOptions,
        advance_cursor: bool,
    ) -> Result<Vec<Provider>, RoutingError> {
        let strategy = &options.strategy;
        if let SelectionStrategy::Explicit(id) = strategy {
            let provider = self
                .registry
                .get(id)
                .map_err(|_| RoutingError::ProviderNotFound { id: id.clone() })?;
            return Ok(vec![provider]);
        }

        let mut online = self.registry.list_online();
        match strategy {
            SelectionStrategy::RoundRobin => {
                let mut cursor = self
                    .round_robin_cursor
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                strategies::rotate_after(&mut online, *cursor);
                strategies::promote_reputable(&mut online, options.min_reputation);
                if advance_cursor {
                    if let Some(first) = online.first() {
                        *cursor = Some(first.registration);
                    }
                }
            }
            other => {
                strategies::rank(other, &mut online);
                strategies::promote_reputable(&mut online, options.min_reputation);
            }
        }
        Ok(online)
    }

    /// Compute the routing decision for `options` without dispatching.
    ///
    /// Does not advance the round-robin cursor.
    pub fn decide(&self, options: &RouteOptions) -> Result<RoutingDecision, RoutingError> {
        let candidates = self.candidates(options, false)?;
        let mut ids = candidates
            .into_iter()
            .take(options.attempt_budget())
            .map(|p| p.id);
        let provider_id = ids
            .next()
            .ok_or(RoutingError::NoProvidersAvailable { attempts: Vec::new() })?;
        Ok(RoutingDecision {
            provider_id,
            strategy: options.strategy.clone(),
            fallbacks: ids.collect(),
        })
    }

    /// Route one inference request.
    ///
    /// Tries ranked candidates until one succeeds, never exceeding
    /// `max_retries + 1` dispatches (the last-resort call included).
    ///
    /// # Errors
    ///
    /// - `ProviderNotFound` when an explicit id is unknown; nothing is dispatched
    /// - `Rejected` when a provider reports a terminal request error
    /// - `NoProvidersAvailable` when every allowed attempt failed, listing each one
    pub async fn route(
        &self,
        request: InferenceRequest,
        options: &RouteOptions,
    ) -> Result<RouteSuccess, RoutingError> {
        let result = self.route_inner(request, options).await;

        let status = match &result {
            Ok(_) => "success",
            Err(RoutingError::ProviderNotFound { .. }) => "not_found",
            Err(RoutingError::Rejected { .. }) => "rejected",
            Err(RoutingError::NoProvidersAvailable { .. }) => "exhausted",
        };
        metrics::counter!("mesh_routes_total",
            "strategy" => options.strategy.kind(),
            "status" => status
        )
        .increment(1);

        result
    }

    async fn route_inner(
        &self,
        request: InferenceRequest,
        options: &RouteOptions,
    ) -> Result<RouteSuccess, RoutingError> {
        let candidates = self.candidates(options, true)?;
        let budget = options.attempt_budget();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut tried: HashSet<String> = HashSet::new();

        tracing::debug!(
            strategy = %options.strategy,
            candidates = candidates.len(),
            budget,
            "Routing request"
        );

        for provider in candidates.iter().take(budget) {
            tried.insert(provider.id.clone());
            match self
                .attempt(provider, &request, options, &mut attempts, false)
                .await
            {
                Step::Done(success) => return Ok(success),
                Step::Stop(err) => return Err(err),
                Step::Next => {}
            }
        }

        let pinned = matches!(options.strategy, SelectionStrategy::Explicit(_));
        if options.fallback_to_any && !pinned && attempts.len() < budget {
            if let Some(provider) = self.last_resort(&options.strategy, &tried) {
                tracing::info!(
                    provider_id = %provider.id,
                    status = %provider.status,
                    "Ranked candidates exhausted, trying last-resort provider"
                );
                match self
                    .attempt(&provider, &request, options, &mut attempts, true)
                    .await
                {
                    Step::Done(success) => return Ok(success),
                    Step::Stop(err) => return Err(err),
                    Step::Next => {}
                }
            }
        }

        tracing::warn!(
            attempts = attempts.len(),
            "No provider could serve the request"
        );
        Err(RoutingError::NoProvidersAvailable { attempts })
    }

    /// Best untried provider of any status.
    fn last_resort(&self, strategy: &SelectionStrategy, tried: &HashSet<String>) -> Option<Provider> {
        let mut rest: Vec<Provider> = self
            .registry
            .list()
            .into_iter()
            .filter(|p| !tried.contains(&p.id))
            .collect();
        strategies::rank(strategy, &mut rest);
        rest.sort_by_key(|p| strategies::status_rank(p.status));
        rest.into_iter().next()
    }

    async fn attempt(
        &self,
        provider: &Provider,
        request: &InferenceRequest,
        options: &RouteOptions,
        attempts: &mut Vec<AttemptRecord>,
        last_resort: bool,
    ) -> Step {
        let start = Instant::now();
        let result = tokio::time::timeout(
            options.dispatch_timeout,
            self.dispatcher.dispatch(provider, request.clone()),
        )
        .await;
        let latency_ms = start.elapsed().as_millis() as u32;

        let (outcome, step) = match result {
            Ok(DispatchResult::Success(response)) => {
                metrics::histogram!("mesh_dispatch_duration_seconds",
                    "provider" => provider.id.clone()
                )
                .record(latency_ms as f64 / 1000.0);
                (AttemptOutcome::Success, Some(response))
            }
            Ok(DispatchResult::Retryable(reason)) => (AttemptOutcome::Failed(reason), None),
            Ok(DispatchResult::Terminal(reason)) => (AttemptOutcome::Rejected(reason), None),
            Err(_) => (
                AttemptOutcome::TimedOut(options.dispatch_timeout.as_millis() as u64),
                None,
            ),
        };

        let success = outcome == AttemptOutcome::Success;
        if matches!(outcome, AttemptOutcome::Rejected(_)) {
            // The request was at fault, not the provider.
            tracing::debug!(
                provider_id = %provider.id,
                "Rejected request not counted against provider health"
            );
        } else if let Err(e) = self
            .registry
            .record_outcome(&provider.id, success, latency_ms)
        {
            tracing::warn!(provider_id = %provider.id, error = %e, "Could not record outcome");
        }
        metrics::counter!("mesh_route_attempts_total",
            "provider" => provider.id.clone(),
            "outcome" => outcome.label()
        )
        .increment(1);

        if success {
            tracing::debug!(provider_id = %provider.id, latency_ms, "Dispatch succeeded");
        } else {
            tracing::warn!(
                provider_id = %provider.id,
                endpoint = %provider.endpoint,
                latency_ms,
                reason = %outcome.reason(),
                "Dispatch attempt failed"
            );
        }

        attempts.push(AttemptRecord {
            provider_id: provider.id.clone(),
            endpoint: provider.endpoint.clone(),
            latency_ms,
            outcome: outcome.clone(),
            last_resort,
        });

        match (outcome, step) {
            (AttemptOutcome::Success, Some(response)) => Step::Done(RouteSuccess {
                response,
                provider_id: provider.id.clone(),
                endpoint: provider.endpoint.clone(),
                attempts: std::mem::take(attempts),
            }),
            (AttemptOutcome::Rejected(reason), _) => Step::Stop(RoutingError::Rejected {
                provider_id: provider.id.clone(),
                reason,
                attempts: std::mem::take(attempts),
            }),
            _ => Step::Next,
        }
    }
}
