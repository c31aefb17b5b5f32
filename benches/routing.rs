//! Benchmarks for routing decisions and market aggregation with varying
//! provider counts.

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mesh::agent::InferenceRequest;
use mesh::market::MarketSummary;
use mesh::registry::{
    DiscoverySource, ProbeReport, Provider, ProviderDescriptor, ProviderKind, Registry,
};
use mesh::routing::{DispatchResult, Dispatcher, RouteOptions, Router, SelectionStrategy};
use std::sync::Arc;

struct NoopDispatcher;

#[async_trait]
impl Dispatcher for NoopDispatcher {
    async fn dispatch(&self, _provider: &Provider, _request: InferenceRequest) -> DispatchResult {
        DispatchResult::Retryable("benchmark".to_string())
    }
}

/// Registry with `count` online providers of varied price and latency.
fn populated_registry(count: usize) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());
    for i in 0..count {
        let id = format!("node-{}", i);
        registry
            .upsert(
                ProviderDescriptor::new(
                    id.clone(),
                    id.clone(),
                    format!("http://node-{}:3001", i),
                    ProviderKind::local(),
                    DiscoverySource::Seed,
                )
                .with_price(0.001 + (i % 7) as f64 * 0.0005),
            )
            .unwrap();
        registry
            .record_probe(
                &id,
                &ProbeReport::reachable(20 + ((i * 37) % 200) as u32, vec!["llama3".to_string()]),
            )
            .unwrap();
    }
    registry
}

fn options(strategy: SelectionStrategy) -> RouteOptions {
    RouteOptions {
        strategy,
        ..RouteOptions::default()
    }
}

/// Latency-based decision; every online provider is ranked.
fn bench_latency_decision_by_provider_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("latency_decision");

    for count in [1, 10, 50, 200] {
        let router = Router::new(populated_registry(count), Arc::new(NoopDispatcher));
        let options = options(SelectionStrategy::LatencyBased);

        group.bench_with_input(BenchmarkId::new("providers", count), &count, |b, _| {
            b.iter(|| {
                black_box(router.decide(&options).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_cost_decision(c: &mut Criterion) {
    let router = Router::new(populated_registry(50), Arc::new(NoopDispatcher));
    let options = options(SelectionStrategy::CostBased);

    c.bench_function("cost_decision_50_providers", |b| {
        b.iter(|| {
            black_box(router.decide(&options).unwrap());
        });
    });
}

fn bench_round_robin_decision(c: &mut Criterion) {
    let router = Router::new(populated_registry(50), Arc::new(NoopDispatcher));
    let options = options(SelectionStrategy::RoundRobin);

    c.bench_function("round_robin_decision_50_providers", |b| {
        b.iter(|| {
            black_box(router.decide(&options).unwrap());
        });
    });
}

fn bench_market_summary(c: &mut Criterion) {
    let providers = populated_registry(200).list();

    c.bench_function("market_summary_200_providers", |b| {
        b.iter(|| {
            black_box(MarketSummary::from_providers(&providers));
        });
    });
}

criterion_group!(
    benches,
    bench_latency_decision_by_provider_count,
    bench_cost_decision,
    bench_round_robin_decision,
    bench_market_summary,
);
criterion_main!(benches);
