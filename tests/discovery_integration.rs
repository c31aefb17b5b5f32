//! Discovery cycles against wiremock scheduler nodes.

mod common;

use common::*;
use mesh::discovery::endpoint::provider_id_for;
use mesh::registry::{DiscoverySource, ProviderKind, ProviderStatus};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_seed_is_described_and_probed() {
    let node = MockServer::start().await;
    mount_node_info(&node, "gpu-box", 0.004, &["llama3", "mistral"]).await;

    let state = discovered_state(config_with_seeds(vec![node.uri()])).await;

    let provider = state.registry.get(&provider_id_for(&node.uri())).unwrap();
    assert_eq!(provider.name, "gpu-box");
    assert_eq!(provider.price_per_1k, 0.004);
    assert_eq!(provider.region, "EU");
    assert_eq!(provider.source, DiscoverySource::Seed);
    assert_eq!(provider.status, ProviderStatus::Online);
    assert_eq!(provider.models, vec!["llama3", "mistral"]);
    assert!(matches!(provider.kind, ProviderKind::LocalNode { .. }));
    assert!(provider.last_probed.is_some());
}

#[tokio::test]
async fn test_node_without_info_endpoint_uses_model_listing() {
    let node = MockServer::start().await;
    mount_models(&node, &["phi3"]).await;

    let state = discovered_state(config_with_seeds(vec![node.uri()])).await;

    let provider = state.registry.get(&provider_id_for(&node.uri())).unwrap();
    assert_eq!(provider.models, vec!["phi3"]);
    assert_eq!(provider.price_per_1k, 0.001);
    assert_eq!(provider.status, ProviderStatus::Online);
}

#[tokio::test]
async fn test_second_cycle_keeps_identity() {
    let node = MockServer::start().await;
    mount_node_info(&node, "steady", 0.002, &["llama3"]).await;

    let state = discovered_state(config_with_seeds(vec![node.uri()])).await;
    let first = state.registry.get(&provider_id_for(&node.uri())).unwrap();

    state.discovery.run_cycle().await;
    let second = state.registry.get(&provider_id_for(&node.uri())).unwrap();

    assert_eq!(state.registry.provider_count(), 1);
    assert_eq!(first.id, second.id);
    assert_eq!(first.first_seen, second.first_seen);
    assert_eq!(first.registration, second.registration);
}

#[tokio::test]
async fn test_node_going_down_is_marked_offline() {
    let node = MockServer::start().await;
    mount_node_info(&node, "fragile", 0.002, &["llama3"]).await;

    let state = discovered_state(config_with_seeds(vec![node.uri()])).await;
    let id = provider_id_for(&node.uri());
    assert_eq!(state.registry.get(&id).unwrap().status, ProviderStatus::Online);

    node.reset().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&node)
        .await;

    let provider = state.discovery.refresh_endpoint(&node.uri()).await.unwrap();
    assert_eq!(provider.status, ProviderStatus::Offline);
    // A failed describe leaves the advertised fields alone.
    assert_eq!(provider.name, "fragile");
    assert_eq!(provider.price_per_1k, 0.002);
}

#[tokio::test]
async fn test_add_provider_becomes_online() {
    let node = MockServer::start().await;
    mount_node_info(&node, "late-joiner", 0.003, &["llama3"]).await;

    let state = discovered_state(config_with_seeds(vec![])).await;
    let provisional = state.discovery.add_provider(&node.uri()).await.unwrap();
    assert_eq!(provisional.source, DiscoverySource::Manual);

    let id = provisional.id.clone();
    let mut status = provisional.status;
    for _ in 0..100 {
        status = state.registry.get(&id).unwrap().status;
        if status == ProviderStatus::Online {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, ProviderStatus::Online);
    assert!(state.discovery.seeds().await.contains(&node.uri()));
}

#[tokio::test]
async fn test_snapshot_broadcast_after_cycle() {
    let node = MockServer::start().await;
    mount_node_info(&node, "broadcaster", 0.001, &["llama3"]).await;

    let state = std::sync::Arc::new(
        mesh::api::AppState::from_config(config_with_seeds(vec![node.uri()])).unwrap(),
    );
    let mut snapshots = state.discovery.subscribe();

    state.discovery.run_cycle().await;

    let snapshot = snapshots.recv().await.unwrap();
    assert_eq!(snapshot.summary.total_providers, 1);
    assert_eq!(snapshot.summary.online_providers, 1);
}
