//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub providers: ProviderCounts,
    pub discovery_running: bool,
}

/// Provider counts by availability.
#[derive(Debug, Serialize)]
pub struct ProviderCounts {
    pub total: usize,
    pub online: usize,
    pub unavailable: usize,
}

/// GET /health - Return mesh health status.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let total = state.registry.provider_count();
    let online = state.registry.online_count();

    let status = match (online, total) {
        (o, t) if o == t && t > 0 => "healthy",
        (o, _) if o > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: ProviderCounts {
            total,
            online,
            unavailable: total.saturating_sub(online),
        },
        discovery_running: state.discovery.is_running(),
    })
}
