//! Market snapshot endpoint.

use crate::api::AppState;
use crate::market::{self, MarketSnapshot};
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /v1/market - Point-in-time snapshot of every known provider.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<MarketSnapshot> {
    Json(market::snapshot(&state.registry))
}
