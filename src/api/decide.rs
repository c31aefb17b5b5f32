//! Dry-run routing decisions.

use crate::api::{ApiError, AppState, DecideQuery};
use crate::routing::RoutingDecision;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

/// GET /v1/route - Primary provider and ordered fallbacks, without dispatching.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DecideQuery>,
) -> Result<Json<RoutingDecision>, ApiError> {
    let options = query.route_options(state.config.routing.route_options());
    Ok(Json(state.router.decide(&options)?))
}
