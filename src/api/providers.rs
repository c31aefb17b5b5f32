//! Provider listing and manual registration.

use crate::api::{AddProviderRequest, ApiError, AppState, ProvidersQuery, ProvidersResponse};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// GET /v1/providers - List providers in registration order.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProvidersQuery>,
) -> Json<ProvidersResponse> {
    let providers = state.registry.list();
    let total = providers.len();
    let online = providers.iter().filter(|p| p.is_online()).count();

    let data = match query.status {
        Some(status) => providers.into_iter().filter(|p| p.status == status).collect(),
        None => providers,
    };
    Json(ProvidersResponse::new(data, total, online))
}

/// POST /v1/providers - Register an endpoint and probe it out of band.
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddProviderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = state.discovery.add_provider(&body.endpoint).await?;
    Ok((StatusCode::ACCEPTED, Json(provider)))
}
