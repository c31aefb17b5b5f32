//! Chat completions endpoint handler.

use crate::api::{ApiError, AppState, ChatCompletionRequest};
use crate::logging::{extract_tokens, request_id_from, route_chain};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Request header pinning the provider; response header naming the one that served
pub const PROVIDER_HEADER: &str = "x-mesh-provider";
/// Response header with the number of dispatch attempts
pub const ATTEMPTS_HEADER: &str = "x-mesh-attempts";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /v1/chat/completions - Route a chat completion to a provider.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let request_id = request_id_from(&headers, REQUEST_ID_HEADER);
    let start_time = std::time::Instant::now();

    if request.stream {
        return Err(ApiError::bad_request("Streaming responses are not supported"));
    }
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("'messages' must not be empty"));
    }

    let pinned = headers
        .get(PROVIDER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let options = request.route_options(state.config.routing.route_options(), pinned);

    info!(
        request_id = %request_id,
        strategy = %options.strategy,
        max_retries = options.max_retries,
        "Chat completion request"
    );

    match state.router.route(request.to_inference(), &options).await {
        Ok(success) => {
            let (prompt_tokens, completion_tokens, _) = extract_tokens(&success.response);
            info!(
                request_id = %request_id,
                provider_id = %success.provider_id,
                route = %route_chain(&success.attempts),
                latency_ms = start_time.elapsed().as_millis() as u64,
                prompt_tokens,
                completion_tokens,
                "Request completed"
            );

            let mut response = Json(success.response).into_response();
            let response_headers = response.headers_mut();
            insert_header(response_headers, PROVIDER_HEADER, &success.provider_id);
            insert_header(
                response_headers,
                ATTEMPTS_HEADER,
                &success.attempts.len().to_string(),
            );
            insert_header(response_headers, REQUEST_ID_HEADER, &request_id);
            Ok(response)
        }
        Err(e) => {
            warn!(
                request_id = %request_id,
                route = %route_chain(e.attempts()),
                error = %e,
                "Request failed"
            );
            let attempts = e.attempts().len();
            let mut response = ApiError::from(e).into_response();
            insert_header(response.headers_mut(), ATTEMPTS_HEADER, &attempts.to_string());
            insert_header(response.headers_mut(), REQUEST_ID_HEADER, &request_id);
            Ok(response)
        }
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(HeaderName::from_static(name), value);
    }
}
