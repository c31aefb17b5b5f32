//! OpenAI-style error envelope for the HTTP surface.

use crate::discovery::DiscoveryError;
use crate::routing::{AttemptRecord, RoutingError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error response in OpenAI format.
///
/// ```json
/// {
///   "error": {
///     "message": "no providers available: ...",
///     "type": "server_error",
///     "code": "service_unavailable",
///     "attempts": [ ... ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Dispatch attempts made before the failure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,
}

impl ApiError {
    fn new(message: impl Into<String>, r#type: &str, param: Option<&str>, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.into(),
                r#type: r#type.to_string(),
                param: param.map(String::from),
                code: Some(code.to_string()),
                attempts: Vec::new(),
            },
        }
    }

    fn with_attempts(mut self, attempts: Vec<AttemptRecord>) -> Self {
        self.error.attempts = attempts;
        self
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(message, "invalid_request_error", None, "invalid_request_error")
    }

    /// Create a provider not found error (404).
    pub fn provider_not_found(id: &str) -> Self {
        Self::new(
            format!("Provider '{}' not found", id),
            "invalid_request_error",
            Some("provider"),
            "provider_not_found",
        )
    }

    /// A provider refused the request itself (422).
    pub fn provider_rejected(message: &str) -> Self {
        Self::new(message, "invalid_request_error", None, "provider_rejected")
    }

    /// Create a service unavailable error (503).
    pub fn service_unavailable(message: &str) -> Self {
        Self::new(message, "server_error", None, "service_unavailable")
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("provider_not_found") => StatusCode::NOT_FOUND,
            Some("provider_rejected") => StatusCode::UNPROCESSABLE_ENTITY,
            Some("service_unavailable") => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        let message = err.to_string();
        match err {
            RoutingError::ProviderNotFound { id } => ApiError::provider_not_found(&id),
            RoutingError::NoProvidersAvailable { attempts } => {
                ApiError::service_unavailable(&message).with_attempts(attempts)
            }
            RoutingError::Rejected { attempts, .. } => {
                ApiError::provider_rejected(&message).with_attempts(attempts)
            }
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::InvalidEndpoint(message) => {
                let mut error = ApiError::bad_request(&message);
                error.error.param = Some("endpoint".to_string());
                error
            }
            DiscoveryError::Registry(e) => ApiError::new(
                e.to_string(),
                "server_error",
                None,
                "internal_error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
