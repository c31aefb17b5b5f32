//! Request correlation ids

use axum::http::HeaderMap;
use uuid::Uuid;

const MAX_CALLER_ID_LEN: usize = 128;

/// Generate a new request ID using UUID v4
///
/// # Examples
///
/// ```
/// use mesh::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert_eq!(request_id.len(), 36);
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Correlation id for an inbound request.
///
/// A caller-supplied id in `header` is kept when it is printable ASCII of
/// reasonable length, so one id can follow a request across services.
/// Otherwise a fresh one is generated.
pub fn request_id_from(headers: &HeaderMap, header: &str) -> String {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_CALLER_ID_LEN
                && id.chars().all(|c| c.is_ascii_graphic())
        })
        .map(str::to_string)
        .unwrap_or_else(generate_request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_generate_request_id_is_uuid() {
        let id = generate_request_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, generate_request_id());
    }

    #[test]
    fn test_caller_id_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("trace-42"));
        assert_eq!(request_id_from(&headers, "x-request-id"), "trace-42");
    }

    #[test]
    fn test_missing_or_unusable_caller_id_is_replaced() {
        let headers = HeaderMap::new();
        assert_eq!(request_id_from(&headers, "x-request-id").len(), 36);

        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("has space"));
        assert_ne!(request_id_from(&headers, "x-request-id"), "has space");

        let mut headers = HeaderMap::new();
        let long = "a".repeat(MAX_CALLER_ID_LEN + 1);
        headers.insert("x-request-id", HeaderValue::from_str(&long).unwrap());
        assert_ne!(request_id_from(&headers, "x-request-id"), long);
    }
}
