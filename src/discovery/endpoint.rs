//! Endpoint parsing helpers: stable ids, display names and region hints.

use reqwest::Url;
use std::net::IpAddr;

/// Parse and normalize a provider endpoint.
///
/// Only `http` and `https` URLs with a host are accepted. Trailing slashes
/// are dropped so `http://node:3001/` and `http://node:3001` are the same
/// endpoint.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, String> {
    let trimmed = endpoint.trim();
    let url = Url::parse(trimmed).map_err(|e| format!("invalid endpoint '{}': {}", trimmed, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "invalid endpoint '{}': scheme must be http or https",
            trimmed
        ));
    }
    if url.host_str().is_none() {
        return Err(format!("invalid endpoint '{}': missing host", trimmed));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Deterministic, readable provider id for an endpoint.
///
/// `http://localhost:3001` becomes `node-localhost-3001`. Manual
/// registration and later self-description of the same endpoint therefore
/// converge on one registry entry.
pub fn provider_id_for(endpoint: &str) -> String {
    let Ok(url) = Url::parse(endpoint) else {
        return format!("node-{}", slug(endpoint));
    };

    let mut parts = vec!["node".to_string()];
    if let Some(host) = url.host_str() {
        parts.push(slug(host));
    }
    if let Some(port) = url.port() {
        parts.push(port.to_string());
    }
    let path = slug(url.path());
    if !path.is_empty() {
        parts.push(path);
    }
    parts.join("-")
}

/// Human-readable fallback name (`host:port`).
pub fn display_name(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => endpoint.to_string(),
        },
        Err(_) => endpoint.to_string(),
    }
}

/// Region hint for a node that does not report one.
pub fn infer_region(endpoint: &str) -> String {
    let is_loopback = Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(is_loopback_host))
        .unwrap_or(false);
    if is_loopback {
        "Local".to_string()
    } else {
        "Unknown".to_string()
    }
}

fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|addr| addr.is_loopback())
        .unwrap_or(false)
}
