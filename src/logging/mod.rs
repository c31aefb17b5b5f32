//! Structured logging helpers
//!
//! Filter construction for the tracing subscriber, request ids, and field
//! extraction for per-request log lines.

pub mod fields;
pub mod request_id;

pub use fields::{extract_tokens, route_chain};
pub use request_id::{generate_request_id, request_id_from};

/// Build filter directives string from LoggingConfig
///
/// Produces `base_level,mesh::component=level,...`, with components in
/// alphabetical order.
///
/// # Examples
///
/// ```
/// use mesh::config::logging::{LogFormat, LoggingConfig};
/// use mesh::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: BTreeMap::from([("routing".to_string(), "debug".to_string())]),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,mesh::routing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();
    for (component, level) in &config.component_levels {
        filter_str.push_str(&format!(",mesh::{}={}", component, level));
    }
    filter_str
}
