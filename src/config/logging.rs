//! Logging configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::Level;

/// Mesh modules that accept their own level under `component_levels`.
pub const COMPONENTS: &[&str] = &[
    "agent",
    "api",
    "cli",
    "config",
    "discovery",
    "health",
    "logging",
    "market",
    "metrics",
    "registry",
    "routing",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
///
/// `level` applies to everything; `component_levels` raises or lowers one
/// mesh module, e.g. `{ routing = "debug", discovery = "warn" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_levels: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Check levels parse and every component names a mesh module.
    ///
    /// Returns the offending field and the reason on failure.
    pub fn validate(&self) -> Result<(), (String, String)> {
        check_level(&self.level).map_err(|m| ("logging.level".to_string(), m))?;

        for (component, level) in &self.component_levels {
            let field = format!("logging.component_levels.{}", component);
            if !COMPONENTS.contains(&component.as_str()) {
                return Err((
                    field,
                    format!("unknown component, expected one of: {}", COMPONENTS.join(", ")),
                ));
            }
            check_level(level).map_err(|m| (field, m))?;
        }
        Ok(())
    }
}

fn check_level(level: &str) -> Result<(), String> {
    Level::from_str(level)
        .map(|_| ())
        .map_err(|_| format!("'{}' is not one of trace, debug, info, warn, error", level))
}
