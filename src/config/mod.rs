//! Configuration module for the mesh
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`MESH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use mesh::config::MeshConfig;
//!
//! let config = MeshConfig::default();
//! assert_eq!(config.server.port, 8400);
//!
//! let toml = r#"
//! [discovery]
//! interval_seconds = 10
//! "#;
//! let config: MeshConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.discovery.interval_seconds, 10);
//! ```

pub mod discovery;
pub mod error;
pub mod logging;
pub mod provider;
pub mod routing;
pub mod server;

pub use discovery::DiscoveryConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::{ProviderConfig, ProviderType};
pub use routing::RoutingConfig;
pub use server::ServerConfig;

pub use crate::health::HealthCheckConfig;
pub use crate::registry::RegistryPolicy;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the mesh.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MeshConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Seed-polling discovery settings
    pub discovery: DiscoveryConfig,
    /// Probe configuration
    pub health_check: HealthCheckConfig,
    /// Reputation, smoothing and freshness knobs
    pub registry: RegistryPolicy,
    /// Default routing options
    pub routing: RoutingConfig,
    /// Static provider definitions
    pub providers: Vec<ProviderConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl MeshConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports MESH_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("MESH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("MESH_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("MESH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MESH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(discovery) = std::env::var("MESH_DISCOVERY") {
            self.discovery.enabled = discovery.to_lowercase() == "true";
        }
        if let Ok(interval) = std::env::var("MESH_DISCOVERY_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.discovery.interval_seconds = secs;
            }
        }
        if let Ok(seeds) = std::env::var("MESH_SEEDS") {
            self.discovery.seeds = seeds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(health) = std::env::var("MESH_HEALTH_CHECK") {
            self.health_check.enabled = health.to_lowercase() == "true";
        }

        if let Ok(strategy) = std::env::var("MESH_ROUTING_STRATEGY") {
            if let Ok(s) = strategy.parse() {
                self.routing.strategy = s;
            }
        }
        if let Ok(retries) = std::env::var("MESH_MAX_RETRIES") {
            if let Ok(r) = retries.parse() {
                self.routing.max_retries = r;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .validate()
            .map_err(|(field, message)| ConfigError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })?;
        self.logging
            .validate()
            .map_err(|(field, message)| ConfigError::Validation { field, message })?;
        if self.discovery.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "discovery.interval_seconds".to_string(),
                message: "interval must be non-zero".to_string(),
            });
        }
        if !self.discovery.default_price_per_1k.is_finite()
            || self.discovery.default_price_per_1k < 0.0
        {
            return Err(ConfigError::Validation {
                field: "discovery.default_price_per_1k".to_string(),
                message: "price must be a non-negative number".to_string(),
            });
        }
        if self.health_check.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.health_check.max_concurrent_probes == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.max_concurrent_probes".to_string(),
                message: "at least one probe must be allowed".to_string(),
            });
        }
        if self.routing.min_reputation > 100 {
            return Err(ConfigError::Validation {
                field: "routing.min_reputation".to_string(),
                message: "reputation is a score from 0 to 100".to_string(),
            });
        }
        if self.routing.dispatch_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "routing.dispatch_timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        self.registry
            .validate()
            .map_err(|message| ConfigError::Validation {
                field: "registry".to_string(),
                message,
            })?;

        for (i, seed) in self.discovery.seeds.iter().enumerate() {
            crate::discovery::endpoint::normalize_endpoint(seed).map_err(|message| {
                ConfigError::Validation {
                    field: format!("discovery.seeds[{}]", i),
                    message,
                }
            })?;
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.endpoint.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].endpoint", i),
                    message: "endpoint cannot be empty".to_string(),
                });
            }
            if let Some(name) = &provider.name {
                if name.trim().is_empty() {
                    return Err(ConfigError::Validation {
                        field: format!("providers[{}].name", i),
                        message: "name cannot be empty".to_string(),
                    });
                }
            }
            if let Some(price) = provider.price_per_1k {
                if !price.is_finite() || price < 0.0 {
                    return Err(ConfigError::Validation {
                        field: format!("providers[{}].price_per_1k", i),
                        message: "price must be a non-negative number".to_string(),
                    });
                }
            }
            provider.to_descriptor(self.discovery.default_price_per_1k)?;

            let id = provider.resolved_id();
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateProvider(id));
            }
        }

        Ok(())
    }
}
