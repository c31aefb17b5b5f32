//! Statically configured providers (`[[providers]]`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::error::ConfigError;
use crate::discovery::endpoint::{display_name, infer_region, normalize_endpoint, provider_id_for};
use crate::registry::{DiscoverySource, ProviderDescriptor, ProviderKind};

/// Which agent talks to a configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Local scheduler node
    #[default]
    Local,
    /// OpenAI-compatible cloud API
    Cloud,
}

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Defaults to a slug of the endpoint
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub endpoint: String,
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    /// Cloud providers only: model sent when the request names none
    #[serde(default)]
    pub api_model: Option<String>,
    /// Cloud providers only: env var holding the bearer key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub price_per_1k: Option<f64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub gpu: Option<String>,
}

impl ProviderConfig {
    pub fn resolved_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| provider_id_for(self.endpoint.trim_end_matches('/')))
    }

    /// Turn the entry into a registry descriptor.
    pub fn to_descriptor(&self, default_price: f64) -> Result<ProviderDescriptor, ConfigError> {
        let endpoint = normalize_endpoint(&self.endpoint).map_err(|message| {
            ConfigError::Validation {
                field: "providers.endpoint".to_string(),
                message,
            }
        })?;

        let kind = match self.provider_type {
            ProviderType::Local => ProviderKind::LocalNode {
                gpu: self.gpu.clone(),
            },
            ProviderType::Cloud => ProviderKind::CloudProvider {
                api_model: self
                    .api_model
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField("providers.api_model".to_string()))?,
                api_key_env: self.api_key_env.clone(),
            },
        };

        let region = self.region.clone().unwrap_or_else(|| match self.provider_type {
            ProviderType::Cloud => "Cloud".to_string(),
            ProviderType::Local => infer_region(&endpoint),
        });

        let mut metadata = HashMap::new();
        if let Some(var) = &self.api_key_env {
            metadata.insert("api_key_env".to_string(), var.clone());
        }

        Ok(ProviderDescriptor {
            id: self.resolved_id(),
            name: self.name.clone().unwrap_or_else(|| display_name(&endpoint)),
            endpoint,
            region,
            kind,
            models: self.models.clone(),
            price_per_1k: self.price_per_1k.unwrap_or(default_price),
            source: DiscoverySource::Static,
            metadata,
        })
    }
}
