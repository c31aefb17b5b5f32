//! Server configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inbound HTTP surface of the mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on one inbound request, retries included
    pub request_timeout_seconds: u64,
    /// Requests handled at once; further requests wait for a slot
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8400,
            request_timeout_seconds: 300,
            max_concurrent_requests: 512,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline handed to agents for a whole inference call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Returns the offending field and the reason on failure.
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.port == 0 {
            return Err(("server.port", "port must be non-zero"));
        }
        if self.host.trim().is_empty() {
            return Err(("server.host", "host must not be empty"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(("server.request_timeout_seconds", "timeout must be non-zero"));
        }
        if self.max_concurrent_requests == 0 {
            return Err((
                "server.max_concurrent_requests",
                "at least one request must be allowed",
            ));
        }
        Ok(())
    }
}
