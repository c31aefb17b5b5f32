//! Tunable policy constants for health bookkeeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smoothing and windowing parameters used by the registry.
///
/// These are the knobs behind reputation, latency and uptime. Defaults are
/// chosen so that one noisy probe cannot flip a routing decision on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryPolicy {
    /// Number of most recent dispatch outcomes that feed the reputation score
    pub reputation_window: usize,
    /// EMA weight of a new latency sample (0.0 - 1.0]
    pub latency_smoothing: f64,
    /// EWMA weight of a new availability observation (0.0 - 1.0]
    pub uptime_smoothing: f64,
    /// Seconds a successful probe keeps a provider `online`
    pub freshness_seconds: u64,
}

impl Default for RegistryPolicy {
    fn default() -> Self {
        Self {
            reputation_window: 50,
            latency_smoothing: 0.2,
            uptime_smoothing: 0.1,
            freshness_seconds: 90,
        }
    }
}

impl RegistryPolicy {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_seconds)
    }

    /// Check that every knob is inside its usable range.
    pub fn validate(&self) -> Result<(), String> {
        if self.reputation_window == 0 {
            return Err("reputation_window must be at least 1".to_string());
        }
        for (name, value) in [
            ("latency_smoothing", self.latency_smoothing),
            ("uptime_smoothing", self.uptime_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(format!("{} must be in (0.0, 1.0], got {}", name, value));
            }
        }
        if self.freshness_seconds == 0 {
            return Err("freshness_seconds must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Exponential moving average where `alpha` is the weight of the new sample.
pub(crate) fn ema(previous: f64, sample: f64, alpha: f64) -> f64 {
    previous * (1.0 - alpha) + sample * alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults_are_valid() {
        let policy = RegistryPolicy::default();
        assert_eq!(policy.reputation_window, 50);
        assert_eq!(policy.freshness(), Duration::from_secs(90));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_rejects_zero_window() {
        let policy = RegistryPolicy {
            reputation_window: 0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_rejects_out_of_range_smoothing() {
        let policy = RegistryPolicy {
            latency_smoothing: 1.5,
            ..Default::default()
        };
        assert!(policy.validate().unwrap_err().contains("latency_smoothing"));

        let policy = RegistryPolicy {
            uptime_smoothing: 0.0,
            ..Default::default()
        };
        assert!(policy.validate().unwrap_err().contains("uptime_smoothing"));
    }

    #[test]
    fn test_policy_partial_toml() {
        let policy: RegistryPolicy = toml::from_str("reputation_window = 10").unwrap();
        assert_eq!(policy.reputation_window, 10);
        assert_eq!(policy.latency_smoothing, 0.2);
    }

    #[test]
    fn test_ema_weights_new_sample() {
        assert_eq!(ema(100.0, 200.0, 0.2), 120.0);
        assert_eq!(ema(100.0, 0.0, 1.0), 0.0);
    }
}
