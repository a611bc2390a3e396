//! Service configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the AutoService
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Delay between automatic dequeues in milliseconds
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,

    /// End the loop once a dequeue finds the queue empty
    #[serde(rename = "stop-when-empty")]
    pub stop_when_empty: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            stop_when_empty: false,
        }
    }
}

impl ServiceConfig {
    /// Get the interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.interval_ms, 5_000);
        assert!(!config.stop_when_empty);
    }

    #[test]
    fn test_interval_duration() {
        let config = ServiceConfig {
            interval_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ServiceConfig = serde_yaml::from_str("stop-when-empty: true").unwrap();
        assert!(config.stop_when_empty);
        assert_eq!(config.interval_ms, 5_000);
    }
}
