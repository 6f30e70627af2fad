// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a mistyped key is an
//! error at startup rather than a silently ignored setting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level volman configuration. All sections default.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VolmanConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` overrides.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for VolmanConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            driver: DriverConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Driver discovery and lifecycle settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Directories scanned for `.spec` and `.json` driver files, in
    /// precedence order.
    #[serde(default)]
    pub driver_paths: Vec<String>,

    /// Seconds between registry reconciliation cycles.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Seconds between purge passes. Unset purges only at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purge_interval_secs: Option<u64>,

    /// Deadline for each request to an HTTP driver. Unset means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Call Activate on discovered drivers and skip those that are not
    /// volume drivers.
    #[serde(default)]
    pub verify_activation: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_paths: Vec::new(),
            sync_interval_secs: default_sync_interval_secs(),
            purge_interval_secs: None,
            request_timeout_secs: None,
            verify_activation: false,
        }
    }
}

impl DriverConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn purge_interval(&self) -> Option<Duration> {
        self.purge_interval_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_sync_interval_secs() -> u64 {
    30
}

/// Prometheus endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: default_metrics_port(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_metrics_port() -> u16 {
    9100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VolmanConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.driver.sync_interval(), Duration::from_secs(30));
        assert_eq!(config.driver.purge_interval(), None);
        assert_eq!(config.driver.request_timeout(), None);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn empty_toml_equals_default() {
        let config: VolmanConfig = toml::from_str("").unwrap();
        assert_eq!(config, VolmanConfig::default());
    }
}
