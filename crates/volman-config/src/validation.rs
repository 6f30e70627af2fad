// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks serde cannot express. All failures are collected.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::VolmanConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &VolmanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "log_level `{}` must be one of {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let driver = &config.driver;
    if driver.sync_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "driver.sync_interval_secs must be greater than 0",
        ));
    }
    if driver.purge_interval_secs == Some(0) {
        errors.push(ConfigError::validation(
            "driver.purge_interval_secs must be greater than 0 when set",
        ));
    }
    if driver.request_timeout_secs == Some(0) {
        errors.push(ConfigError::validation(
            "driver.request_timeout_secs must be greater than 0 when set",
        ));
    }

    let mut seen = HashSet::new();
    for (i, path) in driver.driver_paths.iter().enumerate() {
        if path.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "driver.driver_paths[{i}] must not be empty"
            )));
        } else if !seen.insert(path.trim()) {
            errors.push(ConfigError::validation(format!(
                "duplicate driver path `{path}` in driver.driver_paths"
            )));
        }
    }

    let bind = config.metrics.bind_address.trim();
    if bind.is_empty() {
        errors.push(ConfigError::validation(
            "metrics.bind_address must not be empty",
        ));
    } else if bind.parse::<std::net::IpAddr>().is_err()
        && !bind
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "metrics.bind_address `{bind}` is not a valid IP address or hostname"
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &VolmanConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&VolmanConfig::default()).is_ok());
    }

    #[test]
    fn zero_intervals_rejected() {
        let mut config = VolmanConfig::default();
        config.driver.sync_interval_secs = 0;
        config.driver.purge_interval_secs = Some(0);
        config.driver.request_timeout_secs = Some(0);
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn duplicate_and_empty_paths_rejected() {
        let mut config = VolmanConfig::default();
        config.driver.driver_paths = vec![
            "/var/vcap/data/voldrivers".into(),
            "".into(),
            "/var/vcap/data/voldrivers".into(),
        ];
        let messages = messages(&config);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("driver_paths[1]"));
        assert!(messages[1].contains("duplicate driver path"));
    }

    #[test]
    fn bad_bind_address_and_log_level() {
        let mut config = VolmanConfig::default();
        config.metrics.bind_address = "not an address!".into();
        config.log_level = "loud".into();
        assert_eq!(messages(&config).len(), 2);
    }
}
