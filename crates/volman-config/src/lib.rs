// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for volman.
//!
//! TOML files layered over compiled defaults, `VOLMAN_*` environment
//! overrides, strict unknown-key rejection, and diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! let config = volman_config::load_and_validate().expect("config errors");
//! println!("sync every {}s", config.driver.sync_interval_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, suggest_key, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DriverConfig, MetricsConfig, VolmanConfig};
pub use validation::validate_config;

/// Loads the layered configuration and validates it.
pub fn load_and_validate() -> Result<VolmanConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Loads and validates configuration from a TOML string.
pub fn load_and_validate_str(toml_content: &str) -> Result<VolmanConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Loads and validates configuration from one file plus env overrides.
pub fn load_and_validate_path(path: &Path) -> Result<VolmanConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_PATH) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_PATH).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.to_string());
        sources.push((path, content));
    }
    if let Some(path) = loader::user_config_path() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }
    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG_PATH) {
        sources.push((loader::SYSTEM_CONFIG_PATH.to_string(), content));
    }

    sources
}
