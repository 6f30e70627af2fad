// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later overriding earlier: compiled defaults,
//! `/etc/volman/volman.toml`, `~/.config/volman/volman.toml`,
//! `./volman.toml`, then `VOLMAN_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VolmanConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/volman/volman.toml";
pub const LOCAL_CONFIG_PATH: &str = "volman.toml";

/// `~/.config/volman/volman.toml`, when a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("volman/volman.toml"))
}

/// Loads configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<VolmanConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string over the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<VolmanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VolmanConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from one file, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<VolmanConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VolmanConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VolmanConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Maps `VOLMAN_<SECTION>_<KEY>` onto `<section>.<key>`.
///
/// Uses `Env::map` rather than `Env::split("_")` because keys contain
/// underscores: `VOLMAN_DRIVER_SYNC_INTERVAL_SECS` is
/// `driver.sync_interval_secs`.
fn env_provider() -> Env {
    Env::prefixed("VOLMAN_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("driver_", "driver.", 1)
            .replacen("metrics_", "metrics.", 1);
        mapped.into()
    })
}
