// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for volman configuration loading.

use std::time::Duration;

use volman_config::diagnostic::ConfigError;
use volman_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_str, VolmanConfig,
};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
log_level = "debug"

[driver]
driver_paths = ["/var/vcap/data/voldrivers", "/etc/docker/plugins"]
sync_interval_secs = 10
purge_interval_secs = 300
request_timeout_secs = 15
verify_activation = true

[metrics]
enabled = false
bind_address = "0.0.0.0"
port = 9300
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.driver.driver_paths.len(), 2);
    assert_eq!(config.driver.sync_interval(), Duration::from_secs(10));
    assert_eq!(config.driver.purge_interval(), Some(Duration::from_secs(300)));
    assert_eq!(config.driver.request_timeout(), Some(Duration::from_secs(15)));
    assert!(config.driver.verify_activation);
    assert!(!config.metrics.enabled);
    assert_eq!(config.metrics.bind_address, "0.0.0.0");
    assert_eq!(config.metrics.port, 9300);
}

#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[driver]\nsync_interval_secs = 60\n").unwrap();
    assert_eq!(config.driver.sync_interval_secs, 60);
    assert!(config.driver.driver_paths.is_empty());
    assert_eq!(config.metrics, VolmanConfig::default().metrics);
}

#[test]
fn unknown_key_is_reported_with_suggestion() {
    let errors = load_and_validate_str("[driver]\nsync_intervl_secs = 5\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "sync_intervl_secs");
            assert_eq!(suggestion.as_deref(), Some("sync_interval_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[drivers]\nsync_interval_secs = 5\n").unwrap_err();
    assert!(matches!(
        &errors[0],
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "driver"
    ));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[metrics]\nport = \"ninety-one\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "metrics.port"));
}

#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[driver]
sync_interval_secs = 0
driver_paths = ["/a", "/a"]

[metrics]
bind_address = ""
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn load_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("volman.toml");
    std::fs::write(&path, "[driver]\ndriver_paths = [\"/plugins\"]\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.driver.driver_paths, vec!["/plugins".to_string()]);
}

#[test]
fn config_round_trips_through_toml() {
    let config = VolmanConfig::default();
    let rendered = toml::to_string(&config).unwrap();
    assert_eq!(load_config_from_str(&rendered).unwrap(), config);
}

#[test]
fn layered_load_reports_typo_in_user_config() {
    figment::Jail::expect_with(|jail| {
        std::fs::create_dir_all("xdg/volman").map_err(|e| e.to_string())?;
        jail.create_file(
            "xdg/volman/volman.toml",
            "[driver]\nsync_intervl_secs = 5\n",
        )?;
        jail.set_env("XDG_CONFIG_HOME", jail.directory().join("xdg").display());

        let errors = volman_config::load_and_validate().expect_err("typo must be rejected");
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "sync_intervl_secs"
                    && suggestion.as_deref() == Some("sync_interval_secs")
        )));
        Ok(())
    });
}
