// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of HTTP volume drivers through plugin spec directories.
//!
//! Each configured directory is scanned (non-recursively) for:
//! - `<name>.spec`: a single line holding the driver URL (`http://`,
//!   `https://`, or `tcp://` which is treated as `http://`).
//! - `<name>.json`: `{"Name": "...", "Addr": "..."}`; an empty `Name` falls
//!   back to the file stem.
//!
//! Other files are ignored. When several directories define the same name,
//! the earliest directory wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use volman_core::{Discoverer, Plugin, PluginMap, PluginSpec, VolmanError};

use crate::client::HttpDriver;
use crate::driver::Driver;
use crate::plugin::DriverPlugin;
use crate::VOLUME_DRIVER_CAPABILITY;

#[derive(Debug, Deserialize)]
struct JsonSpec {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Addr")]
    addr: String,
}

/// A driver found on disk, before a handle is built for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntry {
    pub name: String,
    pub address: String,
    pub source: PathBuf,
}

/// Discoverer reading plugin spec files.
pub struct SpecDirDiscoverer {
    paths: Vec<PathBuf>,
    request_timeout: Option<Duration>,
    verify_activation: bool,
}

impl SpecDirDiscoverer {
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            request_timeout: None,
            verify_activation: false,
        }
    }

    /// Deadline applied to every request made through discovered drivers.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Call Activate on each driver and skip those not advertising
    /// `VolumeDriver`.
    pub fn with_activation(mut self, verify: bool) -> Self {
        self.verify_activation = verify;
        self
    }

    /// Reads every spec file in the configured directories.
    ///
    /// Malformed files are logged and skipped. Returns the surviving entries
    /// and the number skipped.
    pub async fn scan(&self) -> (Vec<SpecEntry>, usize) {
        let mut seen: HashMap<String, SpecEntry> = HashMap::new();
        let mut order = Vec::new();
        let mut skipped = 0;

        for dir in &self.paths {
            let files = match list_dir(dir).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot read driver directory, skipping");
                    continue;
                }
            };

            for file in files {
                let entry = match read_spec(&file).await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => continue,
                    Err(message) => {
                        warn!(file = %file.display(), error = %message, "skipping malformed driver spec");
                        skipped += 1;
                        continue;
                    }
                };

                if let Some(existing) = seen.get(&entry.name) {
                    debug!(
                        name = %entry.name,
                        kept = %existing.source.display(),
                        ignored = %entry.source.display(),
                        "driver already defined by an earlier directory"
                    );
                    continue;
                }
                order.push(entry.name.clone());
                seen.insert(entry.name.clone(), entry);
            }
        }

        let entries = order
            .into_iter()
            .filter_map(|name| seen.remove(&name))
            .collect();
        (entries, skipped)
    }

    async fn build_plugin(&self, entry: &SpecEntry) -> Result<Arc<dyn Plugin>, String> {
        let driver = HttpDriver::new(entry.address.clone(), self.request_timeout)
            .map_err(|e| e.to_string())?;

        if self.verify_activation {
            let implements = driver.activate().await.map_err(|e| e.to_string())?;
            if !implements.iter().any(|c| c == VOLUME_DRIVER_CAPABILITY) {
                return Err(format!(
                    "driver does not implement {VOLUME_DRIVER_CAPABILITY} (implements {implements:?})"
                ));
            }
        }

        Ok(Arc::new(DriverPlugin::new(
            PluginSpec::remote(entry.name.clone(), entry.address.clone()),
            Arc::new(driver),
        )))
    }
}

#[async_trait]
impl Discoverer for SpecDirDiscoverer {
    fn name(&self) -> &str {
        "spec-dir"
    }

    async fn discover(&self) -> Result<PluginMap, VolmanError> {
        let (entries, mut skipped) = self.scan().await;

        let mut plugins = PluginMap::new();
        for entry in &entries {
            match self.build_plugin(entry).await {
                Ok(plugin) => {
                    plugins.insert(entry.name.clone(), plugin);
                }
                Err(e) => {
                    warn!(name = %entry.name, address = %entry.address, error = %e, "skipping driver");
                    skipped += 1;
                }
            }
        }

        info!(found = plugins.len(), skipped, "driver discovery complete");
        Ok(plugins)
    }
}

async fn list_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parses one spec file. `Ok(None)` for files that are not driver specs.
async fn read_spec(file: &Path) -> Result<Option<SpecEntry>, String> {
    let extension = file.extension().and_then(|e| e.to_str());
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let (name, raw_address) = match extension {
        Some("spec") => {
            let contents = tokio::fs::read_to_string(file)
                .await
                .map_err(|e| e.to_string())?;
            (stem, contents.trim().to_string())
        }
        Some("json") => {
            let contents = tokio::fs::read_to_string(file)
                .await
                .map_err(|e| e.to_string())?;
            let spec: JsonSpec = serde_json::from_str(&contents).map_err(|e| e.to_string())?;
            let name = if spec.name.is_empty() { stem } else { spec.name };
            (name, spec.addr.trim().to_string())
        }
        _ => return Ok(None),
    };

    if name.is_empty() {
        return Err("driver name is empty".to_string());
    }

    Ok(Some(SpecEntry {
        name,
        address: normalize_address(&raw_address)?,
        source: file.to_path_buf(),
    }))
}

fn normalize_address(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("driver address is empty".to_string());
    }
    if let Some(rest) = raw.strip_prefix("tcp://") {
        return Ok(format!("http://{rest}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Ok(raw.to_string());
    }
    Err(format!("unsupported driver address `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_addresses_become_http() {
        assert_eq!(
            normalize_address("tcp://127.0.0.1:7589").unwrap(),
            "http://127.0.0.1:7589"
        );
        assert_eq!(
            normalize_address("https://driver.local").unwrap(),
            "https://driver.local"
        );
        assert!(normalize_address("unix:///run/driver.sock").is_err());
        assert!(normalize_address("").is_err());
    }

    #[tokio::test]
    async fn scan_reads_spec_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nfs.spec"), "http://127.0.0.1:7589\n").unwrap();
        std::fs::write(
            dir.path().join("efs.json"),
            r#"{"Name": "efsdriver", "Addr": "tcp://127.0.0.1:7590"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let discoverer = SpecDirDiscoverer::new([dir.path()]);
        let (entries, skipped) = discoverer.scan().await;

        assert_eq!(skipped, 0);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["efsdriver", "nfs"]);
        assert_eq!(entries[0].address, "http://127.0.0.1:7590");
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.spec"), "http://127.0.0.1:7589").unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("sock.spec"), "unix:///run/sock.sock").unwrap();

        let discoverer = SpecDirDiscoverer::new([dir.path()]);
        let plugins = discoverer.discover().await.unwrap();

        assert_eq!(plugins.len(), 1);
        assert!(plugins.contains_key("good"));
        assert_eq!(discoverer.scan().await.1, 2);
    }

    #[tokio::test]
    async fn earlier_directory_wins_on_name_collision() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("nfs.spec"), "http://127.0.0.1:1111").unwrap();
        std::fs::write(second.path().join("nfs.spec"), "http://127.0.0.1:2222").unwrap();

        let discoverer = SpecDirDiscoverer::new([first.path(), second.path()]);
        let plugins = discoverer.discover().await.unwrap();

        assert_eq!(
            plugins["nfs"].spec(),
            PluginSpec::remote("nfs", "http://127.0.0.1:1111")
        );
    }

    #[tokio::test]
    async fn missing_directory_yields_empty_set() {
        let discoverer = SpecDirDiscoverer::new(["/nonexistent/volman/drivers"]);
        let plugins = discoverer.discover().await.unwrap();
        assert!(plugins.is_empty());
    }

    #[tokio::test]
    async fn discovery_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.spec"), "http://127.0.0.1:1").unwrap();
        std::fs::write(dir.path().join("b.spec"), "http://127.0.0.1:2").unwrap();

        let discoverer = SpecDirDiscoverer::new([dir.path()]);
        let first = discoverer.discover().await.unwrap();
        let second = discoverer.discover().await.unwrap();

        let mut a: Vec<PluginSpec> = first.values().map(|p| p.spec()).collect();
        let mut b: Vec<PluginSpec> = second.values().map(|p| p.spec()).collect();
        a.sort_by(|x, y| x.name.cmp(&y.name));
        b.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(a, b);
    }
}
