// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manager-facing data types.

use serde::{Deserialize, Serialize};

/// Driver-specific mount options.
///
/// Kept as an opaque map of dynamically-typed values; only the driver knows
/// its schema.
pub type MountConfig = serde_json::Map<String, serde_json::Value>;

/// Identity of a plugin handle as produced by a discoverer.
///
/// Two handles with equal specs are interchangeable; the syncer keeps the
/// registered one instead of replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Unique, case-sensitive plugin name.
    pub name: String,
    /// Where the driver is reached, when it is out of process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PluginSpec {
    /// Spec for an in-process plugin.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    /// Spec for a plugin reached at `address`.
    pub fn remote(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: Some(address.into()),
        }
    }
}

/// Result of a successful mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountResponse {
    /// Host path at which the volume is mounted.
    pub path: String,
}

/// A single registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
}

/// Projection of the registry to driver names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDriversResponse {
    pub drivers: Vec<InfoResponse>,
}

impl ListDriversResponse {
    /// Driver names in response order.
    pub fn names(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_spec_equality_includes_address() {
        let a = PluginSpec::remote("nfs", "http://127.0.0.1:7589");
        let b = PluginSpec::remote("nfs", "http://127.0.0.1:7590");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(PluginSpec::local("nfs"), a);
    }

    #[test]
    fn list_drivers_names() {
        let resp = ListDriversResponse {
            drivers: vec![
                InfoResponse { name: "efs".into() },
                InfoResponse { name: "nfs".into() },
            ],
        };
        assert_eq!(resp.names(), vec!["efs", "nfs"]);
    }
}
