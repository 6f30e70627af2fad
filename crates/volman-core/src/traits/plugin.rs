// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability set every registered volume plugin exposes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PluginError;
use crate::types::{MountConfig, MountResponse, PluginSpec};

/// Plugins keyed by their unique name.
pub type PluginMap = HashMap<String, Arc<dyn Plugin>>;

/// A named handle to a volume driver.
///
/// Handles are owned by the registry; callers only borrow them for the
/// duration of a call.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Identity of this handle. The name never changes after creation.
    fn spec(&self) -> PluginSpec;

    /// Mounts `volume_id` with driver-specific options.
    async fn mount(
        &self,
        volume_id: &str,
        config: &MountConfig,
    ) -> Result<MountResponse, PluginError>;

    /// Unmounts `volume_id`.
    async fn unmount(&self, volume_id: &str) -> Result<(), PluginError>;

    /// Volumes the driver currently reports as mounted.
    ///
    /// Drivers that cannot enumerate their mounts report none, which makes
    /// them invisible to the purger.
    async fn list_volumes(&self) -> Result<Vec<String>, PluginError> {
        Ok(Vec::new())
    }
}
