// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public entry point used by upstream callers.

use async_trait::async_trait;

use crate::error::VolmanError;
use crate::types::{ListDriversResponse, MountConfig, MountResponse};

/// Brokers mount and unmount requests to registered plugins.
#[async_trait]
pub trait Manager: Send + Sync + 'static {
    /// Names of all currently registered drivers. Never fails.
    fn list_drivers(&self) -> ListDriversResponse;

    /// Mounts `volume_id` through the plugin registered as `plugin_id`.
    async fn mount(
        &self,
        plugin_id: &str,
        volume_id: &str,
        config: &MountConfig,
    ) -> Result<MountResponse, VolmanError>;

    /// Unmounts `volume_id` through the plugin registered as `plugin_id`.
    async fn unmount(&self, plugin_id: &str, volume_id: &str) -> Result<(), VolmanError>;
}
