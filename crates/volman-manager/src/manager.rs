// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The local mount manager.
//!
//! [`LocalManager`] resolves a plugin id against the registry, delegates the
//! call, and classifies the outcome. Every mount or unmount emits one global
//! and one per-plugin duration, lookup misses included; each failure
//! increments the operation's error counter exactly once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, Instrument};
use volman_core::{
    InfoResponse, ListDriversResponse, Manager, MetricsSink, MountConfig, MountResponse,
    PluginError, VolmanError,
};

use crate::claims::ClaimTracker;
use crate::metrics::{
    self, MetricNameCache, MOUNT_DURATION, MOUNT_ERRORS, UNMOUNT_DURATION, UNMOUNT_ERRORS,
};
use crate::registry::PluginRegistry;

/// Manager backed by an in-process [`PluginRegistry`].
pub struct LocalManager {
    registry: Arc<PluginRegistry>,
    sink: Arc<dyn MetricsSink>,
    claims: Arc<ClaimTracker>,
    metric_names: MetricNameCache,
}

impl LocalManager {
    pub fn new(registry: Arc<PluginRegistry>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            registry,
            sink,
            claims: Arc::new(ClaimTracker::new()),
            metric_names: MetricNameCache::new(),
        }
    }

    /// Shares an existing claim tracker, typically with the purger.
    pub fn with_claims(mut self, claims: Arc<ClaimTracker>) -> Self {
        self.claims = claims;
        self
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn claims(&self) -> &Arc<ClaimTracker> {
        &self.claims
    }

    fn send_mount_durations(&self, plugin_id: &str, elapsed: Duration) {
        let sink = self.sink.as_ref();
        metrics::send_duration(sink, MOUNT_DURATION, elapsed);
        metrics::send_duration(sink, &self.metric_names.mount_duration(plugin_id), elapsed);
    }

    fn send_unmount_durations(&self, plugin_id: &str, elapsed: Duration) {
        let sink = self.sink.as_ref();
        metrics::send_duration(sink, UNMOUNT_DURATION, elapsed);
        metrics::send_duration(sink, &self.metric_names.unmount_duration(plugin_id), elapsed);
    }

    async fn try_mount(
        &self,
        plugin_id: &str,
        volume_id: &str,
        config: &MountConfig,
    ) -> Result<MountResponse, VolmanError> {
        let Some(plugin) = self.registry.plugin(plugin_id) else {
            let err = VolmanError::PluginNotFound {
                plugin_id: plugin_id.to_string(),
            };
            error!(error = %err, "mount plugin lookup failed");
            metrics::increment(self.sink.as_ref(), MOUNT_ERRORS);
            return Err(err);
        };

        debug!("plugin mounting volume");
        // Held across the call so the purger leaves in-flight mounts alone.
        // Dropped, and so released, if the call fails or is abandoned.
        let claim = self.claims.acquire(plugin_id, volume_id).await;
        match plugin.mount(volume_id, config).await {
            Ok(response) => {
                claim.keep();
                Ok(response)
            }
            Err(e) => {
                drop(claim);
                metrics::increment(self.sink.as_ref(), MOUNT_ERRORS);
                error!(error = %e, "mount failed");
                Err(classify(e))
            }
        }
    }

    async fn try_unmount(&self, plugin_id: &str, volume_id: &str) -> Result<(), VolmanError> {
        let Some(plugin) = self.registry.plugin(plugin_id) else {
            let err = VolmanError::PluginNotFound {
                plugin_id: plugin_id.to_string(),
            };
            error!(error = %err, "unmount plugin lookup failed");
            metrics::increment(self.sink.as_ref(), UNMOUNT_ERRORS);
            return Err(err);
        };

        debug!("unmounting volume");
        match plugin.unmount(volume_id).await {
            Ok(()) => {
                self.claims.release(plugin_id, volume_id);
                Ok(())
            }
            Err(e) => {
                metrics::increment(self.sink.as_ref(), UNMOUNT_ERRORS);
                error!(error = %e, "unmount failed");
                Err(classify(e))
            }
        }
    }
}

/// Safe plugin failures become the manager's own safe error; everything else
/// propagates unchanged.
fn classify(err: PluginError) -> VolmanError {
    match err {
        PluginError::Safe { safe_description } => VolmanError::Safe { safe_description },
        other => VolmanError::Plugin(other),
    }
}

#[async_trait]
impl Manager for LocalManager {
    fn list_drivers(&self) -> ListDriversResponse {
        let span = info_span!("list-drivers");
        let _enter = span.enter();
        info!("start");

        let drivers: Vec<InfoResponse> = self
            .registry
            .names()
            .into_iter()
            .map(|name| InfoResponse { name })
            .collect();
        debug!(count = drivers.len(), "listing drivers");

        info!("end");
        ListDriversResponse { drivers }
    }

    async fn mount(
        &self,
        plugin_id: &str,
        volume_id: &str,
        config: &MountConfig,
    ) -> Result<MountResponse, VolmanError> {
        async move {
            info!("start");
            let started = Instant::now();
            let result = self.try_mount(plugin_id, volume_id, config).await;
            self.send_mount_durations(plugin_id, started.elapsed());
            info!("end");
            result
        }
        .instrument(info_span!("mount", plugin_id, volume_id))
        .await
    }

    async fn unmount(&self, plugin_id: &str, volume_id: &str) -> Result<(), VolmanError> {
        async move {
            info!("start");
            let started = Instant::now();
            let result = self.try_unmount(plugin_id, volume_id).await;
            self.send_unmount_durations(plugin_id, started.elapsed());
            info!("end");
            result
        }
        .instrument(info_span!("unmount", plugin_id, volume_id))
        .await
    }
}
