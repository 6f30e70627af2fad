// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin double that counts calls and reports injected failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use volman_core::{MountConfig, MountResponse, Plugin, PluginError, PluginSpec};

/// A plugin whose behaviour is scripted by the test.
///
/// Mount returns `/mnt/<volume_id>` unless a failure is set. An optional
/// delay is applied to each mount and unmount, which lets tests observe
/// calls that are in flight.
pub struct SpyPlugin {
    spec: PluginSpec,
    mount_calls: AtomicUsize,
    unmount_calls: AtomicUsize,
    mount_error: Mutex<Option<PluginError>>,
    unmount_error: Mutex<Option<PluginError>>,
    volumes: Mutex<Vec<String>>,
    unmounted: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl SpyPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_spec(PluginSpec::local(name))
    }

    pub fn with_spec(spec: PluginSpec) -> Self {
        Self {
            spec,
            mount_calls: AtomicUsize::new(0),
            unmount_calls: AtomicUsize::new(0),
            mount_error: Mutex::new(None),
            unmount_error: Mutex::new(None),
            volumes: Mutex::new(Vec::new()),
            unmounted: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleeps for `delay` inside every mount and unmount.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Volumes reported by `list_volumes`.
    pub fn with_volumes<S: Into<String>>(self, volumes: impl IntoIterator<Item = S>) -> Self {
        *lock(&self.volumes) = volumes.into_iter().map(Into::into).collect();
        self
    }

    pub fn fail_mount(&self, err: Option<PluginError>) {
        *lock(&self.mount_error) = err;
    }

    pub fn fail_unmount(&self, err: Option<PluginError>) {
        *lock(&self.unmount_error) = err;
    }

    pub fn mount_calls(&self) -> usize {
        self.mount_calls.load(Ordering::SeqCst)
    }

    pub fn unmount_calls(&self) -> usize {
        self.unmount_calls.load(Ordering::SeqCst)
    }

    /// Volume ids successfully unmounted, in call order.
    pub fn unmounted(&self) -> Vec<String> {
        lock(&self.unmounted).clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl Plugin for SpyPlugin {
    fn spec(&self) -> PluginSpec {
        self.spec.clone()
    }

    async fn mount(
        &self,
        volume_id: &str,
        _config: &MountConfig,
    ) -> Result<MountResponse, PluginError> {
        self.mount_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(err) = lock(&self.mount_error).clone() {
            return Err(err);
        }
        Ok(MountResponse {
            path: format!("/mnt/{volume_id}"),
        })
    }

    async fn unmount(&self, volume_id: &str) -> Result<(), PluginError> {
        self.unmount_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(err) = lock(&self.unmount_error).clone() {
            return Err(err);
        }
        lock(&self.unmounted).push(volume_id.to_string());
        lock(&self.volumes).retain(|v| v != volume_id);
        Ok(())
    }

    async fn list_volumes(&self) -> Result<Vec<String>, PluginError> {
        Ok(lock(&self.volumes).clone())
    }
}
