// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric names and best-effort emission helpers.

use std::time::Duration;

use dashmap::DashMap;
use tracing::warn;
use volman_core::MetricsSink;

pub const MOUNT_ERRORS: &str = "VolmanMountErrors";
pub const MOUNT_DURATION: &str = "VolmanMountDuration";
pub const UNMOUNT_ERRORS: &str = "VolmanUnmountErrors";
pub const UNMOUNT_DURATION: &str = "VolmanUnmountDuration";

const MOUNT_DURATION_PREFIX: &str = "VolmanMountDurationFor";
const UNMOUNT_DURATION_PREFIX: &str = "VolmanUnmountDurationFor";

/// Per-plugin duration metric names, built once per plugin id.
#[derive(Debug, Default)]
pub struct MetricNameCache {
    mount: DashMap<String, String>,
    unmount: DashMap<String, String>,
}

impl MetricNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `VolmanMountDurationFor<plugin_id>`.
    pub fn mount_duration(&self, plugin_id: &str) -> String {
        Self::lookup(&self.mount, MOUNT_DURATION_PREFIX, plugin_id)
    }

    /// `VolmanUnmountDurationFor<plugin_id>`.
    pub fn unmount_duration(&self, plugin_id: &str) -> String {
        Self::lookup(&self.unmount, UNMOUNT_DURATION_PREFIX, plugin_id)
    }

    /// Number of cached names across both operations.
    pub fn len(&self) -> usize {
        self.mount.len() + self.unmount.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mount.is_empty() && self.unmount.is_empty()
    }

    fn lookup(cache: &DashMap<String, String>, prefix: &str, plugin_id: &str) -> String {
        if let Some(name) = cache.get(plugin_id) {
            return name.value().clone();
        }
        cache
            .entry(plugin_id.to_string())
            .or_insert_with(|| format!("{prefix}{plugin_id}"))
            .value()
            .clone()
    }
}

/// Increments a counter, logging and discarding any sink error.
pub fn increment(sink: &dyn MetricsSink, name: &str) {
    if let Err(e) = sink.increment_counter(name) {
        warn!(metric = name, error = %e, "failed to increment counter");
    }
}

/// Sends a duration, logging and discarding any sink error.
pub fn send_duration(sink: &dyn MetricsSink, name: &str, duration: Duration) {
    if let Err(e) = sink.send_duration(name, duration) {
        warn!(metric = name, error = %e, "failed to send duration metric");
    }
}
