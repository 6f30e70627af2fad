// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus-backed metrics sink.
//!
//! Counters and durations go through the metrics-rs facade to a Prometheus
//! recorder; [`PrometheusSink::render`] produces the text exposition served
//! at `/metrics`.

pub mod recording;

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use volman_core::{MetricsSink, VolmanError};

pub use recording::register_metrics;

/// [`MetricsSink`] recording into Prometheus.
///
/// Durations are recorded as histograms in seconds.
pub struct PrometheusSink {
    handle: PrometheusHandle,
    /// Set when the recorder is private to this sink rather than installed
    /// process-wide.
    local: Option<Arc<PrometheusRecorder>>,
}

impl PrometheusSink {
    /// Creates a sink with its own recorder, leaving the global recorder
    /// untouched.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, register_metrics);
        Self {
            handle,
            local: Some(Arc::new(recorder)),
        }
    }

    /// Installs the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process.
    pub fn install() -> Result<Self, VolmanError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            VolmanError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;
        register_metrics();
        tracing::info!("prometheus metrics recorder installed");
        Ok(Self {
            handle,
            local: None,
        })
    }

    /// All collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    fn emit(&self, record: impl FnOnce()) {
        match &self.local {
            Some(recorder) => metrics::with_local_recorder(recorder.as_ref(), record),
            None => record(),
        }
    }
}

impl Default for PrometheusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for PrometheusSink {
    fn increment_counter(&self, name: &str) -> Result<(), VolmanError> {
        let name = name.to_string();
        self.emit(|| metrics::counter!(name).increment(1));
        Ok(())
    }

    fn send_duration(&self, name: &str, duration: Duration) -> Result<(), VolmanError> {
        let name = name.to_string();
        self.emit(|| metrics::histogram!(name).record(duration.as_secs_f64()));
        Ok(())
    }
}
