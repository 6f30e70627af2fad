// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metrics sink that keeps every emission for later assertions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use volman_core::{MetricsSink, VolmanError};

/// Records counters and durations by metric name.
#[derive(Default)]
pub struct RecordingSink {
    counters: Mutex<HashMap<String, u64>>,
    durations: Mutex<Vec<(String, Duration)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every emission returns an error and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current value of a counter (0 if never incremented).
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Number of durations sent under `name`.
    pub fn duration_count(&self, name: &str) -> usize {
        self.durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }

    /// Durations sent under `name`, in emission order.
    pub fn durations(&self, name: &str) -> Vec<Duration> {
        self.durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, d)| *d)
            .collect()
    }

    fn check(&self) -> Result<(), VolmanError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(VolmanError::Internal("metrics sink unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl MetricsSink for RecordingSink {
    fn increment_counter(&self, name: &str) -> Result<(), VolmanError> {
        self.check()?;
        *self
            .counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn send_duration(&self, name: &str, duration: Duration) -> Result<(), VolmanError> {
        self.check()?;
        self.durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_string(), duration));
        Ok(())
    }
}
