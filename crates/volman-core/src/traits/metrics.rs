// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metrics transport contract.

use std::time::Duration;

use crate::error::VolmanError;

/// Best-effort metrics emission.
///
/// Callers log and swallow errors; a failing sink never changes the outcome
/// of the operation being measured.
pub trait MetricsSink: Send + Sync + 'static {
    /// Increments the counter `name` by one.
    fn increment_counter(&self, name: &str) -> Result<(), VolmanError>;

    /// Records one duration observation under `name`.
    fn send_duration(&self, name: &str, duration: Duration) -> Result<(), VolmanError>;
}
