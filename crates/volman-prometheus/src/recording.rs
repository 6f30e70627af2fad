// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions.

use metrics::{describe_counter, describe_histogram, Unit};

/// Registers descriptions for the fixed volman metrics.
///
/// Per-plugin duration histograms are created on first use and carry no
/// description.
pub fn register_metrics() {
    describe_counter!("VolmanMountErrors", "Failed mount requests");
    describe_counter!("VolmanUnmountErrors", "Failed unmount requests");
    describe_histogram!(
        "VolmanMountDuration",
        Unit::Seconds,
        "Mount request duration across all plugins"
    );
    describe_histogram!(
        "VolmanUnmountDuration",
        Unit::Seconds,
        "Unmount request duration across all plugins"
    );
}
