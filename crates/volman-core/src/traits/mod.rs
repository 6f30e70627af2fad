// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the manager and its collaborators.

pub mod discoverer;
pub mod manager;
pub mod metrics;
pub mod plugin;

pub use discoverer::Discoverer;
pub use manager::Manager;
pub use metrics::MetricsSink;
pub use plugin::{Plugin, PluginMap};
