// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the volman volume-plugin manager.
//!
//! This crate provides the trait seams (plugins, discoverers, metrics sinks,
//! the manager itself), the error taxonomy, and the manager-facing data types
//! shared by every other crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PluginError, VolmanError};
pub use types::{InfoResponse, ListDriversResponse, MountConfig, MountResponse, PluginSpec};

pub use traits::{Discoverer, Manager, MetricsSink, Plugin, PluginMap};
