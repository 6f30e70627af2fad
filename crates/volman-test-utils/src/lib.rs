// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for volman integration tests.
//!
//! Deterministic, in-process stand-ins for every seam the manager touches,
//! so lifecycle and protocol tests run without real drivers or a metrics
//! backend.
//!
//! # Components
//!
//! - [`FakeDriver`] - Volume driver with canned responses and a call log
//! - [`SpyPlugin`] - Plugin counting calls, with injectable failures
//! - [`StaticDiscoverer`] - Discoverer returning a swappable fixed set
//! - [`RecordingSink`] - Metrics sink capturing every emission

pub mod fake_driver;
pub mod recording_sink;
pub mod spy_plugin;
pub mod static_discoverer;

pub use fake_driver::FakeDriver;
pub use recording_sink::RecordingSink;
pub use spy_plugin::SpyPlugin;
pub use static_discoverer::StaticDiscoverer;
