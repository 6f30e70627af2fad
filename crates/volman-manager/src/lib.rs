// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volume plugin lifecycle management.
//!
//! - [`PluginRegistry`] holds the live set of plugins.
//! - [`Syncer`] keeps the registry in step with discoverers.
//! - [`Purger`] unmounts volumes no caller claims.
//! - [`LocalManager`] brokers mount and unmount calls, with metrics.
//! - [`Supervisor`] runs the syncer and purger in order.

pub mod claims;
pub mod manager;
pub mod metrics;
pub mod purger;
pub mod registry;
pub mod supervisor;
pub mod syncer;

pub use claims::{ClaimGuard, ClaimTracker, PurgeGuard};
pub use manager::LocalManager;
pub use metrics::MetricNameCache;
pub use purger::{PurgeSummary, Purger};
pub use registry::{PluginRegistry, ReconcileSummary};
pub use supervisor::{ReadySignal, Supervisor, Task};
pub use syncer::{Syncer, DEFAULT_SYNC_INTERVAL};
