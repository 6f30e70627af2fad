// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Removal of mounts no caller claims.
//!
//! Runs once when started and, if an interval is configured, periodically
//! after that. A volume reported by a plugin is orphaned when the
//! [`ClaimTracker`] holds no live claim for it; it stays reserved against new
//! claims until its unmount returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use volman_core::VolmanError;

use crate::claims::ClaimTracker;
use crate::registry::PluginRegistry;
use crate::supervisor::{ReadySignal, Task};

/// Counts from one purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub unmounted: usize,
    /// Volumes left alone because a caller still claims them.
    pub claimed: usize,
    /// Failed list or unmount calls.
    pub failures: usize,
}

pub struct Purger {
    registry: Arc<PluginRegistry>,
    claims: Arc<ClaimTracker>,
    interval: Option<Duration>,
}

impl Purger {
    pub fn new(registry: Arc<PluginRegistry>, claims: Arc<ClaimTracker>) -> Self {
        Self {
            registry,
            claims,
            interval: None,
        }
    }

    /// Repeats the purge every `interval` after the startup pass.
    ///
    /// A zero interval disables the periodic purge.
    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        if interval.is_some_and(|period| period.is_zero()) {
            warn!("zero purge interval, purging at startup only");
        }
        self.interval = interval.filter(|period| !period.is_zero());
        self
    }

    /// Unmounts every unclaimed volume reported by a registered plugin.
    ///
    /// A failure on one plugin is logged and the pass moves on.
    pub async fn purge_once(&self) -> PurgeSummary {
        let snapshot = self.registry.plugins();
        let mut names: Vec<&String> = snapshot.keys().collect();
        names.sort();

        let mut summary = PurgeSummary::default();
        for name in names {
            let plugin = &snapshot[name];
            let volumes = match plugin.list_volumes().await {
                Ok(volumes) => volumes,
                Err(e) => {
                    warn!(plugin = %name, error = %e, "failed to list volumes, skipping plugin");
                    summary.failures += 1;
                    continue;
                }
            };

            for volume in volumes {
                // Mounts of this volume wait until the reservation drops.
                let Some(_reservation) = self.claims.begin_purge(name, &volume) else {
                    debug!(plugin = %name, volume = %volume, "volume claimed, keeping");
                    summary.claimed += 1;
                    continue;
                };
                match plugin.unmount(&volume).await {
                    Ok(()) => {
                        info!(plugin = %name, volume = %volume, "unmounted orphaned volume");
                        summary.unmounted += 1;
                    }
                    Err(e) => {
                        warn!(plugin = %name, volume = %volume, error = %e, "failed to unmount orphaned volume");
                        summary.failures += 1;
                    }
                }
            }
        }

        info!(
            unmounted = summary.unmounted,
            claimed = summary.claimed,
            failures = summary.failures,
            "purge complete"
        );
        summary
    }
}

#[async_trait]
impl Task for Purger {
    fn name(&self) -> &str {
        "volman-purger"
    }

    async fn run(&self, ready: ReadySignal, cancel: CancellationToken) -> Result<(), VolmanError> {
        async move {
            info!("start");
            self.purge_once().await;
            ready.notify();

            match self.interval {
                Some(period) => {
                    let mut ticker = interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = ticker.tick() => {
                                self.purge_once().await;
                            }
                        }
                    }
                }
                None => cancel.cancelled().await,
            }
            info!("end");
            Ok(())
        }
        .instrument(info_span!("purger"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use volman_core::{Plugin, PluginError};
    use volman_test_utils::SpyPlugin;

    fn registry_with(plugins: &[Arc<SpyPlugin>]) -> Arc<PluginRegistry> {
        let registry = Arc::new(PluginRegistry::new());
        for plugin in plugins {
            registry.set(plugin.spec().name, plugin.clone() as Arc<dyn Plugin>);
        }
        registry
    }

    #[tokio::test]
    async fn unclaimed_volumes_are_unmounted() {
        let nfs = Arc::new(SpyPlugin::new("nfs").with_volumes(["vol1", "vol2"]));
        let claims = Arc::new(ClaimTracker::new());
        claims.claim("nfs", "vol2");
        let purger = Purger::new(registry_with(&[nfs.clone()]), claims);

        let summary = purger.purge_once().await;

        assert_eq!(nfs.unmounted(), vec!["vol1"]);
        assert_eq!(
            summary,
            PurgeSummary {
                unmounted: 1,
                claimed: 1,
                failures: 0
            }
        );
    }

    #[tokio::test]
    async fn failure_on_one_plugin_does_not_stop_others() {
        let broken = Arc::new(SpyPlugin::new("broken").with_volumes(["a"]));
        broken.fail_unmount(Some(PluginError::Transport("refused".into())));
        let healthy = Arc::new(SpyPlugin::new("healthy").with_volumes(["b"]));
        let purger = Purger::new(
            registry_with(&[broken.clone(), healthy.clone()]),
            Arc::new(ClaimTracker::new()),
        );

        let summary = purger.purge_once().await;

        assert_eq!(summary.failures, 1);
        assert_eq!(healthy.unmounted(), vec!["b"]);
    }

    #[tokio::test]
    async fn plugins_without_enumeration_are_left_alone() {
        struct Opaque;

        #[async_trait]
        impl Plugin for Opaque {
            fn spec(&self) -> volman_core::PluginSpec {
                volman_core::PluginSpec::local("opaque")
            }
            async fn mount(
                &self,
                _: &str,
                _: &volman_core::MountConfig,
            ) -> Result<volman_core::MountResponse, PluginError> {
                unreachable!()
            }
            async fn unmount(&self, _: &str) -> Result<(), PluginError> {
                panic!("nothing to purge")
            }
        }

        let registry = Arc::new(PluginRegistry::new());
        registry.set("opaque", Arc::new(Opaque));
        let summary = Purger::new(registry, Arc::new(ClaimTracker::new()))
            .purge_once()
            .await;
        assert_eq!(summary, PurgeSummary::default());
    }

    #[tokio::test]
    async fn run_signals_ready_after_startup_pass() {
        let nfs = Arc::new(SpyPlugin::new("nfs").with_volumes(["stale"]));
        let purger = Arc::new(Purger::new(
            registry_with(&[nfs.clone()]),
            Arc::new(ClaimTracker::new()),
        ));
        let cancel = CancellationToken::new();
        let (ready, ready_rx) = ReadySignal::channel();

        let handle = {
            let purger = purger.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { purger.run(ready, cancel).await })
        };
        ready_rx.await.unwrap();
        assert_eq!(nfs.unmounted(), vec!["stale"]);

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_purges_at_startup_only() {
        let nfs = Arc::new(SpyPlugin::new("nfs").with_volumes(["stale"]));
        // A failing unmount keeps the volume listed, so every pass would retry it.
        nfs.fail_unmount(Some(PluginError::Transport("busy".into())));
        let purger = Arc::new(
            Purger::new(registry_with(&[nfs.clone()]), Arc::new(ClaimTracker::new()))
                .with_interval(Some(Duration::ZERO)),
        );
        let cancel = CancellationToken::new();
        let (ready, ready_rx) = ReadySignal::channel();

        let handle = {
            let purger = purger.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { purger.run(ready, cancel).await })
        };
        ready_rx.await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(nfs.unmount_calls(), 1);

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }
}
