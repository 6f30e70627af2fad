// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic reconciliation of the registry against discovered plugins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use volman_core::{Discoverer, PluginMap, VolmanError};

use crate::registry::{PluginRegistry, ReconcileSummary};
use crate::supervisor::{ReadySignal, Task};

/// Interval used when none is configured.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Polls every discoverer and reconciles the registry with the merged result.
pub struct Syncer {
    registry: Arc<PluginRegistry>,
    discoverers: Vec<Arc<dyn Discoverer>>,
    interval: Duration,
}

impl Syncer {
    /// A zero `interval` falls back to [`DEFAULT_SYNC_INTERVAL`].
    pub fn new(
        registry: Arc<PluginRegistry>,
        discoverers: Vec<Arc<dyn Discoverer>>,
        interval: Duration,
    ) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                default_secs = DEFAULT_SYNC_INTERVAL.as_secs(),
                "zero sync interval, using default"
            );
            DEFAULT_SYNC_INTERVAL
        } else {
            interval
        };
        Self {
            registry,
            discoverers,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one discovery and reconciliation cycle.
    ///
    /// A failing discoverer contributes nothing to this cycle. On name
    /// collisions the later discoverer wins.
    pub async fn sync_once(&self) -> ReconcileSummary {
        async {
            let mut candidates = PluginMap::new();
            for discoverer in &self.discoverers {
                match discoverer.discover().await {
                    Ok(found) => {
                        debug!(
                            discoverer = discoverer.name(),
                            count = found.len(),
                            "discoverer returned plugins"
                        );
                        candidates.extend(found);
                    }
                    Err(e) => {
                        warn!(
                            discoverer = discoverer.name(),
                            error = %e,
                            "discovery failed, dropping its results for this cycle"
                        );
                    }
                }
            }

            let summary = self.registry.reconcile(candidates);
            if summary.is_noop() {
                debug!(plugins = self.registry.len(), "registry unchanged");
            } else {
                info!(
                    added = ?summary.added,
                    removed = ?summary.removed,
                    replaced = ?summary.replaced,
                    plugins = self.registry.len(),
                    "registry updated"
                );
            }
            summary
        }
        .instrument(info_span!("sync-cycle"))
        .await
    }
}

#[async_trait]
impl Task for Syncer {
    fn name(&self) -> &str {
        "volman-syncer"
    }

    async fn run(&self, ready: ReadySignal, cancel: CancellationToken) -> Result<(), VolmanError> {
        async move {
            info!(interval_secs = self.interval.as_secs(), "start");
            self.sync_once().await;
            ready.notify();

            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.sync_once().await;
                    }
                }
            }
            info!("end");
            Ok(())
        }
        .instrument(info_span!("syncer"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use volman_core::Plugin;
    use volman_test_utils::{SpyPlugin, StaticDiscoverer};

    fn spy(name: &str) -> Arc<dyn Plugin> {
        Arc::new(SpyPlugin::new(name))
    }

    #[tokio::test]
    async fn union_of_disjoint_discoverers() {
        let registry = Arc::new(PluginRegistry::new());
        let a = Arc::new(StaticDiscoverer::with_plugins("a", vec![spy("nfs")]));
        let b = Arc::new(StaticDiscoverer::with_plugins("b", vec![spy("efs"), spy("smb")]));
        let syncer = Syncer::new(registry.clone(), vec![a, b], DEFAULT_SYNC_INTERVAL);

        syncer.sync_once().await;

        assert_eq!(registry.names(), vec!["efs", "nfs", "smb"]);
    }

    #[tokio::test]
    async fn vanished_plugin_is_removed_next_cycle() {
        let registry = Arc::new(PluginRegistry::new());
        let discoverer = Arc::new(StaticDiscoverer::with_plugins(
            "spec-dir",
            vec![spy("nfs"), spy("efs")],
        ));
        let syncer = Syncer::new(
            registry.clone(),
            vec![discoverer.clone()],
            DEFAULT_SYNC_INTERVAL,
        );

        syncer.sync_once().await;
        discoverer.set_plugins(vec![spy("nfs")]);
        let summary = syncer.sync_once().await;

        assert_eq!(summary.removed, vec!["efs"]);
        assert_eq!(registry.names(), vec!["nfs"]);
    }

    #[tokio::test]
    async fn failing_discoverer_does_not_drop_others() {
        let registry = Arc::new(PluginRegistry::new());
        let broken = Arc::new(StaticDiscoverer::new("broken"));
        broken.set_error("directory unreadable");
        let healthy = Arc::new(StaticDiscoverer::with_plugins("healthy", vec![spy("nfs")]));
        let syncer = Syncer::new(registry.clone(), vec![broken, healthy], DEFAULT_SYNC_INTERVAL);

        syncer.sync_once().await;

        assert_eq!(registry.names(), vec!["nfs"]);
    }

    #[tokio::test]
    async fn later_discoverer_wins_on_collision() {
        let registry = Arc::new(PluginRegistry::new());
        let first: Arc<dyn Plugin> = spy("nfs");
        let second: Arc<dyn Plugin> = Arc::new(SpyPlugin::with_spec(
            volman_core::PluginSpec::remote("nfs", "http://127.0.0.1:7589"),
        ));
        let syncer = Syncer::new(
            registry.clone(),
            vec![
                Arc::new(StaticDiscoverer::with_plugins("first", vec![first])),
                Arc::new(StaticDiscoverer::with_plugins("second", vec![second.clone()])),
            ],
            DEFAULT_SYNC_INTERVAL,
        );

        syncer.sync_once().await;

        assert!(Arc::ptr_eq(&registry.plugin("nfs").unwrap(), &second));
    }

    #[tokio::test]
    async fn unchanged_handles_are_not_recreated() {
        let registry = Arc::new(PluginRegistry::new());
        let discoverer = Arc::new(StaticDiscoverer::with_plugins("d", vec![spy("nfs")]));
        let syncer = Syncer::new(
            registry.clone(),
            vec![discoverer.clone()],
            DEFAULT_SYNC_INTERVAL,
        );

        syncer.sync_once().await;
        let original = registry.plugin("nfs").unwrap();
        discoverer.set_plugins(vec![spy("nfs")]);
        syncer.sync_once().await;

        assert!(Arc::ptr_eq(&registry.plugin("nfs").unwrap(), &original));
    }

    #[tokio::test(start_paused = true)]
    async fn run_syncs_immediately_then_every_interval() {
        let registry = Arc::new(PluginRegistry::new());
        let discoverer = Arc::new(StaticDiscoverer::with_plugins("d", vec![spy("nfs")]));
        let syncer = Arc::new(Syncer::new(
            registry.clone(),
            vec![discoverer.clone()],
            Duration::from_secs(30),
        ));

        let cancel = CancellationToken::new();
        let (ready, ready_rx) = ReadySignal::channel();
        let handle = {
            let syncer = syncer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { syncer.run(ready, cancel).await })
        };

        ready_rx.await.unwrap();
        assert_eq!(discoverer.calls(), 1);
        assert_eq!(registry.names(), vec!["nfs"]);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(discoverer.calls(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(discoverer.calls(), 3);

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let syncer = Syncer::new(Arc::new(PluginRegistry::new()), Vec::new(), Duration::ZERO);
        assert_eq!(syncer.interval(), DEFAULT_SYNC_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_lets_in_flight_cycle_finish() {
        let registry = Arc::new(PluginRegistry::new());
        let discoverer = Arc::new(
            StaticDiscoverer::with_plugins("slow", vec![spy("nfs")])
                .with_delay(Duration::from_secs(5)),
        );
        let syncer = Arc::new(Syncer::new(
            registry.clone(),
            vec![discoverer.clone()],
            Duration::from_secs(10),
        ));

        let cancel = CancellationToken::new();
        let (ready, _ready_rx) = ReadySignal::channel();
        let started = Instant::now();
        let handle = {
            let syncer = syncer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { syncer.run(ready, cancel).await })
        };

        // First cycle lands at 5s; the next starts at 15s and lands at 20s.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(registry.names(), vec!["nfs"]);
        discoverer.set_plugins(vec![spy("efs")]);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(discoverer.calls(), 2);
        assert_eq!(registry.names(), vec!["nfs"]);

        cancel.cancel();
        handle.await.unwrap().unwrap();

        assert!(started.elapsed() >= Duration::from_secs(20));
        assert_eq!(registry.names(), vec!["efs"]);
        assert_eq!(discoverer.calls(), 2);
    }
}
