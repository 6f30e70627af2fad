// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of currently known plugins.
//!
//! The map lives behind an [`ArcSwap`]: readers take a lock-free snapshot,
//! writers publish a complete new map. A snapshot is never torn and never
//! reflects a write that started after it was taken.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use volman_core::{Plugin, PluginMap};

/// Outcome of one [`PluginRegistry::reconcile`] call. Names are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Present before and after, but with a different spec.
    pub replaced: Vec<String>,
    pub unchanged: usize,
}

impl ReconcileSummary {
    /// True when the registry did not change.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }
}

/// Concurrency-safe map from plugin name to plugin handle.
pub struct PluginRegistry {
    plugins: ArcSwap<PluginMap>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Point-in-time snapshot of every registered plugin.
    pub fn plugins(&self) -> Arc<PluginMap> {
        self.plugins.load_full()
    }

    /// Looks up a plugin by its exact name.
    pub fn plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.load().get(name).cloned()
    }

    /// Registers or replaces a single plugin.
    pub fn set(&self, name: impl Into<String>, plugin: Arc<dyn Plugin>) {
        let name = name.into();
        self.plugins.rcu(|current| {
            let mut next = PluginMap::clone(current);
            next.insert(name.clone(), plugin.clone());
            next
        });
    }

    /// Removes a plugin, returning the handle that was registered.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let previous = self.plugins.rcu(|current| {
            let mut next = PluginMap::clone(current);
            next.remove(name);
            next
        });
        previous.get(name).cloned()
    }

    /// Makes the registry equal to `candidates` in one atomic transition.
    ///
    /// Entries whose name and spec are unchanged keep their existing handle,
    /// so callers holding it mid-call are undisturbed.
    pub fn reconcile(&self, candidates: PluginMap) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        self.plugins.rcu(|current| {
            summary = ReconcileSummary::default();
            let mut next = PluginMap::with_capacity(candidates.len());

            for (name, candidate) in &candidates {
                match current.get(name) {
                    Some(existing) if existing.spec() == candidate.spec() => {
                        summary.unchanged += 1;
                        next.insert(name.clone(), existing.clone());
                    }
                    Some(_) => {
                        summary.replaced.push(name.clone());
                        next.insert(name.clone(), candidate.clone());
                    }
                    None => {
                        summary.added.push(name.clone());
                        next.insert(name.clone(), candidate.clone());
                    }
                }
            }
            summary.removed = current
                .keys()
                .filter(|name| !candidates.contains_key(*name))
                .cloned()
                .collect();
            next
        });

        summary.added.sort();
        summary.removed.sort();
        summary.replaced.sort();
        summary
    }

    pub fn len(&self) -> usize {
        self.plugins.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.load().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.load().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
