// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discoverer double returning whatever the test last gave it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use volman_core::{Discoverer, Plugin, PluginMap, VolmanError};

/// A discoverer with a fixed, swappable result.
pub struct StaticDiscoverer {
    name: String,
    plugins: Mutex<Result<PluginMap, String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StaticDiscoverer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugins: Mutex::new(Ok(PluginMap::new())),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleeps for `delay` inside every discovery before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Builds a discoverer that returns `plugins`, keyed by their spec name.
    pub fn with_plugins(name: impl Into<String>, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let discoverer = Self::new(name);
        discoverer.set_plugins(plugins);
        discoverer
    }

    /// Replaces the set returned by subsequent discoveries.
    pub fn set_plugins(&self, plugins: Vec<Arc<dyn Plugin>>) {
        let map = plugins
            .into_iter()
            .map(|p| (p.spec().name, p))
            .collect::<PluginMap>();
        *self.plugins.lock().unwrap_or_else(|e| e.into_inner()) = Ok(map);
    }

    /// Makes subsequent discoveries fail with `message`.
    pub fn set_error(&self, message: impl Into<String>) {
        *self.plugins.lock().unwrap_or_else(|e| e.into_inner()) = Err(message.into());
    }

    /// Number of times `discover` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Discoverer for StaticDiscoverer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn discover(&self) -> Result<PluginMap, VolmanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &*self.plugins.lock().unwrap_or_else(|e| e.into_inner()) {
            Ok(map) => Ok(map.clone()),
            Err(message) => Err(VolmanError::Discovery {
                discoverer: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}
