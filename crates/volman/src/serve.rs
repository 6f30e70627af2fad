// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `volman serve` and `volman drivers`.
//!
//! Wires the registry, discoverers, metrics sink, manager, syncer and purger
//! together and runs the syncer and purger under a supervisor until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::{error, info};
use volman_config::model::DriverConfig;
use volman_config::VolmanConfig;
use volman_core::{Discoverer, MetricsSink, VolmanError};
use volman_driver::SpecDirDiscoverer;
use volman_manager::{
    ClaimTracker, LocalManager, PluginRegistry, Purger, Supervisor, Syncer,
};
use volman_prometheus::PrometheusSink;

use crate::admin::{self, AdminState};
use crate::shutdown;

/// Initializes the fmt subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("volman={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn build_discoverers(config: &DriverConfig) -> Vec<Arc<dyn Discoverer>> {
    let spec_dirs = SpecDirDiscoverer::new(config.driver_paths.iter().map(String::as_str))
        .with_request_timeout(config.request_timeout())
        .with_activation(config.verify_activation);
    vec![Arc::new(spec_dirs)]
}

/// Runs the manager until SIGINT or SIGTERM.
pub async fn run_serve(config: VolmanConfig) -> Result<(), VolmanError> {
    info!(
        driver_paths = ?config.driver.driver_paths,
        sync_interval_secs = config.driver.sync_interval_secs,
        "starting volman"
    );
    let cancel = shutdown::install_signal_handler();

    let prometheus = Arc::new(if config.metrics.enabled {
        PrometheusSink::install()?
    } else {
        PrometheusSink::new()
    });
    let sink: Arc<dyn MetricsSink> = prometheus.clone();

    let registry = Arc::new(PluginRegistry::new());
    let claims = Arc::new(ClaimTracker::new());
    let manager = Arc::new(LocalManager::new(registry.clone(), sink).with_claims(claims.clone()));

    let syncer = Syncer::new(
        registry.clone(),
        build_discoverers(&config.driver),
        config.driver.sync_interval(),
    );
    let purger = Purger::new(registry, claims).with_interval(config.driver.purge_interval());
    let supervisor = Supervisor::new()
        .with_member(Arc::new(syncer))
        .with_member(Arc::new(purger));

    let admin_task = config.metrics.enabled.then(|| {
        let addr = format!("{}:{}", config.metrics.bind_address, config.metrics.port);
        let state = AdminState {
            manager: manager.clone(),
            prometheus: prometheus.clone(),
        };
        tokio::spawn(admin::serve_admin(addr, state, cancel.clone()))
    });

    let result = supervisor.run(cancel.clone()).await;
    cancel.cancel();

    if let Some(task) = admin_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "admin endpoint failed"),
            Err(e) => error!(error = %e, "admin endpoint task panicked"),
        }
    }

    match &result {
        Ok(()) => info!("volman stopped"),
        Err(e) => error!(error = %e, "volman stopped with error"),
    }
    result
}

/// Runs one discovery pass and prints the sorted driver names.
pub async fn run_drivers(config: &VolmanConfig) -> Result<(), VolmanError> {
    let registry = Arc::new(PluginRegistry::new());
    let syncer = Syncer::new(
        registry.clone(),
        build_discoverers(&config.driver),
        config.driver.sync_interval(),
    );
    syncer.sync_once().await;

    for name in registry.names() {
        println!("{name}");
    }
    Ok(())
}
