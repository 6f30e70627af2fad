// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process volume driver with canned responses.
//!
//! By default every operation succeeds: Activate reports `VolumeDriver`,
//! Mount and Path return `dummy_path`, and Get describes the requested
//! volume at `dummy_path`. Individual operations can be switched to fail.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use volman_driver::wire::{
    CreateRequest, GetRequest, MountRequest, PathRequest, RemoveRequest, UnmountRequest,
    VolumeInfo,
};
use volman_driver::{Driver, DriverError, RouteName, VOLUME_DRIVER_CAPABILITY};

/// Mountpoint returned by a healthy [`FakeDriver`].
pub const DUMMY_PATH: &str = "dummy_path";

/// A scripted volume driver that records each call it receives.
pub struct FakeDriver {
    failures: Mutex<HashMap<RouteName, DriverError>>,
    calls: Mutex<Vec<(RouteName, String)>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes `route` fail with `err` until [`clear_failures`](Self::clear_failures).
    pub fn fail(&self, route: RouteName, err: DriverError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(route, err);
    }

    pub fn clear_failures(&self) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Every call received so far, as (operation, volume name).
    pub fn calls(&self) -> Vec<(RouteName, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls received for `route`.
    pub fn call_count(&self, route: RouteName) -> usize {
        self.calls().iter().filter(|(r, _)| *r == route).count()
    }

    fn record(&self, route: RouteName, name: &str) -> Result<(), DriverError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((route, name.to_string()));
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&route)
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn activate(&self) -> Result<Vec<String>, DriverError> {
        self.record(RouteName::Activate, "")?;
        Ok(vec![VOLUME_DRIVER_CAPABILITY.to_string()])
    }

    async fn get(&self, request: GetRequest) -> Result<VolumeInfo, DriverError> {
        self.record(RouteName::Get, &request.name)?;
        Ok(VolumeInfo {
            name: request.name,
            mountpoint: DUMMY_PATH.to_string(),
        })
    }

    async fn path(&self, request: PathRequest) -> Result<String, DriverError> {
        self.record(RouteName::Path, &request.name)?;
        Ok(DUMMY_PATH.to_string())
    }

    async fn create(&self, request: CreateRequest) -> Result<(), DriverError> {
        self.record(RouteName::Create, &request.name)
    }

    async fn mount(&self, request: MountRequest) -> Result<String, DriverError> {
        self.record(RouteName::Mount, &request.name)?;
        Ok(DUMMY_PATH.to_string())
    }

    async fn unmount(&self, request: UnmountRequest) -> Result<(), DriverError> {
        self.record(RouteName::Unmount, &request.name)
    }

    async fn remove(&self, request: RemoveRequest) -> Result<(), DriverError> {
        self.record(RouteName::Remove, &request.name)
    }
}
