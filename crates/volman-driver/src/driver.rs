// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability interface a volume driver implements.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::wire::{
    CreateRequest, GetRequest, MountRequest, PathRequest, RemoveRequest, UnmountRequest,
    VolumeInfo,
};

/// A volume driver.
///
/// The driver is a black box: it may perform mounts itself or forward every
/// call to a remote process (see [`HttpDriver`](crate::HttpDriver)). Callers
/// run each method inside a tracing span named after the operation.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Capabilities the driver implements, e.g. `["VolumeDriver"]`.
    async fn activate(&self) -> Result<Vec<String>, DriverError>;

    async fn get(&self, request: GetRequest) -> Result<VolumeInfo, DriverError>;

    /// Host path of the volume, if mounted.
    async fn path(&self, request: PathRequest) -> Result<String, DriverError>;

    async fn create(&self, request: CreateRequest) -> Result<(), DriverError>;

    /// Mounts the volume and returns its mountpoint.
    async fn mount(&self, request: MountRequest) -> Result<String, DriverError>;

    async fn unmount(&self, request: UnmountRequest) -> Result<(), DriverError>;

    async fn remove(&self, request: RemoveRequest) -> Result<(), DriverError>;
}
