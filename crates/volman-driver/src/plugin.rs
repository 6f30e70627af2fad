// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter presenting a [`Driver`] as a manager-facing [`Plugin`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info_span, Instrument};
use volman_core::{MountConfig, MountResponse, Plugin, PluginError, PluginSpec};

use crate::driver::Driver;
use crate::wire::{MountRequest, UnmountRequest};

/// A registered plugin backed by a volume driver.
pub struct DriverPlugin {
    spec: PluginSpec,
    driver: Arc<dyn Driver>,
}

impl DriverPlugin {
    pub fn new(spec: PluginSpec, driver: Arc<dyn Driver>) -> Self {
        Self { spec, driver }
    }
}

impl std::fmt::Debug for DriverPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverPlugin")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Plugin for DriverPlugin {
    fn spec(&self) -> PluginSpec {
        self.spec.clone()
    }

    async fn mount(
        &self,
        volume_id: &str,
        config: &MountConfig,
    ) -> Result<MountResponse, PluginError> {
        let request = MountRequest {
            name: volume_id.to_string(),
            opts: config.clone(),
        };
        let mountpoint = self
            .driver
            .mount(request)
            .instrument(info_span!("driver-mount", driver = %self.spec.name))
            .await?;
        debug!(volume_id, mountpoint = %mountpoint, "driver mounted volume");
        Ok(MountResponse { path: mountpoint })
    }

    async fn unmount(&self, volume_id: &str) -> Result<(), PluginError> {
        self.driver
            .unmount(UnmountRequest {
                name: volume_id.to_string(),
            })
            .instrument(info_span!("driver-unmount", driver = %self.spec.name))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use crate::error::DriverError;
    use crate::wire::{
        CreateRequest, GetRequest, PathRequest, RemoveRequest, VolumeInfo,
    };

    #[derive(Default)]
    struct RecordingDriver {
        mounts: Mutex<Vec<MountRequest>>,
        unmount_error: Option<DriverError>,
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn activate(&self) -> Result<Vec<String>, DriverError> {
            Ok(vec!["VolumeDriver".into()])
        }
        async fn get(&self, request: GetRequest) -> Result<VolumeInfo, DriverError> {
            Ok(VolumeInfo {
                name: request.name,
                mountpoint: String::new(),
            })
        }
        async fn path(&self, _: PathRequest) -> Result<String, DriverError> {
            Ok(String::new())
        }
        async fn create(&self, _: CreateRequest) -> Result<(), DriverError> {
            Ok(())
        }
        async fn mount(&self, request: MountRequest) -> Result<String, DriverError> {
            let path = format!("/mnt/{}", request.name);
            self.mounts.lock().unwrap().push(request);
            Ok(path)
        }
        async fn unmount(&self, _: UnmountRequest) -> Result<(), DriverError> {
            match &self.unmount_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
        async fn remove(&self, _: RemoveRequest) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn mount_forwards_volume_and_options() {
        let driver = Arc::new(RecordingDriver::default());
        let plugin = DriverPlugin::new(PluginSpec::local("fake"), driver.clone());

        let mut config = MountConfig::new();
        config.insert("uid".into(), serde_json::json!(1000));
        let response = plugin.mount("vol1", &config).await.unwrap();

        assert_eq!(response.path, "/mnt/vol1");
        let mounts = driver.mounts.lock().unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].name, "vol1");
        assert_eq!(mounts[0].opts["uid"], 1000);
    }

    #[tokio::test]
    async fn unmount_maps_safe_errors() {
        let driver = Arc::new(RecordingDriver {
            unmount_error: Some(DriverError::safe("volume still in use")),
            ..Default::default()
        });
        let plugin = DriverPlugin::new(PluginSpec::local("fake"), driver);

        let err = plugin.unmount("vol1").await.unwrap_err();
        assert_eq!(
            err,
            PluginError::Safe {
                safe_description: "volume still in use".into()
            }
        );
    }

    #[tokio::test]
    async fn plugins_without_enumeration_report_no_volumes() {
        let plugin = DriverPlugin::new(
            PluginSpec::remote("fake", "http://127.0.0.1:7589"),
            Arc::new(RecordingDriver::default()),
        );
        assert!(plugin.list_volumes().await.unwrap().is_empty());
        assert_eq!(plugin.spec().address.as_deref(), Some("http://127.0.0.1:7589"));
    }
}
