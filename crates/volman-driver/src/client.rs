// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client speaking the driver protocol.
//!
//! [`HttpDriver`] implements [`Driver`] by calling a remote driver process
//! through the route table. The HTTP status of every answer is ignored; the
//! body is decoded as the operation's response and its `Err` mapped back to a
//! [`DriverError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::driver::Driver;
use crate::error::DriverError;
use crate::routes::{route, RouteName};
use crate::wire::{
    ActivateResponse, CreateRequest, ErrorResponse, GetRequest, GetResponse, MountRequest,
    MountResponse, PathRequest, PathResponse, RemoveRequest, UnmountRequest, VolumeInfo,
    WireResponse,
};

/// Remote driver reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDriver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDriver {
    /// Creates a client for the driver listening at `base_url`.
    ///
    /// Without a `timeout` the only deadline is whatever the transport
    /// itself enforces.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, DriverError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DriverError::transport)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<Req, Resp>(
        &self,
        name: RouteName,
        request: Option<&Req>,
    ) -> Result<Resp::Payload, DriverError>
    where
        Req: Serialize + Sync,
        Resp: WireResponse,
    {
        let route = route(name);
        let url = format!("{}{}", self.base_url, route.path);

        let mut builder = self.client.request(route.method.clone(), &url);
        if let Some(request) = request {
            builder = builder.json(request);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(operation = %name, url = %url, error = %e, "driver request failed");
            DriverError::transport(e)
        })?;

        let status = response.status();
        debug!(operation = %name, status = %status, "driver response received");

        let body = response.text().await.map_err(DriverError::transport)?;
        let decoded: Resp = serde_json::from_str(&body).map_err(|e| {
            warn!(operation = %name, status = %status, error = %e, "undecodable driver response");
            DriverError::decode(e)
        })?;
        decoded.into_result()
    }
}

#[async_trait]
impl Driver for HttpDriver {
    async fn activate(&self) -> Result<Vec<String>, DriverError> {
        self.call::<(), ActivateResponse>(RouteName::Activate, None)
            .await
    }

    async fn get(&self, request: GetRequest) -> Result<VolumeInfo, DriverError> {
        self.call::<_, GetResponse>(RouteName::Get, Some(&request))
            .await
    }

    async fn path(&self, request: PathRequest) -> Result<String, DriverError> {
        self.call::<_, PathResponse>(RouteName::Path, Some(&request))
            .await
    }

    async fn create(&self, request: CreateRequest) -> Result<(), DriverError> {
        self.call::<_, ErrorResponse>(RouteName::Create, Some(&request))
            .await
    }

    async fn mount(&self, request: MountRequest) -> Result<String, DriverError> {
        self.call::<_, MountResponse>(RouteName::Mount, Some(&request))
            .await
    }

    async fn unmount(&self, request: UnmountRequest) -> Result<(), DriverError> {
        self.call::<_, ErrorResponse>(RouteName::Unmount, Some(&request))
            .await
    }

    async fn remove(&self, request: RemoveRequest) -> Result<(), DriverError> {
        self.call::<_, ErrorResponse>(RouteName::Remove, Some(&request))
            .await
    }
}
