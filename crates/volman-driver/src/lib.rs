// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volume driver wire protocol.
//!
//! A driver process serves seven operations over HTTP using a fixed route
//! table and a JSON contract in which failures travel inside the response
//! body's `Err` field; the HTTP status is always 200. This crate provides
//! both sides of that contract:
//!
//! - [`driver_router`] wraps any [`Driver`] in an axum router.
//! - [`HttpDriver`] implements [`Driver`] by calling a remote router.
//! - [`DriverPlugin`] adapts a [`Driver`] into a manager-facing plugin.
//! - [`SpecDirDiscoverer`] finds drivers through plugin spec files.
//!
//! Internally every driver call yields a `Result`; the legacy `Err`-string
//! shape exists only in [`wire`].

pub mod client;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod plugin;
pub mod routes;
pub mod server;
pub mod wire;

pub use client::HttpDriver;
pub use discovery::SpecDirDiscoverer;
pub use driver::Driver;
pub use error::DriverError;
pub use plugin::DriverPlugin;
pub use routes::{route, routes, Route, RouteName};
pub use server::driver_router;
pub use wire::{
    ActivateResponse, CreateRequest, ErrorResponse, GetRequest, GetResponse, MountRequest,
    MountResponse, PathRequest, PathResponse, RemoveRequest, UnmountRequest, VolumeInfo,
    WireResponse,
};

/// Capability string a volume driver advertises from Activate.
pub const VOLUME_DRIVER_CAPABILITY: &str = "VolumeDriver";
