// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery strategies that produce candidate plugin sets.

use async_trait::async_trait;

use crate::error::VolmanError;
use crate::traits::plugin::PluginMap;

/// Finds installed drivers and builds plugin handles for them.
///
/// Implementations must not touch the registry. A malformed entry is logged
/// and skipped rather than failing the whole pass; an `Err` means this
/// discoverer produced nothing usable for the cycle. Calling `discover` twice
/// with no environment change yields equivalent maps.
#[async_trait]
pub trait Discoverer: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Produces a fresh name-to-plugin mapping.
    async fn discover(&self) -> Result<PluginMap, VolmanError>;
}
