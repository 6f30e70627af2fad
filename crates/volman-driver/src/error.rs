// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver call failures and their legacy wire encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use volman_core::PluginError;

/// Failure of a single driver operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// A failure whose description may be shown to end users.
    #[error("{safe_description}")]
    Safe { safe_description: String },

    /// The driver reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The driver could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request or response body could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Wire form of a safe error, carried as JSON text inside `Err`.
#[derive(Debug, Serialize, Deserialize)]
struct SafeErrorBody {
    #[serde(rename = "SafeDescription")]
    safe_description: String,
}

impl DriverError {
    /// Create a [`DriverError::Safe`].
    pub fn safe(description: impl Into<String>) -> Self {
        Self::Safe {
            safe_description: description.into(),
        }
    }

    /// Create a [`DriverError::Failed`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn failed<E: std::fmt::Display>(e: E) -> Self {
        Self::Failed(e.to_string())
    }

    /// Create a [`DriverError::Transport`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn transport<E: std::fmt::Display>(e: E) -> Self {
        Self::Transport(e.to_string())
    }

    /// Create a [`DriverError::Decode`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Self::Decode(e.to_string())
    }

    /// Encodes this error for a response `Err` field.
    ///
    /// Safe errors become `{"SafeDescription":"..."}` so that a remote client
    /// can tell them apart; everything else is its display text.
    pub fn to_wire(&self) -> String {
        match self {
            DriverError::Safe { safe_description } => {
                serde_json::json!({ "SafeDescription": safe_description }).to_string()
            }
            other => other.to_string(),
        }
    }

    /// Decodes a non-empty response `Err` field.
    pub fn from_wire(err: &str) -> Self {
        match serde_json::from_str::<SafeErrorBody>(err) {
            Ok(body) if !body.safe_description.is_empty() => Self::safe(body.safe_description),
            _ => Self::Failed(err.to_string()),
        }
    }
}

impl From<DriverError> for PluginError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Safe { safe_description } => PluginError::Safe { safe_description },
            DriverError::Failed(message) => PluginError::Driver(message),
            transport @ (DriverError::Transport(_) | DriverError::Decode(_)) => {
                PluginError::Transport(transport.to_string())
            }
        }
    }
}
