// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the volman manager and its plugins.

use thiserror::Error;

/// Failure reported by a [`Plugin`](crate::Plugin) call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    /// The driver reported a failure whose description may be shown to end users.
    #[error("{safe_description}")]
    Safe { safe_description: String },

    /// The driver could not be reached or answered with an unreadable body.
    #[error("driver transport error: {0}")]
    Transport(String),

    /// The driver reached a decision and reported a failure.
    #[error("driver error: {0}")]
    Driver(String),
}

/// The primary error type returned by the manager, syncer, purger and supervisor.
#[derive(Debug, Error)]
pub enum VolmanError {
    /// The requested plugin id is absent from the registry.
    #[error("plugin '{plugin_id}' not found in list of known plugins")]
    PluginNotFound { plugin_id: String },

    /// A failure whose description is fit to display to end users.
    #[error("{safe_description}")]
    Safe { safe_description: String },

    /// A plugin call failed without a safe description.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// A discoverer failed for one cycle.
    #[error("discovery failed in {discoverer}: {message}")]
    Discovery { discoverer: String, message: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A supervised background task failed.
    #[error("task {task} failed: {message}")]
    Task { task: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VolmanError {
    /// Returns the user-displayable description, if this error carries one.
    ///
    /// Every other variant should be logged and surfaced to end users as a
    /// generic failure.
    pub fn safe_description(&self) -> Option<&str> {
        match self {
            VolmanError::Safe { safe_description } => Some(safe_description),
            _ => None,
        }
    }

    /// True when the plugin id was not found in the registry.
    pub fn is_lookup(&self) -> bool {
        matches!(self, VolmanError::PluginNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_message_names_the_plugin() {
        let err = VolmanError::PluginNotFound {
            plugin_id: "nfsv3".into(),
        };
        assert_eq!(
            err.to_string(),
            "plugin 'nfsv3' not found in list of known plugins"
        );
        assert!(err.is_lookup());
        assert!(err.safe_description().is_none());
    }

    #[test]
    fn only_safe_errors_expose_a_description() {
        let safe = VolmanError::Safe {
            safe_description: "share unreachable".into(),
        };
        assert_eq!(safe.safe_description(), Some("share unreachable"));

        let transport: VolmanError = PluginError::Transport("connection refused".into()).into();
        assert!(transport.safe_description().is_none());
        assert_eq!(
            transport.to_string(),
            "driver transport error: connection refused"
        );
    }
}
