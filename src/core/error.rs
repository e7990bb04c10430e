//! Error types for the auto-save controller.
//!
//! Persistence failures are not listed here: they are the persister's own
//! [`Persist::Error`](super::Persist::Error) type and are only ever handed to
//! the `on_error` hook.

use thiserror::Error;

/// Errors in controller configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The quiet period exceeds the accepted maximum.
    #[error("delay of {delay_ms}ms exceeds maximum of {max_ms}ms")]
    DelayTooLong {
        /// Requested delay.
        delay_ms: u64,
        /// Maximum accepted delay.
        max_ms: u64,
    },

    /// Options could not be parsed.
    #[error("invalid options: {0}")]
    Parse(String),
}

/// Top-level controller errors.
#[derive(Debug, Error)]
pub enum AutoSaveError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The controller was created outside a tokio runtime.
    #[error("no tokio runtime available to drive save timers")]
    NoRuntime,

    /// The controller has been torn down.
    #[error("auto-save controller is torn down")]
    Closed,
}
