//! Error handling for the mock broker
//!
//! Simulated business outcomes (no-fill, cancel reject, unknown order id)
//! are reported through `OpenOutcome` / `CancelOutcome`. This type only
//! covers invalid input and environment faults.

use crate::config::ConfigError;
use std::io;
use thiserror::Error;

/// Main error type for the mock broker
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Caller supplied a value the simulator cannot price or record
    #[error("Invalid argument '{0}': {1}")]
    InvalidArgument(String, String), // (parameter_name, reason)

    /// `start()` was called with no tokio runtime in scope
    #[error("No tokio runtime available to drive the tick loop")]
    RuntimeUnavailable,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl BrokerError {
    /// Shorthand for an `InvalidArgument` error
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        BrokerError::InvalidArgument(param.into(), reason.into())
    }

    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            BrokerError::Config(ConfigError::FileRead(path)) => {
                format!(
                    "Configuration file could not be read: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: broker-sim init\n\
                    2. Adjust broker.toml if needed\n\
                    3. Try again",
                    path
                )
            }
            BrokerError::RuntimeUnavailable => {
                format!(
                    "{}\n\n\
                    💡 Call start() from inside an async context (e.g. #[tokio::main])",
                    self
                )
            }
            _ => self.to_string(),
        }
    }

    /// The simulator never retries internally; retry policy belongs to the caller
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BrokerError::InvalidArgument(_, _) => "validation",
            BrokerError::RuntimeUnavailable => "runtime",
            BrokerError::Config(_) => "config",
            BrokerError::Serialization(_) => "serialization",
            BrokerError::Io(_) => "io",
        }
    }
}

impl From<io::Error> for BrokerError {
    fn from(err: io::Error) -> Self {
        BrokerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Serialization(format!("JSON error: {}", err))
    }
}

/// Result type alias using BrokerError
pub type BrokerResult<T> = Result<T, BrokerError>;
