//! Configuration errors.

use thiserror::Error;

/// Errors raised while building the launch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid port (expected an integer in 0..=65535)")]
    InvalidPort { key: String, value: String },

    #[error("Cannot determine project root: {0}")]
    RootUnavailable(#[source] std::io::Error),
}
