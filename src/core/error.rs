//! Domain failure kinds that callers need to tell apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A conversion was requested for a code the rate table does not
    /// carry. Never silently defaulted to a factor of 1.
    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    /// The remote store could not be reached or rejected the call.
    /// Triggers the local fallback commit path.
    #[error("remote store unavailable during {operation}: {message}")]
    RemoteUnavailable { operation: String, message: String },

    /// The local vault itself failed. There is no further fallback.
    #[error("local storage error during {operation}: {message}")]
    LocalStorage { operation: String, message: String },

    #[error("rate table rejected: {0}")]
    InvalidRateTable(String),
}

impl Error {
    pub fn remote(operation: &str, err: impl std::fmt::Display) -> Self {
        Error::RemoteUnavailable {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    pub fn local(operation: &str, err: impl std::fmt::Display) -> Self {
        Error::LocalStorage {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
