//! Network-subsystem error type.

use thiserror::Error;

/// Errors produced by `tp-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from '{from}' to '{to}'")]
    NoRoute { from: String, to: String },

    #[error("unknown edge '{0}'")]
    UnknownEdge(String),

    #[error("unknown stop '{0}'")]
    UnknownStop(String),

    #[error("duplicate {what} '{name}'")]
    Duplicate { what: &'static str, name: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
