//! Protocol error types.

use thiserror::Error;

/// Errors raised while accepting values from the transport.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Movement target is not finite: ({0}, {1})")]
    NonFiniteTarget(f64, f64),

    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
