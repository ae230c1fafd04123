//! Core error types.

use protocol::{PlayerId, ProtocolError, RoomId};
use thiserror::Error;

/// Errors surfaced while applying inbound events or loading configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown room: {0}")]
    UnknownRoom(RoomId),

    #[error("Player {0} is not in the room")]
    UnknownPlayer(PlayerId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
