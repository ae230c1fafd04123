//! Client -> core events.

use crate::{PlayerId, Position, ProtocolError, Role, RoomId};

/// An event received from a connected client, already decoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Join the room with a display name.
    Join { name: String, role: Role },
    /// Liveness ping.
    Heartbeat,
    /// Client window size changed.
    Resize { width: f64, height: f64 },
    /// Drop the current player record; a fresh join follows.
    Respawn,
    /// Connection closed.
    Disconnect,
    /// Mouse target, relative to the player's position.
    Move { target: Position },
    /// Fire mass (W key).
    Eject,
    /// Split one cell, or every cell when `cell_index` is None.
    Split { cell_index: Option<usize> },
    /// Pre-sanitized chat line.
    Chat { message: String },
}

impl ClientEvent {
    /// Basic sanity checks on client supplied values.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientEvent::Resize { width, height } => {
                let valid = width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0;
                if valid {
                    Ok(())
                } else {
                    Err(ProtocolError::InvalidViewport {
                        width: *width,
                        height: *height,
                    })
                }
            }
            ClientEvent::Move { target } if !target.is_finite() => {
                Err(ProtocolError::NonFiniteTarget(target.x, target.y))
            }
            _ => Ok(()),
        }
    }
}

/// A client event addressed to a room, as handed over by the transport.
#[derive(Debug, Clone)]
pub struct RoomCommand {
    pub room: RoomId,
    pub player: PlayerId,
    pub event: ClientEvent,
}

impl RoomCommand {
    pub fn new(room: impl Into<RoomId>, player: PlayerId, event: ClientEvent) -> Self {
        Self {
            room: room.into(),
            player,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_finite_target() {
        let event = ClientEvent::Move {
            target: Position::new(f64::NAN, 3.0),
        };
        assert!(matches!(event.validate(), Err(ProtocolError::NonFiniteTarget(..))));
    }

    #[test]
    fn test_validate_viewport() {
        assert!(ClientEvent::Resize { width: 1280.0, height: 720.0 }.validate().is_ok());
        assert!(ClientEvent::Resize { width: 0.0, height: 720.0 }.validate().is_err());
        assert!(ClientEvent::Resize { width: f64::INFINITY, height: 720.0 }.validate().is_err());
    }

    #[test]
    fn test_validate_passes_plain_events() {
        assert!(ClientEvent::Eject.validate().is_ok());
        assert!(ClientEvent::Split { cell_index: Some(2) }.validate().is_ok());
    }
}
