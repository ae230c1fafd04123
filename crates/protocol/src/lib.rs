//! Shared interface crate for the arena simulation core.
//!
//! This crate contains:
//! - Inbound session events the core reacts to
//! - Outbound events the core emits for broadcast
//! - Shared types (Color, Role, ids, positions)
//!
//! Wire encoding is the transport's business; nothing here knows about bytes.

mod error;
pub mod events;

pub use error::ProtocolError;
pub use events::*;

use std::str::FromStr;

/// Identifier assigned to a connection by the transport.
pub type PlayerId = u32;

/// Identifier of a simulated entity (cell, food, virus, ejected mass).
pub type EntityId = u32;

/// Room name as supplied on connect.
pub type RoomId = String;

/// Represents a 2D world position using glam's DVec2.
pub type Position = glam::DVec2;

/// RGB color used for virus styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(input: &str) -> Result<Self, ProtocolError> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ProtocolError::InvalidColor(input.to_string()));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map_err(|_| ProtocolError::InvalidColor(input.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Whether a connection plays or only watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Player,
    Spectator,
}

impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Role::Player),
            "spectator" | "spectate" => Ok(Role::Spectator),
            other => Err(ProtocolError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#33ff33").unwrap(), Color::new(0x33, 0xff, 0x33));
        assert_eq!(Color::from_hex("19D119").unwrap(), Color::new(0x19, 0xd1, 0x19));
    }

    #[test]
    fn test_color_from_hex_rejects_garbage() {
        assert!(Color::from_hex("#33ff3").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
        assert!(Color::from_hex("#33ff33aa").is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("player".parse::<Role>().unwrap(), Role::Player);
        assert_eq!("spectator".parse::<Role>().unwrap(), Role::Spectator);
        assert!("admin".parse::<Role>().is_err());
    }
}
