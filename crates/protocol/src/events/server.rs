//! Core -> client events.

use crate::{Color, EntityId, PlayerId, Position, RoomId};

/// A single cell as seen by a viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub id: EntityId,
    pub position: Position,
    pub mass: f64,
    pub radius: f64,
}

/// A player with at least one cell inside the viewer's viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    /// Set on the viewer's own record.
    pub is_self: bool,
    pub name: String,
    pub position: Position,
    /// Total mass rounded to the nearest unit.
    pub mass_total: u64,
    pub hue: u16,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodView {
    pub id: EntityId,
    pub position: Position,
    pub radius: f64,
    pub hue: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MassView {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub position: Position,
    pub radius: f64,
    pub mass: f64,
    pub hue: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirusView {
    pub id: EntityId,
    pub position: Position,
    pub radius: f64,
    pub mass: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

/// Everything one viewer can see this publish tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldSnapshot {
    pub cells: Vec<PlayerView>,
    pub food: Vec<FoodView>,
    pub mass: Vec<MassView>,
    pub viruses: Vec<VirusView>,
}

/// A leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub name: String,
}

/// Events emitted by the simulation core.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Sent to a player after a successful join.
    InitialSetup { world_width: f64, world_height: f64 },
    PlayerJoined { name: String },
    PlayerLeft { name: String },
    PlayerEliminated { name: String },
    /// Sent to a player whose last cell was eaten.
    Died,
    WorldSnapshot(WorldSnapshot),
    LeaderboardUpdate {
        player_count: usize,
        entries: Vec<LeaderboardEntry>,
    },
    /// The consumer's cell at `cell_index` hit a virus and was split.
    ForcedVirusSplit { cell_index: usize },
    /// The transport should close the connection after delivering this.
    Kicked { reason: String },
    Pong,
    /// Reply to a respawn request; the client is expected to join again.
    Welcome,
    Chat { sender: String, message: String },
}

/// Who an outbound event is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every connection bound to the room.
    Room,
    /// A single connection.
    Player(PlayerId),
}

/// An event ready to hand to the broadcast collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub room: RoomId,
    pub target: Target,
    pub event: ServerEvent,
}

impl Outbound {
    /// Room-wide event.
    pub fn room(room: impl Into<RoomId>, event: ServerEvent) -> Self {
        Self {
            room: room.into(),
            target: Target::Room,
            event,
        }
    }

    /// Event for one player.
    pub fn player(room: impl Into<RoomId>, player: PlayerId, event: ServerEvent) -> Self {
        Self {
            room: room.into(),
            target: Target::Player(player),
            event,
        }
    }
}
