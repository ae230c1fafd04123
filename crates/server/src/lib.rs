//! Authoritative simulation core for a multiplayer cell arena.

pub mod actions;
pub mod balance;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod leaderboard;
pub mod movement;
pub mod server;
pub mod spatial;
pub mod view;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use error::CoreError;
pub use server::{run, Rooms, TickKind};
pub use world::Room;
