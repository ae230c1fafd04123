//! Game entities.
//!
//! Every entity carries a room-unique id from [`crate::world::IdAllocator`].

mod cell;
mod ejected_mass;
mod food;
mod player;
mod virus;

pub use cell::{Cell, CRUISE_SPEED};
pub use ejected_mass::EjectedMass;
pub use food::Food;
pub use player::{Player, Viewport};
pub use virus::{Virus, VirusStyle};
