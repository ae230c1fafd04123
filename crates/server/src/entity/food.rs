//! Food pellet.

use glam::DVec2;
use protocol::EntityId;

/// A pellet eaten by any cell whose circle contains its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: EntityId,
    pub position: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub hue: u16,
}
