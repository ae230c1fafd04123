//! Ejected mass.

use crate::geometry::mass_to_radius;
use glam::DVec2;
use protocol::{EntityId, PlayerId};

/// A blob fired by a player cell.
///
/// It glides along `direction` while `speed` decays, then sits still.
#[derive(Debug, Clone, PartialEq)]
pub struct EjectedMass {
    pub id: EntityId,
    pub owner_id: PlayerId,
    /// Cell that fired the blob.
    pub source_cell: EntityId,
    pub mass: f64,
    pub hue: u16,
    pub direction: DVec2,
    pub position: DVec2,
    pub radius: f64,
    pub speed: f64,
}

impl EjectedMass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        owner_id: PlayerId,
        source_cell: EntityId,
        mass: f64,
        hue: u16,
        direction: DVec2,
        position: DVec2,
        speed: f64,
    ) -> Self {
        Self {
            id,
            owner_id,
            source_cell,
            mass,
            hue,
            direction,
            position,
            radius: mass_to_radius(mass),
            speed,
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.speed > 0.0
    }
}
