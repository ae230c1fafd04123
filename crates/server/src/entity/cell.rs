//! Player cell.

use crate::geometry::{mass_to_radius, Circle};
use glam::DVec2;
use protocol::EntityId;

/// Speed a cell settles at once its launch boost has worn off.
pub const CRUISE_SPEED: f64 = 6.25;

/// One mass blob controlled by a player.
///
/// Mass and radius are private so the radius can never go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: EntityId,
    mass: f64,
    radius: f64,
    pub position: DVec2,
    pub speed: f64,
}

impl Cell {
    pub fn new(id: EntityId, mass: f64, position: DVec2, speed: f64) -> Self {
        Self {
            id,
            mass,
            radius: mass_to_radius(mass),
            position,
            speed,
        }
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Set the mass and recompute the radius.
    #[inline]
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.radius = mass_to_radius(mass);
    }

    #[inline]
    pub fn add_mass(&mut self, delta: f64) {
        self.set_mass(self.mass + delta);
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_mass_recomputes_radius() {
        let mut cell = Cell::new(1, 10.0, DVec2::ZERO, CRUISE_SPEED);
        assert_eq!(cell.radius(), mass_to_radius(10.0));

        cell.add_mass(26.0);
        assert_eq!(cell.mass(), 36.0);
        assert_eq!(cell.radius(), 40.0);
    }
}
