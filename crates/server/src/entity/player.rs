//! Player state.

use super::Cell;
use glam::DVec2;
use protocol::{EntityId, PlayerId, Role};
use std::time::{Duration, Instant};

/// Size of the client window, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A connected participant and the cells it controls.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    /// Admin surface lives outside the core; never set here.
    pub admin: bool,
    pub hue: u16,
    /// Mean of the cell positions, `None` while the player has no cells.
    pub position: Option<DVec2>,
    pub mass_total: f64,
    /// Mouse offset relative to `position`.
    pub target: DVec2,
    pub viewport: Viewport,
    pub last_heartbeat: Instant,
    pub last_split: Option<Instant>,
    pub cells: Vec<Cell>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, role: Role, hue: u16, viewport: Viewport, now: Instant) -> Self {
        Self {
            id,
            name,
            role,
            admin: false,
            hue,
            position: None,
            mass_total: 0.0,
            target: DVec2::ZERO,
            viewport,
            last_heartbeat: now,
            last_split: None,
            cells: Vec::new(),
        }
    }

    /// Add a cell and credit its mass.
    pub fn add_cell(&mut self, cell: Cell) {
        self.mass_total += cell.mass();
        self.cells.push(cell);
        self.recompute_position();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.role == Role::Player
    }

    /// Index of the cell with `id`.
    pub fn cell_index(&self, id: EntityId) -> Option<usize> {
        self.cells.iter().position(|cell| cell.id == id)
    }

    pub fn recompute_position(&mut self) {
        if self.cells.is_empty() {
            self.position = None;
            return;
        }
        let sum: DVec2 = self.cells.iter().map(|cell| cell.position).sum();
        self.position = Some(sum / self.cells.len() as f64);
    }

    /// Position used for steering and viewing: the centroid, or `fallback`.
    #[inline]
    pub fn position_or(&self, fallback: DVec2) -> DVec2 {
        self.position.unwrap_or(fallback)
    }

    /// Whether sibling cells still repel each other after the last split.
    pub fn in_merge_cooldown(&self, now: Instant, window: Duration) -> bool {
        self.last_split
            .is_some_and(|at| now.saturating_duration_since(at) < window)
    }

    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > timeout
    }

    pub fn cell_mass_sum(&self) -> f64 {
        self.cells.iter().map(Cell::mass).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CRUISE_SPEED;

    fn player(now: Instant) -> Player {
        Player::new(
            7,
            "blob".to_string(),
            Role::Player,
            120,
            Viewport { width: 1920.0, height: 1080.0 },
            now,
        )
    }

    #[test]
    fn test_position_is_mean_of_cells() {
        let mut p = player(Instant::now());
        assert_eq!(p.position, None);

        p.add_cell(Cell::new(1, 10.0, DVec2::new(0.0, 0.0), CRUISE_SPEED));
        p.add_cell(Cell::new(2, 30.0, DVec2::new(100.0, 50.0), CRUISE_SPEED));
        assert_eq!(p.position, Some(DVec2::new(50.0, 25.0)));
        assert_eq!(p.mass_total, 40.0);
        assert_eq!(p.cell_mass_sum(), 40.0);
        assert_eq!(p.cell_index(2), Some(1));
    }

    #[test]
    fn test_merge_cooldown_window() {
        let now = Instant::now();
        let mut p = player(now);
        let window = Duration::from_secs(15);
        assert!(!p.in_merge_cooldown(now, window));

        p.last_split = Some(now);
        assert!(p.in_merge_cooldown(now + Duration::from_secs(3), window));
        assert!(!p.in_merge_cooldown(now + Duration::from_secs(16), window));
    }

    #[test]
    fn test_stale_heartbeat() {
        let now = Instant::now();
        let p = player(now);
        let timeout = Duration::from_millis(5000);
        assert!(!p.is_stale(now + Duration::from_millis(4000), timeout));
        assert!(p.is_stale(now + Duration::from_millis(5001), timeout));
    }
}
