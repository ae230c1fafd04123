//! Movement engine.
//!
//! Advances player cells toward their target, keeps sibling cells apart while
//! the merge cooldown runs (and fuses them afterwards), and glides ejected mass
//! along its launch heading.

use crate::config::PlayerConfig;
use crate::entity::{Cell, EjectedMass, Player, CRUISE_SPEED};
use crate::geometry::{slow_down, WorldBorder};
use glam::DVec2;
use std::time::Instant;

/// Speed lost per tick by a boosted cell or a gliding blob.
pub const SPEED_DECAY: f64 = 0.5;
/// Distance (plus the cell radius) inside which movement eases off.
pub const ARRIVAL_MARGIN: f64 = 50.0;
/// Sibling cells fuse once closer than their combined radius over this.
pub const MERGE_RATIO: f64 = 1.75;
/// Extra border gap kept by ejected mass.
const EJECT_BORDER_GAP: f64 = 5.0;

/// Advance every cell of `player` by one step.
pub fn move_player(player: &mut Player, config: &PlayerConfig, border: &WorldBorder, now: Instant) {
    let Some(anchor) = player.position else {
        return;
    };
    let target = player.target;
    let in_cooldown = player.in_merge_cooldown(now, config.merge_cooldown());

    let mut i = 0;
    while i < player.cells.len() {
        step_cell(&mut player.cells[i], anchor + target, config);
        i = resolve_cohesion(&mut player.cells, i, in_cooldown);

        let cell = &mut player.cells[i];
        cell.position = border.clamp(cell.position, cell.radius() / 3.0);
        i += 1;
    }

    player.recompute_position();
}

/// Move one cell toward `aim`, the player's position offset by its target.
fn step_cell(cell: &mut Cell, aim: DVec2, config: &PlayerConfig) {
    let heading = aim - cell.position;
    let distance = heading.length();
    let angle = heading.y.atan2(heading.x);

    let slow = if cell.speed <= CRUISE_SPEED {
        slow_down(cell.mass(), config.default_mass, config.slow_base)
    } else {
        1.0
    };

    let mut delta = DVec2::new(angle.cos(), angle.sin()) * cell.speed / slow;
    if cell.speed > CRUISE_SPEED {
        cell.speed = (cell.speed - SPEED_DECAY).max(CRUISE_SPEED);
    }

    let arrival = ARRIVAL_MARGIN + cell.radius();
    if distance < arrival {
        delta *= distance / arrival;
    }

    apply_finite(&mut cell.position, delta);
}

/// Repel or fuse cell `i` with its overlapping siblings.
///
/// Returns the index of cell `i` after any absorbed siblings were removed.
pub fn resolve_cohesion(cells: &mut Vec<Cell>, mut i: usize, in_cooldown: bool) -> usize {
    let mut j = 0;
    while j < cells.len() {
        if j == i {
            j += 1;
            continue;
        }

        let (a, b) = (cells[i].circle(), cells[j].circle());
        let distance = a.center.distance(b.center);
        let reach = a.radius + b.radius;

        if distance < reach {
            if in_cooldown {
                let other = b.center;
                let position = &mut cells[i].position;
                position.x += nudge(position.x, other.x);
                position.y += nudge(position.y, other.y);
            } else if distance < reach / MERGE_RATIO {
                let absorbed = cells.remove(j);
                if j < i {
                    i -= 1;
                }
                cells[i].add_mass(absorbed.mass());
                continue;
            }
        }
        j += 1;
    }
    i
}

/// One unit away from `other` along a single axis.
#[inline]
fn nudge(own: f64, other: f64) -> f64 {
    if own < other {
        -1.0
    } else if own > other {
        1.0
    } else {
        0.0
    }
}

/// Glide a blob along its heading while it still has speed.
pub fn move_ejected(mass: &mut EjectedMass, border: &WorldBorder) {
    if !mass.is_moving() {
        return;
    }

    let angle = mass.direction.y.atan2(mass.direction.x);
    let delta = DVec2::new(angle.cos(), angle.sin()) * mass.speed;
    mass.speed = (mass.speed - SPEED_DECAY).max(0.0);

    apply_finite(&mut mass.position, delta);
    mass.position = border.clamp(mass.position, mass.radius + EJECT_BORDER_GAP);
}

#[inline]
fn apply_finite(position: &mut DVec2, delta: DVec2) {
    if delta.x.is_finite() {
        position.x += delta.x;
    }
    if delta.y.is_finite() {
        position.y += delta.y;
    }
}
