//! Collision detection and resolution.
//!
//! This module handles what a player cell runs into during a movement tick:
//! - Food and ejected mass (eaten outright)
//! - Viruses (swallowed, then the cell is split)
//! - Other players' cells (eaten only when enveloped)

use crate::config::{Config, PlayerConfig};
use crate::entity::CRUISE_SPEED;
use crate::geometry::Circle;
use crate::world::{compact_marked, Room};
use fixedbitset::FixedBitSet;
use protocol::{EntityId, Outbound, PlayerId, ServerEvent};
use tracing::debug;

/// The eater's radius must exceed the centre distance times this.
pub const ENVELOP_FACTOR: f64 = 1.75;

/// Result of checking two circles against each other.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Combined radius.
    pub reach: f64,
    /// Centre-to-centre distance.
    pub distance: f64,
}

impl Contact {
    /// Exact circle-circle overlap.
    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.distance <= self.reach
    }
}

#[inline]
pub fn check_contact(a: &Circle, b: &Circle) -> Contact {
    Contact {
        reach: a.radius + b.radius,
        distance: a.center.distance(b.center),
    }
}

/// Whether an eater cell consumes a victim cell `distance` away.
#[inline]
pub fn is_kill(eater_mass: f64, eater_radius: f64, victim_mass: f64, distance: f64, eat_ratio: f64) -> bool {
    eater_mass > victim_mass * eat_ratio && eater_radius > distance * ENVELOP_FACTOR
}

/// How far a cell can drift from its indexed position within one tick.
pub fn index_slack(config: &PlayerConfig) -> f64 {
    config.split_speed.max(CRUISE_SPEED) + config.max_cells as f64 * std::f64::consts::SQRT_2
}

/// Resolve everything the cells of `player_id` touch this tick.
///
/// Events for the transport are pushed onto `out`.
pub fn resolve_collisions(room: &mut Room, player_id: PlayerId, config: &Config, out: &mut Vec<Outbound>) {
    let Some(index) = room.player_index(player_id) else {
        return;
    };
    let cell_ids: Vec<EntityId> = room.players[index].cells.iter().map(|cell| cell.id).collect();

    for cell_id in cell_ids {
        resolve_cell(room, player_id, cell_id, config, out);
    }
}

fn resolve_cell(room: &mut Room, player_id: PlayerId, cell_id: EntityId, config: &Config, out: &mut Vec<Outbound>) {
    let Some((circle, mass, cell_index)) = locate(room, player_id, cell_id) else {
        return;
    };

    let mut gained = eat_food(room, &circle);
    gained += eat_ejected(room, player_id, cell_id, &circle, mass, config.player.eat_ratio);

    if swallow_viruses(room, &circle, mass) {
        debug!("Cell {} of player {} hit a virus", cell_id, player_id);
        room.pending_splits.push((player_id, cell_id));
        out.push(Outbound::player(
            room.id.clone(),
            player_id,
            ServerEvent::ForcedVirusSplit { cell_index },
        ));
    }

    if gained > 0.0 {
        credit(room, player_id, cell_id, gained);
    }

    eat_players(room, player_id, cell_id, &config.player, out);
}

/// Live circle, mass and index of a cell, if it still exists.
fn locate(room: &Room, player_id: PlayerId, cell_id: EntityId) -> Option<(Circle, f64, usize)> {
    let player = room.player(player_id)?;
    let index = player.cell_index(cell_id)?;
    let cell = &player.cells[index];
    Some((cell.circle(), cell.mass(), index))
}

fn credit(room: &mut Room, player_id: PlayerId, cell_id: EntityId, mass: f64) {
    let Some(player) = room.player_mut(player_id) else {
        return;
    };
    let Some(index) = player.cell_index(cell_id) else {
        return;
    };
    player.cells[index].add_mass(mass);
    player.mass_total += mass;
}

/// Remove food whose centre lies inside `circle`; returns the mass eaten.
fn eat_food(room: &mut Room, circle: &Circle) -> f64 {
    let mut marked = FixedBitSet::with_capacity(room.food.len());
    let mut gained = 0.0;
    for (i, food) in room.food.iter().enumerate() {
        if circle.contains(food.position) {
            marked.insert(i);
            gained += food.mass;
        }
    }
    compact_marked(&mut room.food, &marked);
    gained
}

/// Remove ejected mass the cell can eat; returns the mass eaten.
///
/// A blob still gliding away from the cell that fired it is skipped.
fn eat_ejected(
    room: &mut Room,
    player_id: PlayerId,
    cell_id: EntityId,
    circle: &Circle,
    mass: f64,
    eat_ratio: f64,
) -> f64 {
    let mut marked = FixedBitSet::with_capacity(room.ejected.len());
    let mut gained = 0.0;
    for (i, blob) in room.ejected.iter().enumerate() {
        let just_fired = blob.owner_id == player_id && blob.source_cell == cell_id && blob.is_moving();
        if just_fired || !circle.contains(blob.position) || mass <= blob.mass * eat_ratio {
            continue;
        }
        marked.insert(i);
        gained += blob.mass;
    }
    compact_marked(&mut room.ejected, &marked);
    gained
}

/// Remove every colliding virus lighter than the cell. Returns whether any went.
fn swallow_viruses(room: &mut Room, circle: &Circle, mass: f64) -> bool {
    let colliding: Vec<usize> = room
        .viruses
        .iter()
        .enumerate()
        .filter(|(_, virus)| circle.contains(virus.position))
        .map(|(i, _)| i)
        .collect();

    let mut marked = FixedBitSet::with_capacity(room.viruses.len());
    for i in colliding {
        if mass > room.viruses[i].mass {
            marked.insert(i);
        }
    }
    let swallowed = marked.count_ones(..) > 0;
    compact_marked(&mut room.viruses, &marked);
    swallowed
}

/// Let the cell eat enveloped cells of other players.
fn eat_players(room: &mut Room, player_id: PlayerId, cell_id: EntityId, config: &PlayerConfig, out: &mut Vec<Outbound>) {
    let Some((circle, _, _)) = locate(room, player_id, cell_id) else {
        return;
    };
    let candidates = room.cell_index.query(&circle, index_slack(config));

    for (owner, victim_id) in candidates {
        if owner == player_id {
            continue;
        }
        let Some((eater, eater_mass, _)) = locate(room, player_id, cell_id) else {
            return;
        };
        let Some((victim, victim_mass, victim_index)) = locate(room, owner, victim_id) else {
            continue;
        };
        if victim_mass <= config.min_target_mass {
            continue;
        }

        let contact = check_contact(&eater, &victim);
        if !contact.is_colliding()
            || !is_kill(eater_mass, eater.radius, victim_mass, contact.distance, config.eat_ratio)
        {
            continue;
        }

        consume_cell(room, owner, victim_index, victim_mass, out);
        credit(room, player_id, cell_id, victim_mass);
        debug!(
            "Player {} ate cell {} ({:.1}) of player {}",
            player_id, victim_id, victim_mass, owner
        );
    }
}

/// Remove a victim cell; a victim left without cells leaves the room.
fn consume_cell(room: &mut Room, owner: PlayerId, cell_index: usize, mass: f64, out: &mut Vec<Outbound>) {
    let Some(index) = room.player_index(owner) else {
        return;
    };
    let victim = &mut room.players[index];
    victim.cells.remove(cell_index);

    if victim.cells.is_empty() {
        let victim = room.players.remove(index);
        debug!("Player {} '{}' was eliminated", victim.id, victim.name);
        out.push(Outbound::room(
            room.id.clone(),
            ServerEvent::PlayerEliminated { name: victim.name },
        ));
        out.push(Outbound::player(room.id.clone(), victim.id, ServerEvent::Died));
    } else {
        victim.mass_total -= mass;
        victim.recompute_position();
    }
}
