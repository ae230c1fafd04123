//! Player actions: splitting and firing mass.

use crate::config::{Config, PlayerConfig};
use crate::entity::{Cell, EjectedMass, Player};
use crate::error::CoreError;
use crate::world::{IdAllocator, Room};
use protocol::PlayerId;
use std::time::Instant;
use tracing::debug;

/// With no fire quantum configured, cells at least this heavy fire a tenth of their mass.
const FRACTION_EJECT_MIN_MASS: f64 = 20.0;
const FRACTION_EJECT_SHARE: f64 = 0.1;

/// Split one cell of `player_id` (or all of them) in half.
pub fn split_player(
    room: &mut Room,
    player_id: PlayerId,
    cell_index: Option<usize>,
    config: &PlayerConfig,
    now: Instant,
) -> Result<usize, CoreError> {
    let Room { players, ids, .. } = room;
    let player = players
        .iter_mut()
        .find(|player| player.id == player_id)
        .ok_or(CoreError::UnknownPlayer(player_id))?;
    Ok(split_cells(player, ids, cell_index, config, now))
}

/// Split the cell at `cell_index`, or every current cell when `None`.
///
/// Returns how many new cells were created.
pub fn split_cells(
    player: &mut Player,
    ids: &mut IdAllocator,
    cell_index: Option<usize>,
    config: &PlayerConfig,
    now: Instant,
) -> usize {
    let min_mass = config.default_mass * 2.0;
    if player.cells.len() >= config.max_cells || player.mass_total < min_mass {
        return 0;
    }

    let targets = match cell_index {
        Some(index) => index..(index + 1).min(player.cells.len()),
        None => 0..player.cells.len(),
    };

    let mut created = 0;
    for index in targets {
        if player.cells.len() >= config.max_cells {
            break;
        }
        let cell = &mut player.cells[index];
        if cell.mass() < min_mass {
            continue;
        }
        cell.set_mass(cell.mass() / 2.0);
        let half = Cell::new(ids.allocate(), cell.mass(), cell.position, config.split_speed);
        player.cells.push(half);
        created += 1;
    }

    player.last_split = Some(now);
    debug!("Player {} split into {} cells", player.id, player.cells.len());
    created
}

/// Fire a blob from every eligible cell of `player_id`.
///
/// Returns how many blobs were fired.
pub fn eject_mass(room: &mut Room, player_id: PlayerId, config: &Config) -> Result<usize, CoreError> {
    let Room {
        players,
        ejected,
        ids,
        border,
        ..
    } = room;
    let player = players
        .iter_mut()
        .find(|player| player.id == player_id)
        .ok_or(CoreError::UnknownPlayer(player_id))?;

    let anchor = player.position_or(border.center());
    let quantum = config.eject.fire_food;
    let mut fired = 0;

    for cell in player.cells.iter_mut() {
        let amount = if quantum > 0.0 {
            if cell.mass() < config.player.default_mass + quantum {
                continue;
            }
            quantum
        } else {
            if cell.mass() < FRACTION_EJECT_MIN_MASS {
                continue;
            }
            cell.mass() * FRACTION_EJECT_SHARE
        };

        cell.add_mass(-amount);
        player.mass_total -= amount;
        ejected.push(EjectedMass::new(
            ids.allocate(),
            player.id,
            cell.id,
            amount,
            player.hue,
            anchor - cell.position + player.target,
            cell.position,
            config.eject.speed,
        ));
        fired += 1;
    }

    Ok(fired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Viewport, CRUISE_SPEED};
    use glam::DVec2;
    use protocol::Role;

    fn room_with_player(masses: &[f64]) -> (Room, Config) {
        let config = Config::default();
        let mut room = Room::new("test", &config, config.virus.style().unwrap());
        let mut player = Player::new(
            1,
            "splitter".to_string(),
            Role::Player,
            200,
            Viewport { width: 1920.0, height: 1080.0 },
            Instant::now(),
        );
        for (n, mass) in masses.iter().enumerate() {
            let id = room.ids.allocate();
            let position = DVec2::new(1000.0 + n as f64 * 300.0, 1000.0);
            player.add_cell(Cell::new(id, *mass, position, CRUISE_SPEED));
        }
        room.players.push(player);
        (room, config)
    }

    #[test]
    fn test_eject_scenario() {
        let (mut room, mut config) = room_with_player(&[100.0]);
        config.eject.fire_food = 10.0;
        room.players[0].target = DVec2::new(40.0, 30.0);

        let fired = eject_mass(&mut room, 1, &config).unwrap();
        assert_eq!(fired, 1);

        let player = &room.players[0];
        assert_eq!(player.cells[0].mass(), 90.0);
        assert_eq!(player.mass_total, 90.0);

        let blob = &room.ejected[0];
        assert_eq!(blob.mass, 10.0);
        assert_eq!(blob.position, player.cells[0].position);
        assert_eq!(blob.source_cell, player.cells[0].id);
        assert_eq!(blob.direction, DVec2::new(40.0, 30.0));
        assert_eq!(blob.speed, config.eject.speed);
    }

    #[test]
    fn test_eject_skips_light_cells() {
        let (mut room, config) = room_with_player(&[25.0, 200.0]);
        let fired = eject_mass(&mut room, 1, &config).unwrap();
        assert_eq!(fired, 1);
        assert_eq!(room.players[0].cells[0].mass(), 25.0);
        assert_eq!(room.players[0].cells[1].mass(), 180.0);
        assert_eq!(room.players[0].mass_total, 205.0);
    }

    #[test]
    fn test_eject_fraction_without_quantum() {
        let (mut room, mut config) = room_with_player(&[50.0, 15.0]);
        config.eject.fire_food = 0.0;
        assert_eq!(eject_mass(&mut room, 1, &config).unwrap(), 1);
        assert_eq!(room.ejected[0].mass, 5.0);
        assert_eq!(room.players[0].cells[0].mass(), 45.0);
    }

    #[test]
    fn test_eject_unknown_player() {
        let (mut room, config) = room_with_player(&[100.0]);
        assert!(matches!(
            eject_mass(&mut room, 99, &config),
            Err(CoreError::UnknownPlayer(99))
        ));
    }

    #[test]
    fn test_split_all_cells() {
        let (mut room, config) = room_with_player(&[100.0, 15.0, 40.0]);
        let now = Instant::now();
        let created = split_player(&mut room, 1, None, &config.player, now).unwrap();
        assert_eq!(created, 2);

        let player = &room.players[0];
        assert_eq!(player.cells.len(), 5);
        let masses: Vec<f64> = player.cells.iter().map(Cell::mass).collect();
        assert_eq!(masses, vec![50.0, 15.0, 20.0, 50.0, 20.0]);
        assert_eq!(player.cells[3].position, player.cells[0].position);
        assert_eq!(player.cells[3].speed, config.player.split_speed);
        assert_eq!(player.last_split, Some(now));
        assert!((player.mass_total - player.cell_mass_sum()).abs() < 1e-9);
    }

    #[test]
    fn test_split_designated_cell() {
        let (mut room, config) = room_with_player(&[100.0, 100.0]);
        let created = split_player(&mut room, 1, Some(1), &config.player, Instant::now()).unwrap();
        assert_eq!(created, 1);
        assert_eq!(room.players[0].cells[0].mass(), 100.0);
        assert_eq!(room.players[0].cells[1].mass(), 50.0);
    }

    #[test]
    fn test_split_respects_max_cells() {
        let (mut room, mut config) = room_with_player(&[400.0, 400.0, 400.0]);
        config.player.max_cells = 4;
        split_player(&mut room, 1, None, &config.player, Instant::now()).unwrap();
        assert_eq!(room.players[0].cells.len(), 4);

        let created = split_player(&mut room, 1, None, &config.player, Instant::now()).unwrap();
        assert_eq!(created, 0);
    }

    #[test]
    fn test_split_needs_twice_default_mass() {
        let (mut room, config) = room_with_player(&[15.0]);
        let created = split_player(&mut room, 1, None, &config.player, Instant::now()).unwrap();
        assert_eq!(created, 0);
        assert_eq!(room.players[0].last_split, None);
    }
}
