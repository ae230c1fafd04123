//! Population balancer.
//!
//! Keeps the total mass in a room (food plus players) near the configured
//! target and tops viruses up to their cap. Runs on the rules tick.

use crate::config::Config;
use crate::world::Room;
use tracing::debug;

/// What one balancing pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    pub food_added: usize,
    pub food_removed: usize,
    pub viruses_added: usize,
}

/// Food count change for the current room state: positive adds, negative removes.
pub fn food_delta(room: &Room, config: &Config) -> i64 {
    let food_count = room.food.len() as i64;
    let player_mass: f64 = room.players.iter().map(|player| player.mass_total).sum();
    let total = food_count as f64 * config.food.mass + player_mass;

    let deficit = config.world.target_mass - total;
    let headroom = config.food.max_amount as i64 - food_count;
    let food_diff = (deficit / config.food.mass).trunc() as i64 - headroom;

    let to_add = food_diff.min(headroom);
    let to_remove = -food_diff.max(headroom);
    if to_add > 0 {
        to_add
    } else if to_remove > 0 {
        -to_remove
    } else {
        0
    }
}

/// Run one balancing pass over `room`.
pub fn balance(room: &mut Room, config: &Config) -> BalanceReport {
    let mut report = BalanceReport::default();

    let delta = food_delta(room, config);
    if delta > 0 {
        let count = (delta as usize).min(config.food.spawn_amount);
        room.add_food(count, &config.food);
        report.food_added = count;
    } else if delta < 0 {
        let count = (delta.unsigned_abs() as usize)
            .min(config.food.remove_amount)
            .min(room.food.len());
        room.remove_food(count);
        report.food_removed = count;
    }

    let missing = config.virus.max_amount.saturating_sub(room.viruses.len());
    if missing > 0 {
        room.add_viruses(missing, &config.virus);
        report.viruses_added = missing;
    }

    if report != BalanceReport::default() {
        debug!(
            "Room '{}' balanced: +{} -{} food, +{} viruses ({} food, {} viruses)",
            room.id,
            report.food_added,
            report.food_removed,
            report.viruses_added,
            room.food.len(),
            room.viruses.len()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FoodConfig;
    use crate::entity::{Cell, Player, Viewport, CRUISE_SPEED};
    use glam::DVec2;
    use protocol::Role;
    use std::time::Instant;

    fn room(config: &Config) -> Room {
        Room::new("balance", config, config.virus.style().unwrap())
    }

    fn heavy_player(mass: f64) -> Player {
        let mut player = Player::new(
            1,
            "heavy".to_string(),
            Role::Player,
            0,
            Viewport { width: 1920.0, height: 1080.0 },
            Instant::now(),
        );
        player.add_cell(Cell::new(1, mass, DVec2::new(500.0, 500.0), CRUISE_SPEED));
        player
    }

    #[test]
    fn test_empty_room_fills_to_cap() {
        let mut config = Config::default();
        config.food = FoodConfig {
            uniform: false,
            ..FoodConfig::default()
        };
        let mut room = room(&config);

        let report = balance(&mut room, &config);
        assert_eq!(report.food_added, 1000);
        assert_eq!(room.food.len(), config.food.max_amount);
        assert_eq!(room.viruses.len(), config.virus.max_amount);

        // A full room stays full, and never goes above the cap.
        let report = balance(&mut room, &config);
        assert_eq!(report, BalanceReport::default());
        assert_eq!(room.food.len(), config.food.max_amount);
    }

    #[test]
    fn test_spawn_amount_limits_one_pass() {
        let mut config = Config::default();
        config.food.spawn_amount = 40;
        config.food.max_amount = 100;
        let mut room = room(&config);

        balance(&mut room, &config);
        assert_eq!(room.food.len(), 40);
        balance(&mut room, &config);
        balance(&mut room, &config);
        assert_eq!(room.food.len(), 100);
    }

    #[test]
    fn test_heavy_players_crowd_out_excess_food() {
        let mut config = Config::default();
        config.world.target_mass = 100.0;
        config.food.max_amount = 10;
        config.food.uniform = false;
        let mut room = room(&config);
        room.add_food(25, &config.food);
        room.players.push(heavy_player(200.0));

        assert_eq!(food_delta(&room, &config), -15);
        let report = balance(&mut room, &config);
        assert_eq!(report.food_removed, 15);
        assert_eq!(room.food.len(), 10);
    }

    #[test]
    fn test_never_negative() {
        let mut config = Config::default();
        config.world.target_mass = 0.0;
        config.food.max_amount = 0;
        config.food.remove_amount = 1000;
        config.food.uniform = false;
        let mut room = room(&config);
        room.add_food(5, &config.food);
        room.players.push(heavy_player(5000.0));

        balance(&mut room, &config);
        assert!(room.food.is_empty());
        balance(&mut room, &config);
        assert!(room.food.is_empty());
    }

    #[test]
    fn test_viruses_topped_up_not_exceeded() {
        let mut config = Config::default();
        config.virus.max_amount = 7;
        let mut room = room(&config);
        room.add_viruses(3, &config.virus);

        let report = balance(&mut room, &config);
        assert_eq!(report.viruses_added, 4);
        assert_eq!(room.viruses.len(), 7);
        assert_eq!(balance(&mut room, &config).viruses_added, 0);
    }
}
