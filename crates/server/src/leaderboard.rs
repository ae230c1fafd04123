//! Leaderboard ranking and passive mass decay.

use crate::config::PlayerConfig;
use crate::entity::Player;
use crate::world::Room;
use protocol::LeaderboardEntry;

/// Number of players shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Recompute the room leaderboard.
///
/// Returns `true` (and raises `leaderboard_changed`) only when membership or
/// order of the top entries differs from the previous ranking.
pub fn update_leaderboard(room: &mut Room) -> bool {
    let mut ranked: Vec<&Player> = room.players.iter().collect();
    ranked.sort_by(|a, b| b.mass_total.total_cmp(&a.mass_total));

    let top: Vec<LeaderboardEntry> = ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .filter(|player| player.is_active())
        .map(|player| LeaderboardEntry {
            id: player.id,
            name: player.name.clone(),
        })
        .collect();

    let changed = top.len() != room.leaderboard.len()
        || top
            .iter()
            .zip(&room.leaderboard)
            .any(|(new, old)| new.id != old.id);

    if changed {
        room.leaderboard = top;
        room.leaderboard_changed = true;
    }
    changed
}

/// Shrink every cell by the configured per-mille rate.
///
/// Cells near the default mass and players below the loss floor are spared.
pub fn apply_decay(room: &mut Room, config: &PlayerConfig) {
    let keep = 1.0 - config.mass_loss_rate / 1000.0;
    for player in room.players.iter_mut() {
        for cell in player.cells.iter_mut() {
            let decayed = cell.mass() * keep;
            if decayed > config.default_mass && player.mass_total > config.min_mass_loss {
                player.mass_total -= cell.mass() - decayed;
                cell.set_mass(decayed);
            }
        }
    }
}
