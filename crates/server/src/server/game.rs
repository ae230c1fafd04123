//! Per-room tick entry points.
//!
//! Each tick runs to completion while the caller holds the room lock and
//! returns the events to send once the lock is released.

use crate::actions::split_cells;
use crate::balance::balance;
use crate::collision::resolve_collisions;
use crate::config::{Config, ServerConfig};
use crate::leaderboard::{apply_decay, update_leaderboard};
use crate::movement::{move_ejected, move_player};
use crate::view::publish;
use crate::world::Room;
use protocol::{Outbound, PlayerId, ServerEvent};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// The three fixed-rate schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Movement, collisions and heartbeat expiry.
    Movement,
    /// Leaderboard, decay and population balancing.
    Rules,
    /// Snapshot publication.
    Publish,
}

impl TickKind {
    pub const ALL: [TickKind; 3] = [TickKind::Movement, TickKind::Rules, TickKind::Publish];

    pub fn period(self, config: &ServerConfig) -> Duration {
        match self {
            TickKind::Movement => config.movement_period(),
            TickKind::Rules => config.rules_period(),
            TickKind::Publish => config.publish_period(),
        }
    }
}

impl fmt::Display for TickKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TickKind::Movement => "movement",
            TickKind::Rules => "rules",
            TickKind::Publish => "publish",
        };
        f.write_str(name)
    }
}

impl Room {
    pub fn run_tick(&mut self, kind: TickKind, config: &Config, now: Instant) -> Vec<Outbound> {
        match kind {
            TickKind::Movement => self.movement_tick(config, now),
            TickKind::Rules => self.rules_tick(config),
            TickKind::Publish => publish(self, &config.view),
        }
    }

    /// Kick stale players, move everyone, resolve collisions and glide mass.
    pub fn movement_tick(&mut self, config: &Config, now: Instant) -> Vec<Outbound> {
        let mut out = Vec::new();
        self.expire_stale(config, now, &mut out);

        let cells: Vec<_> = self
            .players
            .iter()
            .flat_map(|player| player.cells.iter().map(move |cell| (player.id, cell.id, cell.circle())))
            .collect();
        self.cell_index.rebuild(cells);

        let border = self.border;
        let ids: Vec<PlayerId> = self.players.iter().map(|player| player.id).collect();
        for id in ids {
            let Some(player) = self.player_mut(id) else {
                continue;
            };
            move_player(player, &config.player, &border, now);
            resolve_collisions(self, id, config, &mut out);
        }

        self.apply_pending_splits(config, now);

        for blob in self.ejected.iter_mut() {
            move_ejected(blob, &border);
        }
        out
    }

    /// Leaderboard and decay for populated rooms, balancing always.
    pub fn rules_tick(&mut self, config: &Config) -> Vec<Outbound> {
        if !self.players.is_empty() {
            update_leaderboard(self);
            apply_decay(self, &config.player);
        }
        balance(self, config);
        Vec::new()
    }

    /// Remove players whose heartbeat went quiet: notify, then remove.
    fn expire_stale(&mut self, config: &Config, now: Instant, out: &mut Vec<Outbound>) {
        let timeout = config.server.heartbeat_timeout();
        let stale: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|player| player.is_stale(now, timeout))
            .map(|player| player.id)
            .collect();

        for id in stale {
            out.push(Outbound::player(
                self.id.clone(),
                id,
                ServerEvent::Kicked {
                    reason: format!(
                        "Last heartbeat received over {:.1} seconds ago.",
                        timeout.as_secs_f64()
                    ),
                },
            ));
            if let Some(player) = self.remove_player(id) {
                self.sessions.remove(&id);
                info!("Kicked player {} '{}' from room '{}': heartbeat timeout", id, player.name, self.id);
                out.push(Outbound::room(
                    self.id.clone(),
                    ServerEvent::PlayerLeft { name: player.name },
                ));
            }
        }
    }

    /// Split every cell that swallowed a virus this tick.
    fn apply_pending_splits(&mut self, config: &Config, now: Instant) {
        let Room {
            players,
            ids,
            pending_splits,
            ..
        } = self;
        for (player_id, cell_id) in pending_splits.drain(..) {
            let Some(player) = players.iter_mut().find(|player| player.id == player_id) else {
                continue;
            };
            let Some(index) = player.cell_index(cell_id) else {
                continue;
            };
            split_cells(player, ids, Some(index), &config.player, now);
        }
    }
}
