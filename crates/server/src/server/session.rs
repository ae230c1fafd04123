//! Inbound client events.
//!
//! Applied between ticks while the room lock is held.

use crate::actions::{eject_mass, split_player};
use crate::config::{Config, SpawnPlacement};
use crate::entity::{Cell, Player, Viewport, CRUISE_SPEED};
use crate::error::CoreError;
use crate::geometry::{mass_to_radius, uniform_position};
use crate::world::Room;
use protocol::{ClientEvent, Outbound, PlayerId, Role, ServerEvent};
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

impl Room {
    /// Apply one client event and return the events it produced.
    pub fn handle_event(
        &mut self,
        player_id: PlayerId,
        event: ClientEvent,
        config: &Config,
        now: Instant,
    ) -> Result<Vec<Outbound>, CoreError> {
        event.validate()?;
        let mut out = Vec::new();

        match event {
            ClientEvent::Join { name, role } => self.join(player_id, name, role, config, now, &mut out),
            ClientEvent::Heartbeat => {
                self.ensure_known(player_id)?;
                if let Some(player) = self.player_mut(player_id) {
                    player.last_heartbeat = now;
                }
                out.push(Outbound::player(self.id.clone(), player_id, ServerEvent::Pong));
            }
            ClientEvent::Resize { width, height } => {
                self.ensure_known(player_id)?;
                if let Some(player) = self.player_mut(player_id) {
                    player.viewport = Viewport { width, height };
                }
            }
            ClientEvent::Respawn => {
                self.ensure_known(player_id)?;
                self.remove_player(player_id);
                out.push(Outbound::player(self.id.clone(), player_id, ServerEvent::Welcome));
            }
            ClientEvent::Disconnect => self.disconnect(player_id, &mut out)?,
            ClientEvent::Move { target } => {
                self.ensure_known(player_id)?;
                if let Some(player) = self.player_mut(player_id) {
                    player.last_heartbeat = now;
                    player.target = target;
                }
            }
            ClientEvent::Eject => {
                self.ensure_known(player_id)?;
                if self.player_index(player_id).is_some() {
                    eject_mass(self, player_id, config)?;
                }
            }
            ClientEvent::Split { cell_index } => {
                self.ensure_known(player_id)?;
                if self.player_index(player_id).is_some() {
                    split_player(self, player_id, cell_index, &config.player, now)?;
                }
            }
            ClientEvent::Chat { message } => self.chat(player_id, message, config, &mut out)?,
        }

        Ok(out)
    }

    /// A client is known once joined, and stays known after elimination.
    fn ensure_known(&self, player_id: PlayerId) -> Result<(), CoreError> {
        if self.sessions.contains_key(&player_id) || self.player_index(player_id).is_some() {
            Ok(())
        } else {
            Err(CoreError::UnknownPlayer(player_id))
        }
    }

    fn join(
        &mut self,
        player_id: PlayerId,
        name: String,
        role: Role,
        config: &Config,
        now: Instant,
        out: &mut Vec<Outbound>,
    ) {
        if self.player_index(player_id).is_some() {
            info!("Player {} is already in room '{}', kicking", player_id, self.id);
            out.push(Outbound::player(
                self.id.clone(),
                player_id,
                ServerEvent::Kicked {
                    reason: "Player ID is already connected.".to_string(),
                },
            ));
            return;
        }

        let name: String = name.chars().take(config.player.max_nick_length).collect();
        let viewport = Viewport {
            width: config.view.default_width,
            height: config.view.default_height,
        };
        let hue = rand::rng().random_range(0..360);
        let mut player = Player::new(player_id, name.clone(), role, hue, viewport, now);

        if role == Role::Player {
            let mass = config.player.default_mass;
            let radius = mass_to_radius(mass);
            let position = match config.player.spawn_placement {
                SpawnPlacement::Farthest => uniform_position(&self.player_circles(), radius, &self.border),
                SpawnPlacement::Random => self.border.random_position(radius),
            };
            player.add_cell(Cell::new(self.ids.allocate(), mass, position, CRUISE_SPEED));
        }

        self.players.push(player);
        self.sessions.insert(player_id, name.clone());
        info!("Player {} '{}' joined room '{}' as {:?}", player_id, name, self.id, role);

        out.push(Outbound::room(self.id.clone(), ServerEvent::PlayerJoined { name }));
        out.push(Outbound::player(
            self.id.clone(),
            player_id,
            ServerEvent::InitialSetup {
                world_width: self.border.width,
                world_height: self.border.height,
            },
        ));
    }

    fn disconnect(&mut self, player_id: PlayerId, out: &mut Vec<Outbound>) -> Result<(), CoreError> {
        let player = self.remove_player(player_id);
        let session = self.sessions.remove(&player_id);
        let name = match (player, session) {
            (Some(player), _) => player.name,
            (None, Some(name)) => name,
            (None, None) => return Err(CoreError::UnknownPlayer(player_id)),
        };
        info!("Player {} '{}' left room '{}'", player_id, name, self.id);
        out.push(Outbound::room(self.id.clone(), ServerEvent::PlayerLeft { name }));
        Ok(())
    }

    fn chat(
        &mut self,
        player_id: PlayerId,
        message: String,
        config: &Config,
        out: &mut Vec<Outbound>,
    ) -> Result<(), CoreError> {
        let sender = self
            .sessions
            .get(&player_id)
            .cloned()
            .or_else(|| self.player(player_id).map(|player| player.name.clone()))
            .ok_or(CoreError::UnknownPlayer(player_id))?;
        let message: String = message.chars().take(config.server.max_chat_length).collect();

        if config.server.log_chat {
            info!("[CHAT] [{}] {}: {}", self.id, sender, message);
        } else {
            debug!("[CHAT] [{}] {}: {}", self.id, sender, message);
        }
        out.push(Outbound::room(self.id.clone(), ServerEvent::Chat { sender, message }));
        Ok(())
    }
}
