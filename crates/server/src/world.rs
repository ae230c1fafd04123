//! World state management.
//!
//! A [`Room`] owns every entity of one isolated game instance. All mutation
//! goes through the room while its lock is held.

use crate::config::{Config, FoodConfig, VirusConfig};
use crate::entity::{EjectedMass, Food, Player, Virus, VirusStyle};
use crate::geometry::{mass_to_radius, random_in_range, uniform_position, Circle, WorldBorder};
use crate::spatial::CellIndex;
use fixedbitset::FixedBitSet;
use protocol::{EntityId, LeaderboardEntry, PlayerId, RoomId};
use rand::Rng;
use std::collections::HashMap;

/// Hands out room-unique entity ids. Wraps around and never yields 0.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        if self.next == 0 {
            self.next = 1;
        }
        id
    }
}

/// One isolated game instance.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub border: WorldBorder,
    pub ids: IdAllocator,
    pub players: Vec<Player>,
    pub food: Vec<Food>,
    pub viruses: Vec<Virus>,
    pub ejected: Vec<EjectedMass>,
    /// Connected clients by id, including eliminated ones awaiting respawn.
    pub sessions: HashMap<PlayerId, String>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_changed: bool,
    pub virus_style: VirusStyle,
    /// Cells that swallowed a virus this tick, split after collisions.
    pub pending_splits: Vec<(PlayerId, EntityId)>,
    pub cell_index: CellIndex,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, config: &Config, virus_style: VirusStyle) -> Self {
        let border = WorldBorder::new(config.world.width, config.world.height);
        Self {
            id: id.into(),
            border,
            ids: IdAllocator::default(),
            players: Vec::new(),
            food: Vec::with_capacity(config.food.max_amount),
            viruses: Vec::with_capacity(config.virus.max_amount),
            ejected: Vec::new(),
            sessions: HashMap::new(),
            leaderboard: Vec::new(),
            leaderboard_changed: false,
            virus_style,
            pending_splits: Vec::new(),
            cell_index: CellIndex::new(&border),
        }
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    /// Remove the player record, keeping the session.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.player_index(id)?;
        Some(self.players.remove(index))
    }

    /// No connected clients are left.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.players.is_empty()
    }

    /// Circles of every player cell.
    pub fn player_circles(&self) -> Vec<Circle> {
        self.players
            .iter()
            .flat_map(|player| player.cells.iter().map(|cell| cell.circle()))
            .collect()
    }

    /// Spawn `count` food pellets.
    pub fn add_food(&mut self, count: usize, config: &FoodConfig) {
        let radius = mass_to_radius(config.mass);
        let mut rng = rand::rng();
        let mut occupied: Vec<Circle> = if config.uniform {
            self.food
                .iter()
                .map(|food| Circle::new(food.position, food.radius))
                .collect()
        } else {
            Vec::new()
        };
        for _ in 0..count {
            let position = if config.uniform {
                let position = uniform_position(&occupied, radius, &self.border);
                occupied.push(Circle::new(position, radius));
                position
            } else {
                self.border.random_position(radius)
            };
            let id = self.ids.allocate();
            self.food.push(Food {
                id,
                position,
                radius,
                mass: config.mass,
                hue: rng.random_range(0..360),
            });
        }
    }

    /// Drop the `count` oldest pellets.
    pub fn remove_food(&mut self, count: usize) {
        let count = count.min(self.food.len());
        self.food.drain(..count);
    }

    /// Spawn `count` viruses with a mass in `[min_mass, max_mass)`.
    pub fn add_viruses(&mut self, count: usize, config: &VirusConfig) {
        let mut rng = rand::rng();
        let mut occupied: Vec<Circle> = if config.uniform {
            self.viruses
                .iter()
                .map(|virus| Circle::new(virus.position, virus.radius))
                .collect()
        } else {
            Vec::new()
        };
        for _ in 0..count {
            let mass = random_in_range(&mut rng, config.min_mass, config.max_mass);
            let radius = mass_to_radius(mass);
            let position = if config.uniform {
                let position = uniform_position(&occupied, radius, &self.border);
                occupied.push(Circle::new(position, radius));
                position
            } else {
                self.border.random_position(radius)
            };
            let id = self.ids.allocate();
            self.viruses.push(Virus {
                id,
                position,
                radius,
                mass,
                style: self.virus_style,
            });
        }
    }
}

/// Remove every item whose index is set in `marked`, keeping order.
pub fn compact_marked<T>(items: &mut Vec<T>, marked: &FixedBitSet) {
    if marked.count_ones(..) == 0 {
        return;
    }
    let mut index = 0;
    items.retain(|_| {
        let keep = !marked.contains(index);
        index += 1;
        keep
    });
}
