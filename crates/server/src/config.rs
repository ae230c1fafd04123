//! Simulation configuration.

use crate::entity::VirusStyle;
use crate::error::CoreError;
use protocol::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub virus: VirusConfig,
    #[serde(default)]
    pub eject: EjectConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: &str| Err(CoreError::InvalidConfig(reason.to_string()));

        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return invalid("world dimensions must be positive");
        }
        if self.food.mass <= 0.0 {
            return invalid("food.mass must be positive");
        }
        if self.server.movement_hz == 0 || self.server.rules_hz == 0 || self.server.publish_hz == 0 {
            return invalid("tick rates must be non-zero");
        }
        if self.player.default_mass <= 0.0 {
            return invalid("player.default_mass must be positive");
        }
        if self.player.slow_base <= 1.0 {
            return invalid("player.slow_base must be greater than 1");
        }
        if self.virus.min_mass <= 0.0 || self.virus.max_mass < self.virus.min_mass {
            return invalid("virus mass range is empty or inverted");
        }
        self.virus.style()?;
        Ok(())
    }
}

/// Scheduling and session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Movement and collision ticks per second.
    #[serde(default = "default_movement_hz")]
    pub movement_hz: u32,
    /// Leaderboard, decay and balancing ticks per second.
    #[serde(default = "default_rules_hz")]
    pub rules_hz: u32,
    /// Snapshot publications per second.
    #[serde(default = "default_publish_hz")]
    pub publish_hz: u32,
    /// Players silent for longer than this are kicked.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_ms: u64,
    /// Log chat lines at info level.
    #[serde(default)]
    pub log_chat: bool,
    /// Chat lines are cut to this many characters.
    #[serde(default = "default_max_chat_length")]
    pub max_chat_length: usize,
}

impl ServerConfig {
    pub fn movement_period(&self) -> Duration {
        period(self.movement_hz)
    }

    pub fn rules_period(&self) -> Duration {
        period(self.rules_hz)
    }

    pub fn publish_period(&self) -> Duration {
        period(self.publish_hz)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            movement_hz: default_movement_hz(),
            rules_hz: default_rules_hz(),
            publish_hz: default_publish_hz(),
            heartbeat_timeout_ms: default_heartbeat_timeout(),
            log_chat: false,
            max_chat_length: default_max_chat_length(),
        }
    }
}

fn period(hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / hz.max(1) as f64)
}

fn default_movement_hz() -> u32 {
    60
}
fn default_rules_hz() -> u32 {
    1
}
fn default_publish_hz() -> u32 {
    40
}
fn default_heartbeat_timeout() -> u64 {
    5000
}
fn default_max_chat_length() -> usize {
    35
}

/// World dimensions and mass budget.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_size")]
    pub width: f64,
    #[serde(default = "default_world_size")]
    pub height: f64,
    /// Total mass (food + players) the balancer steers towards.
    #[serde(default = "default_target_mass")]
    pub target_mass: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_size(),
            height: default_world_size(),
            target_mass: default_target_mass(),
        }
    }
}

fn default_world_size() -> f64 {
    5000.0
}
fn default_target_mass() -> f64 {
    20000.0
}

/// Where new players are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPlacement {
    /// Best of several random candidates, away from existing cells.
    #[default]
    Farthest,
    Random,
}

/// Player configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_mass")]
    pub default_mass: f64,
    /// Logarithm base of the mass slow-down curve.
    #[serde(default = "default_slow_base")]
    pub slow_base: f64,
    /// Seconds after a split during which sibling cells repel instead of merging.
    #[serde(default = "default_merge_timer")]
    pub merge_timer: f64,
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
    /// Launch speed of a freshly split cell.
    #[serde(default = "default_split_speed")]
    pub split_speed: f64,
    /// Per-mille of cell mass lost on every rules tick.
    #[serde(default = "default_mass_loss_rate")]
    pub mass_loss_rate: f64,
    /// Players at or below this total mass do not decay.
    #[serde(default = "default_min_mass_loss")]
    pub min_mass_loss: f64,
    /// An eater must be this many times heavier than its prey.
    #[serde(default = "default_eat_ratio")]
    pub eat_ratio: f64,
    /// Cells at or below this mass cannot be eaten by other players.
    #[serde(default = "default_min_target_mass")]
    pub min_target_mass: f64,
    #[serde(default)]
    pub spawn_placement: SpawnPlacement,
    #[serde(default = "default_max_nick_length")]
    pub max_nick_length: usize,
}

impl PlayerConfig {
    pub fn merge_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.merge_timer.max(0.0))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_mass: default_player_mass(),
            slow_base: default_slow_base(),
            merge_timer: default_merge_timer(),
            max_cells: default_max_cells(),
            split_speed: default_split_speed(),
            mass_loss_rate: default_mass_loss_rate(),
            min_mass_loss: default_min_mass_loss(),
            eat_ratio: default_eat_ratio(),
            min_target_mass: default_min_target_mass(),
            spawn_placement: SpawnPlacement::default(),
            max_nick_length: default_max_nick_length(),
        }
    }
}

fn default_player_mass() -> f64 {
    10.0
}
fn default_slow_base() -> f64 {
    4.5
}
fn default_merge_timer() -> f64 {
    15.0
}
fn default_max_cells() -> usize {
    16
}
fn default_split_speed() -> f64 {
    25.0
}
fn default_mass_loss_rate() -> f64 {
    1.0
}
fn default_min_mass_loss() -> f64 {
    50.0
}
fn default_eat_ratio() -> f64 {
    1.1
}
fn default_min_target_mass() -> f64 {
    10.0
}
fn default_max_nick_length() -> usize {
    25
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Mass credited per pellet.
    #[serde(default = "default_food_mass")]
    pub mass: f64,
    #[serde(default = "default_food_max_amount")]
    pub max_amount: usize,
    /// Most pellets added in one balancing pass.
    #[serde(default = "default_food_max_amount")]
    pub spawn_amount: usize,
    /// Most pellets removed in one balancing pass.
    #[serde(default = "default_food_max_amount")]
    pub remove_amount: usize,
    /// Spread pellets out instead of dropping them anywhere.
    #[serde(default = "default_true")]
    pub uniform: bool,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            mass: default_food_mass(),
            max_amount: default_food_max_amount(),
            spawn_amount: default_food_max_amount(),
            remove_amount: default_food_max_amount(),
            uniform: true,
        }
    }
}

fn default_food_mass() -> f64 {
    1.0
}
fn default_food_max_amount() -> usize {
    1000
}
fn default_true() -> bool {
    true
}

/// Virus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirusConfig {
    #[serde(default = "default_virus_max_amount")]
    pub max_amount: usize,
    #[serde(default = "default_virus_min_mass")]
    pub min_mass: f64,
    #[serde(default = "default_virus_max_mass")]
    pub max_mass: f64,
    #[serde(default)]
    pub uniform: bool,
    #[serde(default = "default_virus_fill")]
    pub fill: String,
    #[serde(default = "default_virus_stroke")]
    pub stroke: String,
    #[serde(default = "default_virus_stroke_width")]
    pub stroke_width: f64,
}

impl VirusConfig {
    /// Parse the configured colors.
    pub fn style(&self) -> Result<VirusStyle, CoreError> {
        Ok(VirusStyle {
            fill: Color::from_hex(&self.fill)?,
            stroke: Color::from_hex(&self.stroke)?,
            stroke_width: self.stroke_width,
        })
    }
}

impl Default for VirusConfig {
    fn default() -> Self {
        Self {
            max_amount: default_virus_max_amount(),
            min_mass: default_virus_min_mass(),
            max_mass: default_virus_max_mass(),
            uniform: false,
            fill: default_virus_fill(),
            stroke: default_virus_stroke(),
            stroke_width: default_virus_stroke_width(),
        }
    }
}

fn default_virus_max_amount() -> usize {
    50
}
fn default_virus_min_mass() -> f64 {
    100.0
}
fn default_virus_max_mass() -> f64 {
    150.0
}
fn default_virus_fill() -> String {
    "#33ff33".to_string()
}
fn default_virus_stroke() -> String {
    "#19D119".to_string()
}
fn default_virus_stroke_width() -> f64 {
    20.0
}

/// Ejected mass configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EjectConfig {
    /// Mass fired per eligible cell; 0 fires a tenth of the cell instead.
    #[serde(default = "default_fire_food")]
    pub fire_food: f64,
    /// Launch speed of a fired blob.
    #[serde(default = "default_eject_speed")]
    pub speed: f64,
}

impl Default for EjectConfig {
    fn default() -> Self {
        Self {
            fire_food: default_fire_food(),
            speed: default_eject_speed(),
        }
    }
}

fn default_fire_food() -> f64 {
    20.0
}
fn default_eject_speed() -> f64 {
    25.0
}

/// Viewport culling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    /// Extra border around the viewport for food, mass and player cells.
    #[serde(default = "default_view_margin")]
    pub margin: f64,
    /// Viewport used until the client reports its size.
    #[serde(default = "default_view_width")]
    pub default_width: f64,
    #[serde(default = "default_view_height")]
    pub default_height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            margin: default_view_margin(),
            default_width: default_view_width(),
            default_height: default_view_height(),
        }
    }
}

fn default_view_margin() -> f64 {
    20.0
}
fn default_view_width() -> f64 {
    1920.0
}
fn default_view_height() -> f64 {
    1080.0
}
