//! Virus.

use glam::DVec2;
use protocol::{Color, EntityId};

/// Rendering style shared by every virus in a room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirusStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
}

/// A static hazard. Cells heavier than it swallow it and are split apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Virus {
    pub id: EntityId,
    pub position: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub style: VirusStyle,
}
