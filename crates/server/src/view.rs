//! View publisher.
//!
//! Builds the visibility-filtered snapshot each player receives on the publish
//! tick, plus the leaderboard when it changed.

use crate::config::ViewConfig;
use crate::entity::Player;
use crate::spatial::Bounds;
use crate::world::Room;
use protocol::{
    CellView, FoodView, MassView, Outbound, PlayerView, ServerEvent, VirusView, WorldSnapshot,
};

/// Build every outbound event for one publish tick of `room`.
///
/// Clears the leaderboard flag once all players were served.
pub fn publish(room: &mut Room, config: &ViewConfig) -> Vec<Outbound> {
    let mut out = Vec::with_capacity(room.players.len() * 2);

    for viewer in &room.players {
        let snapshot = snapshot_for(room, viewer, config);
        out.push(Outbound::player(
            room.id.clone(),
            viewer.id,
            ServerEvent::WorldSnapshot(snapshot),
        ));

        if room.leaderboard_changed {
            out.push(Outbound::player(
                room.id.clone(),
                viewer.id,
                ServerEvent::LeaderboardUpdate {
                    player_count: room.players.len(),
                    entries: room.leaderboard.clone(),
                },
            ));
        }
    }

    room.leaderboard_changed = false;
    out
}

/// Rectangle the viewer's screen covers.
fn view_bounds(room: &Room, viewer: &Player) -> Bounds {
    let centre = viewer.position_or(room.border.center());
    Bounds::from_center_extents(
        centre.x,
        centre.y,
        viewer.viewport.width / 2.0,
        viewer.viewport.height / 2.0,
    )
}

/// Everything `viewer` can see right now.
pub fn snapshot_for(room: &Room, viewer: &Player, config: &ViewConfig) -> WorldSnapshot {
    let view = view_bounds(room, viewer);
    let padded = view.expand(config.margin);

    let food = room
        .food
        .iter()
        .filter(|food| padded.contains_point(food.position.x, food.position.y))
        .map(|food| FoodView {
            id: food.id,
            position: food.position,
            radius: food.radius,
            hue: food.hue,
        })
        .collect();

    let viruses = room
        .viruses
        .iter()
        .filter(|virus| view.expand(virus.radius).contains_point(virus.position.x, virus.position.y))
        .map(|virus| VirusView {
            id: virus.id,
            position: virus.position,
            radius: virus.radius,
            mass: virus.mass,
            fill: virus.style.fill,
            stroke: virus.style.stroke,
            stroke_width: virus.style.stroke_width,
        })
        .collect();

    let mass = room
        .ejected
        .iter()
        .filter(|blob| {
            Bounds::from_center(blob.position.x, blob.position.y, blob.radius).intersects(&padded)
        })
        .map(|blob| MassView {
            id: blob.id,
            owner_id: blob.owner_id,
            position: blob.position,
            radius: blob.radius,
            mass: blob.mass,
            hue: blob.hue,
        })
        .collect();

    let cells = room
        .players
        .iter()
        .filter(|player| {
            player.cells.iter().any(|cell| {
                Bounds::from_center(cell.position.x, cell.position.y, cell.radius()).intersects(&padded)
            })
        })
        .map(|player| PlayerView {
            id: player.id,
            is_self: player.id == viewer.id,
            name: player.name.clone(),
            position: player.position_or(room.border.center()),
            mass_total: player.mass_total.round().max(0.0) as u64,
            hue: player.hue,
            cells: player
                .cells
                .iter()
                .map(|cell| CellView {
                    id: cell.id,
                    position: cell.position,
                    mass: cell.mass(),
                    radius: cell.radius(),
                })
                .collect(),
        })
        .collect();

    WorldSnapshot {
        cells,
        food,
        mass,
        viruses,
    }
}
