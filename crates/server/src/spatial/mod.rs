//! Spatial indexing utilities.
//!
//! [`QuadTree`] is the generic region tree; [`CellIndex`] wraps it for the
//! player cells of one room and is rebuilt once per movement tick.

mod quadtree;

pub use quadtree::{Bounds, QuadItem, QuadTree};

use crate::geometry::{Circle, WorldBorder};
use protocol::{EntityId, PlayerId};
use std::collections::HashMap;

/// Player cells of a room, bucketed by position.
///
/// Answers "which cells of which owners are near this circle". Results are
/// candidates only: callers re-read live state and run exact circle tests.
#[derive(Debug)]
pub struct CellIndex {
    tree: QuadTree,
    owners: HashMap<EntityId, PlayerId>,
}

impl CellIndex {
    pub fn new(border: &WorldBorder) -> Self {
        Self {
            tree: QuadTree::for_world(0.0, 0.0, border.width, border.height),
            owners: HashMap::new(),
        }
    }

    /// Replace the contents with `cells`.
    pub fn rebuild(&mut self, cells: impl IntoIterator<Item = (PlayerId, EntityId, Circle)>) {
        self.tree.clear();
        self.owners.clear();
        let owners = &mut self.owners;
        self.tree.extend(cells.into_iter().map(|(owner, id, circle)| {
            owners.insert(id, owner);
            QuadItem::new(id, circle.center.x, circle.center.y, circle.radius)
        }));
    }

    /// Cells whose indexed bounds come within `slack` of `circle`.
    pub fn query(&self, circle: &Circle, slack: f64) -> Vec<(PlayerId, EntityId)> {
        self.tree
            .find_in_radius(circle.center.x, circle.center.y, circle.radius + slack)
            .into_iter()
            .filter_map(|id| self.owners.get(&id).map(|owner| (*owner, id)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_rebuild_replaces_contents() {
        let border = WorldBorder::new(1000.0, 1000.0);
        let mut index = CellIndex::new(&border);
        index.rebuild([
            (1, 10, Circle::new(DVec2::new(100.0, 100.0), 20.0)),
            (2, 11, Circle::new(DVec2::new(900.0, 900.0), 20.0)),
        ]);
        assert_eq!(index.len(), 2);

        let near = index.query(&Circle::new(DVec2::new(120.0, 120.0), 10.0), 0.0);
        assert_eq!(near, vec![(1, 10)]);

        index.rebuild([(3, 12, Circle::new(DVec2::new(500.0, 500.0), 20.0))]);
        assert_eq!(index.len(), 1);
        assert!(index.query(&Circle::new(DVec2::new(100.0, 100.0), 10.0), 0.0).is_empty());
    }

    #[test]
    fn test_rebuild_indexes_crowded_cells() {
        let border = WorldBorder::new(1000.0, 1000.0);
        let mut index = CellIndex::new(&border);
        // More than one node holds, all in one corner so the tree subdivides.
        index.rebuild((0..40u32).map(|i| {
            let at = DVec2::new(10.0 + (i % 8) as f64 * 5.0, 10.0 + (i / 8) as f64 * 5.0);
            (i % 3, 100 + i, Circle::new(at, 2.0))
        }));
        assert_eq!(index.len(), 40);

        let mut found = index.query(&Circle::new(DVec2::new(30.0, 20.0), 40.0), 0.0);
        found.sort_by_key(|(_, id)| *id);
        let expected: Vec<_> = (0..40u32).map(|i| (i % 3, 100 + i)).collect();
        assert_eq!(found, expected);
        assert!(index.query(&Circle::new(DVec2::new(800.0, 800.0), 50.0), 0.0).is_empty());
    }

    #[test]
    fn test_slack_widens_query() {
        let border = WorldBorder::new(1000.0, 1000.0);
        let mut index = CellIndex::new(&border);
        index.rebuild([(4, 20, Circle::new(DVec2::new(200.0, 100.0), 10.0))]);

        let probe = Circle::new(DVec2::new(100.0, 100.0), 50.0);
        assert!(index.query(&probe, 0.0).is_empty());
        assert_eq!(index.query(&probe, 60.0), vec![(4, 20)]);
    }
}
