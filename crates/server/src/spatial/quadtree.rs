//! QuadTree for spatial indexing.
//!
//! Region tree rebuilt from scratch every movement tick: items are bulk
//! inserted, queried by rectangle, then the tree is cleared.

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Create bounds from a center and half extent.
    #[inline]
    pub fn from_center(cx: f64, cy: f64, half: f64) -> Self {
        Self::from_center_extents(cx, cy, half, half)
    }

    /// Create bounds from a center and separate half width / half height.
    #[inline]
    pub fn from_center_extents(cx: f64, cy: f64, half_w: f64, half_h: f64) -> Self {
        Self {
            min_x: cx - half_w,
            min_y: cy - half_h,
            max_x: cx + half_w,
            max_y: cy + half_h,
        }
    }

    /// Grow every side by `margin`.
    #[inline]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Check if two bounds overlap (touching edges do not count).
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.min_x >= self.max_x
            || other.max_x <= self.min_x
            || other.min_y >= self.max_y
            || other.max_y <= self.min_y)
    }

    /// Check if `other` lies entirely inside these bounds.
    #[inline]
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Check if a point lies strictly inside.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    fn quadrants(&self) -> [Bounds; 4] {
        let (cx, cy) = (self.center_x(), self.center_y());
        [
            Bounds::new(self.min_x, self.min_y, cx, cy),
            Bounds::new(cx, self.min_y, self.max_x, cy),
            Bounds::new(self.min_x, cy, cx, self.max_y),
            Bounds::new(cx, cy, self.max_x, self.max_y),
        ]
    }
}

/// An item stored in the QuadTree.
#[derive(Debug, Clone)]
pub struct QuadItem {
    /// Unique entity ID.
    pub id: u32,
    /// Bounding box of the item.
    pub bound: Bounds,
}

impl QuadItem {
    /// Item centred on (`x`, `y`) with half extent `size`.
    #[inline]
    pub fn new(id: u32, x: f64, y: f64, size: f64) -> Self {
        Self {
            id,
            bound: Bounds::from_center(x, y, size),
        }
    }
}

#[derive(Debug)]
struct QuadNode {
    bounds: Bounds,
    level: u32,
    /// Items that fit no single child (or every item, while this node is a leaf).
    items: Vec<QuadItem>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(bounds: Bounds, level: u32) -> Self {
        Self {
            bounds,
            level,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, item: QuadItem, max_items: usize, max_level: u32) {
        if let Some(children) = self.children.as_mut() {
            match children.iter_mut().find(|child| child.bounds.contains(&item.bound)) {
                Some(child) => child.insert(item, max_items, max_level),
                None => self.items.push(item),
            }
            return;
        }

        self.items.push(item);
        if self.items.len() > max_items && self.level < max_level {
            self.subdivide(max_items, max_level);
        }
    }

    fn subdivide(&mut self, max_items: usize, max_level: u32) {
        let level = self.level + 1;
        let [a, b, c, d] = self.bounds.quadrants();
        self.children = Some(Box::new([
            QuadNode::new(a, level),
            QuadNode::new(b, level),
            QuadNode::new(c, level),
            QuadNode::new(d, level),
        ]));
        for item in std::mem::take(&mut self.items) {
            self.insert(item, max_items, max_level);
        }
    }

    fn collect(&self, bound: &Bounds, out: &mut Vec<u32>) {
        out.extend(
            self.items
                .iter()
                .filter(|item| item.bound.intersects(bound))
                .map(|item| item.id),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.bounds.intersects(bound) {
                    child.collect(bound, out);
                }
            }
        }
    }
}

/// QuadTree for range queries over entity bounding boxes.
///
/// Items that straddle a split line stay in the parent node; items partly
/// outside the world stay in the root, so queries never miss them.
#[derive(Debug)]
pub struct QuadTree {
    root: QuadNode,
    max_items: usize,
    max_level: u32,
    len: usize,
}

impl QuadTree {
    /// Create a new QuadTree with the given bounds.
    pub fn new(bound: Bounds, max_items: usize, max_level: u32) -> Self {
        Self {
            root: QuadNode::new(bound, 0),
            max_items: max_items.max(1),
            max_level,
            len: 0,
        }
    }

    /// Create a QuadTree for the game world.
    pub fn for_world(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Bounds::new(min_x, min_y, max_x, max_y), 16, 8)
    }

    /// Insert an item.
    #[inline]
    pub fn insert(&mut self, item: QuadItem) {
        self.root.insert(item, self.max_items, self.max_level);
        self.len += 1;
    }

    /// Bulk insert.
    pub fn extend(&mut self, items: impl IntoIterator<Item = QuadItem>) {
        for item in items {
            self.insert(item);
        }
    }

    /// Find all items whose bounds intersect with the given bounds.
    pub fn find_in_bounds(&self, bound: &Bounds) -> Vec<u32> {
        let mut result = Vec::with_capacity(16);
        self.root.collect(bound, &mut result);
        result
    }

    /// Find all items whose bounds intersect the square around a circle.
    #[inline]
    pub fn find_in_radius(&self, cx: f64, cy: f64, radius: f64) -> Vec<u32> {
        self.find_in_bounds(&Bounds::from_center(cx, cy, radius))
    }

    /// Get the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear all items, keeping the world bounds.
    pub fn clear(&mut self) {
        self.root = QuadNode::new(self.root.bounds, 0);
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 15.0, 15.0);
        let c = Bounds::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_bounds_contains() {
        let outer = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(&Bounds::new(1.0, 1.0, 9.0, 9.0)));
        assert!(!outer.contains(&Bounds::new(5.0, 5.0, 15.0, 15.0)));
        assert!(outer.contains_point(5.0, 5.0));
        assert!(!outer.contains_point(10.0, 5.0));
    }

    #[test]
    fn test_quadtree_insert_find() {
        let mut tree = QuadTree::for_world(-100.0, -100.0, 100.0, 100.0);

        tree.insert(QuadItem::new(1, 0.0, 0.0, 10.0));
        tree.insert(QuadItem::new(2, 50.0, 50.0, 10.0));
        tree.insert(QuadItem::new(3, -50.0, -50.0, 10.0));

        assert_eq!(tree.len(), 3);

        // Find near origin
        let found = tree.find_in_radius(0.0, 0.0, 20.0);
        assert!(found.contains(&1));
        assert!(!found.contains(&2));
        assert!(!found.contains(&3));

        // Find near (50, 50)
        let found = tree.find_in_radius(50.0, 50.0, 20.0);
        assert!(!found.contains(&1));
        assert!(found.contains(&2));
        assert!(!found.contains(&3));
    }

    #[test]
    fn test_quadtree_matches_linear_scan_after_subdividing() {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 1000.0, 1000.0), 4, 6);
        let items: Vec<QuadItem> = (0..400)
            .map(|i| {
                let x = (i * 37 % 1000) as f64;
                let y = (i * 91 % 1000) as f64;
                QuadItem::new(i, x, y, 3.0 + (i % 7) as f64)
            })
            .collect();
        tree.extend(items.iter().cloned());
        assert_eq!(tree.len(), 400);

        let query = Bounds::new(200.0, 300.0, 450.0, 520.0);
        let mut found = tree.find_in_bounds(&query);
        found.sort_unstable();
        let mut expected: Vec<u32> = items
            .iter()
            .filter(|item| item.bound.intersects(&query))
            .map(|item| item.id)
            .collect();
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_items_outside_world_are_still_found() {
        let mut tree = QuadTree::for_world(0.0, 0.0, 100.0, 100.0);
        tree.insert(QuadItem::new(9, -5.0, 50.0, 10.0));
        assert_eq!(tree.find_in_radius(0.0, 50.0, 2.0), vec![9]);
    }

    #[test]
    fn test_clear() {
        let mut tree = QuadTree::for_world(0.0, 0.0, 100.0, 100.0);
        tree.insert(QuadItem::new(1, 50.0, 50.0, 5.0));
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.find_in_radius(50.0, 50.0, 10.0).is_empty());
    }
}
