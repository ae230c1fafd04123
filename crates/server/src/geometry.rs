//! Geometry and physics helpers.
//!
//! Mass/radius conversion, the logarithmic slow-down curve, circle tests and
//! spawn position sampling. Nothing here touches world state.

use glam::DVec2;
use rand::Rng;

/// Number of random candidates tried by [`uniform_position`].
const UNIFORM_CANDIDATES: usize = 10;

/// Radius of a body of the given mass.
///
/// Strictly increasing in mass.
#[inline]
pub fn mass_to_radius(mass: f64) -> f64 {
    4.0 + mass.sqrt() * 6.0
}

/// Logarithm of `n` in `base`.
#[inline]
pub fn log_base(n: f64, base: f64) -> f64 {
    n.ln() / base.ln()
}

/// Speed divisor for a cell of `mass`; 1.0 at the default player mass and
/// growing logarithmically with mass.
#[inline]
pub fn slow_down(mass: f64, default_mass: f64, slow_base: f64) -> f64 {
    log_base(mass, slow_base) - log_base(default_mass, slow_base) + 1.0
}

/// A circle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    #[inline]
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies strictly inside the circle.
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        self.center.distance_squared(point) < self.radius * self.radius
    }

    /// Whether two circles touch or overlap.
    #[inline]
    pub fn intersects(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Gap between the two rims (negative when overlapping).
    #[inline]
    pub fn gap(&self, other: &Circle) -> f64 {
        self.center.distance(other.center) - self.radius - other.radius
    }
}

/// World rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    pub width: f64,
    pub height: f64,
}

impl WorldBorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp `position` so it stays `margin` away from every edge.
    ///
    /// The upper edge is applied first, so an oversized margin pins the body to
    /// `margin` instead of panicking.
    #[inline]
    pub fn clamp(&self, position: DVec2, margin: f64) -> DVec2 {
        DVec2::new(
            position.x.min(self.width - margin).max(margin),
            position.y.min(self.height - margin).max(margin),
        )
    }

    /// Random whole-unit position keeping a body of `radius` inside the world.
    pub fn random_position(&self, radius: f64) -> DVec2 {
        let mut rng = rand::rng();
        DVec2::new(
            random_in_range(&mut rng, radius, self.width - radius),
            random_in_range(&mut rng, radius, self.height - radius),
        )
    }
}

/// `floor(random * (to - from)) + from`; returns `from` for empty ranges.
pub fn random_in_range(rng: &mut impl Rng, from: f64, to: f64) -> f64 {
    if to <= from {
        return from;
    }
    (rng.random::<f64>() * (to - from)).floor() + from
}

/// Best-candidate sampling: the random position farthest from `occupied`.
pub fn uniform_position(occupied: &[Circle], radius: f64, border: &WorldBorder) -> DVec2 {
    if occupied.is_empty() {
        return border.random_position(radius);
    }

    let mut best = border.random_position(radius);
    let mut best_gap = f64::NEG_INFINITY;
    for _ in 0..UNIFORM_CANDIDATES {
        let candidate = Circle::new(border.random_position(radius), radius);
        let nearest = occupied
            .iter()
            .map(|other| candidate.gap(other))
            .fold(f64::INFINITY, f64::min);
        if nearest > best_gap {
            best_gap = nearest;
            best = candidate.center;
        }
    }
    best
}
