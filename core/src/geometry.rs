//! Circle tests shared by every entity.
//!
//! Plain vector arithmetic goes straight through `glam::Vec2`; only the
//! inclusive-boundary checks live here.

use glam::Vec2;

/// Reports whether two circles touch or overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

/// Reports whether `point` lies inside or on the circle.
#[must_use]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_includes_touching_circles() {
        assert!(circles_overlap(
            Vec2::ZERO,
            2.0,
            Vec2::new(5.0, 0.0),
            3.0
        ));
        assert!(!circles_overlap(
            Vec2::ZERO,
            2.0,
            Vec2::new(5.1, 0.0),
            3.0
        ));
    }

    #[test]
    fn radius_boundary_counts_as_inside() {
        assert!(within_radius(Vec2::ZERO, 10.0, Vec2::new(6.0, 8.0)));
        assert!(!within_radius(Vec2::ZERO, 10.0, Vec2::new(6.0, 8.1)));
    }
}
