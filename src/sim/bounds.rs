//! Bounding-volume overlap on the ground plane
//!
//! Obstacles only block through their XZ footprint. There is no full physics:
//! a circle (the player) is tested against axis-aligned rectangles and the
//! overlap depth is used to decide whether a step makes things worse.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned footprint on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Centre (x, z)
    pub center: Vec2,
    /// Half extents along x and z
    pub half_extents: Vec2,
}

impl Footprint {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Square footprint
    pub fn square(center: Vec2, half: f32) -> Self {
        Self::new(center, Vec2::splat(half))
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Closest point of the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// How far a circle sinks into this footprint (0 when apart)
    pub fn circle_penetration(&self, center: Vec2, radius: f32) -> f32 {
        let closest = self.closest_point(center);
        let dist = (center - closest).length();
        if dist > 0.0 {
            (radius - dist).max(0.0)
        } else {
            // Centre is inside the rectangle: depth to the nearest edge plus radius
            let to_edge = self.half_extents - (center - self.center).abs();
            radius + to_edge.min_element()
        }
    }

    #[inline]
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.circle_penetration(center, radius) > 0.0
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        d.x < reach.x && d.y < reach.y
    }
}

/// Project a world position onto the ground plane
#[inline]
pub fn ground(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Total overlap of a circle with a set of footprints
pub fn total_penetration<'a>(
    footprints: impl IntoIterator<Item = &'a Footprint>,
    center: Vec2,
    radius: f32,
) -> f32 {
    footprints
        .into_iter()
        .map(|f| f.circle_penetration(center, radius))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_outside() {
        let f = Footprint::square(Vec2::ZERO, 1.0);
        assert_eq!(f.circle_penetration(Vec2::new(3.0, 0.0), 0.5), 0.0);
        assert!(!f.overlaps_circle(Vec2::new(3.0, 0.0), 0.5));
    }

    #[test]
    fn test_circle_touching_edge() {
        let f = Footprint::square(Vec2::ZERO, 1.0);
        let pen = f.circle_penetration(Vec2::new(1.2, 0.0), 0.5);
        assert!((pen - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_circle_centre_inside_is_deeper_than_radius() {
        let f = Footprint::square(Vec2::ZERO, 1.0);
        let near_edge = f.circle_penetration(Vec2::new(0.9, 0.0), 0.3);
        let centre = f.circle_penetration(Vec2::ZERO, 0.3);
        assert!((near_edge - 0.4).abs() < 1e-5);
        assert!(centre > near_edge);
    }

    #[test]
    fn test_footprint_overlap() {
        let a = Footprint::square(Vec2::ZERO, 1.0);
        let b = Footprint::square(Vec2::new(1.5, 0.0), 1.0);
        let c = Footprint::square(Vec2::new(2.5, 0.0), 0.4);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
