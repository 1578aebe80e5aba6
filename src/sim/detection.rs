//! Proximity detection of hidden targets

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::world::World;

/// A target was found this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub target_id: u32,
    /// Discovered count after this find
    pub found: u32,
    pub total: u32,
}

/// Mark every undiscovered target within `radius` of `player_pos`.
///
/// All targets in range are found in the same call. Already-discovered
/// targets are skipped, so calling twice without moving yields nothing new.
pub fn detect_targets(
    world: &World,
    player_pos: Vec3,
    radius: f32,
    discovered: &mut BTreeSet<u32>,
) -> Vec<Discovery> {
    let total = world.targets.len() as u32;
    let mut found = Vec::new();

    for target in &world.targets {
        if discovered.contains(&target.id) {
            continue;
        }
        if player_pos.distance(target.position) < radius {
            discovered.insert(target.id);
            found.push(Discovery {
                target_id: target.id,
                found: discovered.len() as u32,
                total,
            });
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::HiddenTarget;

    fn world_with(points: &[Vec3]) -> World {
        let mut world = World::empty(50.0);
        world.targets = points
            .iter()
            .enumerate()
            .map(|(i, &position)| HiddenTarget {
                id: i as u32,
                position,
            })
            .collect();
        world
    }

    #[test]
    fn test_detects_within_radius() {
        let world = world_with(&[Vec3::new(3.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)]);
        let mut discovered = BTreeSet::new();
        let events = detect_targets(&world, Vec3::ZERO, 4.0, &mut discovered);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target_id, 0);
        assert_eq!(events[0].found, 1);
        assert_eq!(events[0].total, 2);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let world = world_with(&[Vec3::new(4.0, 0.0, 0.0)]);
        let mut discovered = BTreeSet::new();
        assert!(detect_targets(&world, Vec3::ZERO, 4.0, &mut discovered).is_empty());
    }

    #[test]
    fn test_simultaneous_discoveries() {
        let world = world_with(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ]);
        let mut discovered = BTreeSet::new();
        let events = detect_targets(&world, Vec3::ZERO, 4.0, &mut discovered);
        assert_eq!(events.len(), 3);
        assert_eq!(events.last().map(|e| e.found), Some(3));
        assert_eq!(discovered.len(), 3);
    }

    #[test]
    fn test_repeat_call_is_idempotent() {
        let world = world_with(&[Vec3::new(1.0, 0.0, 0.0)]);
        let mut discovered = BTreeSet::new();
        assert_eq!(detect_targets(&world, Vec3::ZERO, 4.0, &mut discovered).len(), 1);
        let before = discovered.clone();
        assert!(detect_targets(&world, Vec3::ZERO, 4.0, &mut discovered).is_empty());
        assert_eq!(discovered, before);
    }
}
