//! Procedural world layout
//!
//! Targets are spread around the centre on a ring with even angular spacing
//! plus a little jitter. Obstacles come in clusters of trees and rocks
//! scattered across the ground; candidates that would block the spawn point
//! or sit on top of a target are thrown away.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::bounds::{Footprint, ground};
use crate::config::WorldConfig;
use crate::consts::{SPAWN_CLEARANCE, TARGET_CLEARANCE};
use crate::error::ConfigError;
use crate::polar_to_ground;

/// Trees per cluster (half-open range)
const TREES_PER_CLUSTER: std::ops::Range<u32> = 5..10;
/// Rocks per cluster (half-open range)
const ROCKS_PER_CLUSTER: std::ops::Range<u32> = 2..5;
const TREE_OFFSET: f32 = 5.0;
const ROCK_OFFSET: f32 = 6.0;
const TREE_HALF_WIDTH: f32 = 0.3;
const TREE_HEIGHT: f32 = 3.5;

/// Obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Rock { scale: f32 },
}

/// A static obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Base position on the ground
    pub position: Vec3,
    /// Collision extent on the ground plane
    pub footprint: Footprint,
    pub height: f32,
}

impl Obstacle {
    pub fn tree(x: f32, z: f32) -> Self {
        Self {
            kind: ObstacleKind::Tree,
            position: Vec3::new(x, 0.0, z),
            footprint: Footprint::square(Vec2::new(x, z), TREE_HALF_WIDTH),
            height: TREE_HEIGHT,
        }
    }

    pub fn rock(x: f32, z: f32, scale: f32) -> Self {
        Self {
            kind: ObstacleKind::Rock { scale },
            position: Vec3::new(x, scale / 2.0, z),
            footprint: Footprint::square(Vec2::new(x, z), scale),
            height: scale * 2.0,
        }
    }
}

/// An object the player has to walk up to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenTarget {
    pub id: u32,
    pub position: Vec3,
}

/// The playable area and everything placed in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Half extent of the ground plane
    pub radius: f32,
    pub obstacles: Vec<Obstacle>,
    /// Sorted by id; created once and never regenerated
    pub targets: Vec<HiddenTarget>,
}

impl World {
    /// Empty world (no obstacles, no targets)
    pub fn empty(radius: f32) -> Self {
        Self {
            radius,
            obstacles: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn target(&self, id: u32) -> Option<&HiddenTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn footprints(&self) -> impl Iterator<Item = &Footprint> {
        self.obstacles.iter().map(|o| &o.footprint)
    }

    /// Clamp a ground position into the playable area
    pub fn clamp_to_bounds(&self, p: Vec2) -> Vec2 {
        p.clamp(Vec2::splat(-self.radius), Vec2::splat(self.radius))
    }
}

/// Angular spacing between neighbouring targets
#[inline]
pub fn target_spacing(count: u32) -> f32 {
    TAU / count as f32
}

/// Jitter actually applied for `count` targets.
///
/// Capped at half the spacing so neighbours can never swap order.
#[inline]
pub fn effective_jitter(config: &WorldConfig, count: u32) -> f32 {
    config.angular_jitter.max(0.0).min(target_spacing(count) / 2.0)
}

/// Place `count` targets on the configured ring
pub fn place_targets(
    config: &WorldConfig,
    count: u32,
    rng: &mut Pcg32,
) -> Result<Vec<HiddenTarget>, ConfigError> {
    if count == 0 {
        return Err(ConfigError::NonPositiveTargets);
    }
    config.validate()?;

    let spacing = target_spacing(count);
    let jitter = effective_jitter(config, count);

    let targets = (0..count)
        .map(|id| {
            let wobble = if jitter > 0.0 {
                rng.random_range(-jitter / 2.0..=jitter / 2.0)
            } else {
                0.0
            };
            let angle = id as f32 * spacing + wobble;
            let distance = if config.ring_max > config.ring_min {
                rng.random_range(config.ring_min..config.ring_max)
            } else {
                config.ring_min
            };
            HiddenTarget {
                id,
                position: polar_to_ground(distance, angle, 0.0),
            }
        })
        .collect();
    Ok(targets)
}

/// Scatter obstacle clusters, skipping anything that crowds the spawn point or a target
pub fn scatter_obstacles(
    config: &WorldConfig,
    targets: &[HiddenTarget],
    rng: &mut Pcg32,
) -> Vec<Obstacle> {
    let spread = config.radius * config.cluster_spread.clamp(0.0, 1.0);
    let mut obstacles = Vec::new();

    let keeps_clear = |obstacle: &Obstacle| {
        let fp = &obstacle.footprint;
        if fp.overlaps_circle(Vec2::ZERO, SPAWN_CLEARANCE) {
            return false;
        }
        targets
            .iter()
            .all(|t| !fp.overlaps_circle(ground(t.position), TARGET_CLEARANCE))
    };

    for _ in 0..config.cluster_count {
        let cx = if spread > 0.0 {
            rng.random_range(-spread..spread)
        } else {
            0.0
        };
        let cz = if spread > 0.0 {
            rng.random_range(-spread..spread)
        } else {
            0.0
        };

        let trees = rng.random_range(TREES_PER_CLUSTER);
        for _ in 0..trees {
            let ox = rng.random_range(-TREE_OFFSET..TREE_OFFSET);
            let oz = rng.random_range(-TREE_OFFSET..TREE_OFFSET);
            let tree = Obstacle::tree(cx + ox, cz + oz);
            if keeps_clear(&tree) {
                obstacles.push(tree);
            }
        }

        let rocks = rng.random_range(ROCKS_PER_CLUSTER);
        for _ in 0..rocks {
            let ox = rng.random_range(-ROCK_OFFSET..ROCK_OFFSET);
            let oz = rng.random_range(-ROCK_OFFSET..ROCK_OFFSET);
            let scale = rng.random_range(0.3..1.0);
            let rock = Obstacle::rock(cx + ox, cz + oz, scale);
            if keeps_clear(&rock) {
                obstacles.push(rock);
            }
        }
    }

    obstacles
}

/// Build a complete world: targets first, then obstacles around them
pub fn generate_world(
    config: &WorldConfig,
    target_count: u32,
    rng: &mut Pcg32,
) -> Result<World, ConfigError> {
    let targets = place_targets(config, target_count, rng)?;
    let obstacles = scatter_obstacles(config, &targets, rng);

    log::debug!(
        "Generated world: {} targets, {} obstacles, radius {}",
        targets.len(),
        obstacles.len(),
        config.radius
    );

    Ok(World {
        radius: config.radius,
        obstacles,
        targets,
    })
}
