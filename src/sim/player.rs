//! First-person player controller
//!
//! Movement is integrated with a variable, clamped delta. Obstacles only
//! dampen movement: a step that would push deeper into a footprint is retried
//! one axis at a time, and steps that reduce overlap are always allowed.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::bounds::{ground, total_penetration};
use super::world::World;
use crate::consts::{EYE_HEIGHT, PITCH_LIMIT, PLAYER_RADIUS};

/// The avatar (camera) state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Eye position
    pub position: Vec3,
    /// Rotation around +Y; 0 looks down -Z
    pub yaw: f32,
    /// Rotation around the camera's X axis, clamped to ±89°
    pub pitch: f32,
    /// Displacement applied during the last tick (per second)
    #[serde(skip)]
    pub velocity: Vec3,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vec3::ZERO,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera rotation (yaw then pitch)
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Planar facing direction
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z
    }

    /// Full view direction including pitch
    pub fn look_direction(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Apply pointer movement (pixels) scaled by `sensitivity` radians/pixel
    pub fn apply_look(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw = crate::normalize_angle(self.yaw - delta.x * sensitivity);
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Turn to face a point on the ground
    pub fn face_towards(&mut self, target: Vec3) {
        let to = target - self.position;
        if to.x != 0.0 || to.z != 0.0 {
            self.yaw = (-to.x).atan2(-to.z);
        }
    }

    /// World-space displacement for this tick, before obstacles
    pub fn desired_step(&self, axes: Vec2, speed: f32, dt: f32) -> Vec3 {
        let local = Vec3::new(axes.x, 0.0, -axes.y).normalize_or_zero();
        Quat::from_rotation_y(self.yaw) * (local * speed * dt)
    }

    /// Move by `step`, yielding to obstacles and world bounds
    pub fn step(&mut self, step: Vec3, world: &World, dt: f32) {
        let from = ground(self.position);
        let wanted = Vec2::new(step.x, step.z);

        let to = if wanted == Vec2::ZERO {
            from
        } else {
            resolve_step(world, from, wanted)
        };
        let to = world.clamp_to_bounds(to);

        let moved = to - from;
        self.position.x = to.x;
        self.position.z = to.y;
        self.velocity = if dt > 0.0 {
            Vec3::new(moved.x, 0.0, moved.y) / dt
        } else {
            Vec3::ZERO
        };
    }
}

/// Try the whole step, then each axis on its own
fn resolve_step(world: &World, from: Vec2, wanted: Vec2) -> Vec2 {
    let before = total_penetration(world.footprints(), from, PLAYER_RADIUS);
    let allowed = |to: Vec2| total_penetration(world.footprints(), to, PLAYER_RADIUS) <= before;

    let full = from + wanted;
    if allowed(full) {
        return full;
    }

    let mut pos = from;
    let x_only = pos + Vec2::new(wanted.x, 0.0);
    if wanted.x != 0.0 && allowed(x_only) {
        pos = x_only;
    }
    let z_only = pos + Vec2::new(0.0, wanted.y);
    if wanted.y != 0.0 && allowed(z_only) {
        pos = z_only;
    }
    pos
}
