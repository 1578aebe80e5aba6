//! Hide and Seek - a first-person exploration mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, movement, detection, session lifecycle)
//! - `session`: Session context owning one play-through and its resources
//! - `driver`: Frame loop with a cancellable continuation
//! - `surface`: Abstract 3D rendering surface
//! - `platform`: Host capabilities (timers, capture, listeners)
//! - `config`: Session configuration and validation

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod driver;
pub mod error;
pub mod hud;
pub mod platform;
pub mod session;
pub mod sim;
pub mod surface;

pub use config::{SessionConfig, WorldConfig};
pub use error::{ConfigError, GameError};
pub use session::GameSession;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta used for the very first frame, before the clock has a baseline
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Session defaults
    pub const DEFAULT_TOTAL_TARGETS: u32 = 5;
    pub const DEFAULT_TIME_LIMIT_SECS: f32 = 120.0;
    pub const DEFAULT_MOVEMENT_SPEED: f32 = 7.0;
    pub const DEFAULT_DETECTION_RADIUS: f32 = 4.0;
    /// Radians of camera rotation per pixel of pointer movement
    pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.002;

    /// Delay between reaching `Complete` and notifying the host (ms)
    pub const COMPLETION_GRACE_MS: u32 = 3000;

    /// Player
    pub const EYE_HEIGHT: f32 = 1.7;
    pub const PLAYER_RADIUS: f32 = 0.3;
    /// Pitch limit, just short of straight up/down (89 degrees)
    pub const PITCH_LIMIT: f32 = 89.0 * (std::f32::consts::PI / 180.0);

    /// World defaults - the ground plane is 100x100 centred on the origin
    pub const DEFAULT_WORLD_RADIUS: f32 = 50.0;
    pub const DEFAULT_RING_MIN: f32 = 15.0;
    pub const DEFAULT_RING_MAX: f32 = 25.0;
    pub const DEFAULT_ANGULAR_JITTER: f32 = 0.3;
    pub const DEFAULT_CLUSTER_COUNT: u32 = 5;
    pub const DEFAULT_CLUSTER_SPREAD: f32 = 0.8;

    /// Keep-out zones used while scattering obstacles
    pub const SPAWN_CLEARANCE: f32 = 2.0;
    pub const TARGET_CLEARANCE: f32 = 1.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) on the ground plane to a world position at height `y`
#[inline]
pub fn polar_to_ground(r: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Angle of a world position around the Y axis, measured the same way as `polar_to_ground`
#[inline]
pub fn ground_angle(pos: Vec3) -> f32 {
    pos.z.atan2(pos.x)
}
