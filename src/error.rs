//! Error taxonomy
//!
//! Only two things can stop a session from starting: bad parameters and a
//! missing rendering surface. Everything that happens once a session runs
//! (slow frames, capture loss, late callbacks) is absorbed by the simulation.

use thiserror::Error;

/// Invalid session parameters, rejected before any session state exists
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("target count must be greater than zero")]
    NonPositiveTargets,
    #[error("time limit must be a positive number of seconds (got {0})")]
    NonPositiveTimeLimit(f32),
    #[error("movement speed must be positive (got {0})")]
    NonPositiveSpeed(f32),
    #[error("detection radius must be positive (got {0})")]
    NonPositiveDetectionRadius(f32),
    #[error("detection radius {radius} cannot reach targets on the ground from eye height {eye_height}")]
    UnreachableDetectionRadius { radius: f32, eye_height: f32 },
    #[error("look sensitivity must be positive (got {0})")]
    NonPositiveLookSensitivity(f32),
    #[error("placement band [{min}, {max}] does not fit inside world radius {radius}")]
    InvalidPlacementBand { min: f32, max: f32, radius: f32 },
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidLayout { field: &'static str, value: f32 },
    #[error("failed to parse session config: {0}")]
    Parse(String),
}

/// Errors surfaced to the host before a session begins
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("rendering surface unavailable: {0}")]
    SurfaceUnavailable(String),
}
