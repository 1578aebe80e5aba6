//! Session configuration
//!
//! Accepted from the host at session start, usually as JSON. Missing fields
//! fall back to the defaults in `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Layout parameters for the procedurally generated world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldConfig {
    /// Half extent of the playable ground plane
    pub radius: f32,
    /// Nearest a target may be placed to the centre
    pub ring_min: f32,
    /// Farthest a target may be placed from the centre
    pub ring_max: f32,
    /// Total angular wobble applied to each target (radians)
    pub angular_jitter: f32,
    /// Number of obstacle clusters
    pub cluster_count: u32,
    /// Cluster centres fall within this fraction of `radius`
    pub cluster_spread: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_WORLD_RADIUS,
            ring_min: DEFAULT_RING_MIN,
            ring_max: DEFAULT_RING_MAX,
            angular_jitter: DEFAULT_ANGULAR_JITTER,
            cluster_count: DEFAULT_CLUSTER_COUNT,
            cluster_spread: DEFAULT_CLUSTER_SPREAD,
        }
    }
}

/// Finite and strictly positive (rejects NaN and infinities)
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Finite and not negative
fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let band_ok = positive(self.radius)
            && positive(self.ring_min)
            && self.ring_min <= self.ring_max
            && self.ring_max <= self.radius;
        if !band_ok {
            return Err(ConfigError::InvalidPlacementBand {
                min: self.ring_min,
                max: self.ring_max,
                radius: self.radius,
            });
        }
        if !non_negative(self.angular_jitter) {
            return Err(ConfigError::InvalidLayout {
                field: "angularJitter",
                value: self.angular_jitter,
            });
        }
        if !non_negative(self.cluster_spread) {
            return Err(ConfigError::InvalidLayout {
                field: "clusterSpread",
                value: self.cluster_spread,
            });
        }
        Ok(())
    }
}

/// Parameters for one play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub total_targets: u32,
    pub time_limit_seconds: f32,
    pub movement_speed: f32,
    pub detection_radius: f32,
    pub look_sensitivity: f32,
    /// Fixed seed for reproducible layouts; `None` picks one at start
    pub seed: Option<u64>,
    pub world: WorldConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_targets: DEFAULT_TOTAL_TARGETS,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECS,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            detection_radius: DEFAULT_DETECTION_RADIUS,
            look_sensitivity: DEFAULT_LOOK_SENSITIVITY,
            seed: None,
            world: WorldConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a host-supplied JSON object
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject anything that would make the session meaningless.
    ///
    /// Every number must be finite: JSON values past `f32::MAX` parse as
    /// infinity, and an infinite time limit would never run out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_targets == 0 {
            return Err(ConfigError::NonPositiveTargets);
        }
        if !positive(self.time_limit_seconds) {
            return Err(ConfigError::NonPositiveTimeLimit(self.time_limit_seconds));
        }
        if !positive(self.movement_speed) {
            return Err(ConfigError::NonPositiveSpeed(self.movement_speed));
        }
        if !positive(self.detection_radius) {
            return Err(ConfigError::NonPositiveDetectionRadius(self.detection_radius));
        }
        // Distance is measured from the eye to targets on the ground
        if self.detection_radius <= EYE_HEIGHT {
            return Err(ConfigError::UnreachableDetectionRadius {
                radius: self.detection_radius,
                eye_height: EYE_HEIGHT,
            });
        }
        if !positive(self.look_sensitivity) {
            return Err(ConfigError::NonPositiveLookSensitivity(self.look_sensitivity));
        }
        self.world.validate()
    }
}
