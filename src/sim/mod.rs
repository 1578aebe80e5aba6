//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Stable iteration order (targets by id)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod bounds;
pub mod detection;
pub mod input;
pub mod player;
pub mod state;
pub mod tick;
pub mod world;

pub use bounds::Footprint;
pub use detection::{Discovery, detect_targets};
pub use input::{InputState, MoveAction};
pub use player::Player;
pub use state::{GameEvent, GameStatus, Outcome, SessionState};
pub use tick::{Simulation, TickParams, clamp_dt, tick};
pub use world::{HiddenTarget, Obstacle, ObstacleKind, World, generate_world};
