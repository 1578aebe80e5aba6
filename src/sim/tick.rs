//! Per-frame simulation step
//!
//! One call to `tick` is one simulation pass: look, move, detect, count the
//! timer down, then check the end conditions.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::detection::detect_targets;
use super::input::InputState;
use super::player::Player;
use super::state::{GameEvent, SessionState};
use super::world::{World, generate_world};
use crate::config::SessionConfig;
use crate::consts::MAX_FRAME_DT;
use crate::error::ConfigError;

/// Tuning values read every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickParams {
    pub movement_speed: f32,
    pub detection_radius: f32,
    pub look_sensitivity: f32,
}

impl From<&SessionConfig> for TickParams {
    fn from(config: &SessionConfig) -> Self {
        Self {
            movement_speed: config.movement_speed,
            detection_radius: config.detection_radius,
            look_sensitivity: config.look_sensitivity,
        }
    }
}

/// Everything the simulation mutates
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Seed the world was generated from
    pub seed: u64,
    pub world: World,
    pub player: Player,
    pub input: InputState,
    pub state: SessionState,
    pub params: TickParams,
}

impl Simulation {
    /// Validate `config` and build a fresh world
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = generate_world(&config.world, config.total_targets, &mut rng)?;
        Ok(Self::with_world(config, world, seed))
    }

    /// Use a prepared world (tests, replays)
    pub fn with_world(config: &SessionConfig, world: World, seed: u64) -> Self {
        let total = world.targets.len() as u32;
        Self {
            seed,
            world,
            player: Player::new(),
            input: InputState::new(),
            state: SessionState::new(total, config.time_limit_seconds),
            params: TickParams::from(config),
        }
    }

    /// Look-capture acquired: starts the game from the intro, or resumes it
    pub fn capture_acquired(&mut self) {
        self.input.set_capture(true);
        if !self.state.begin() {
            self.state.resume();
        }
    }

    /// Look-capture released: pauses a running game
    pub fn capture_lost(&mut self) {
        self.input.set_capture(false);
        self.input.clear();
        self.state.pause();
    }
}

/// Clamp a raw frame delta into something the simulation can digest
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Advance the simulation by one pass
pub fn tick(sim: &mut Simulation, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Paused, finished or not yet started: nothing moves and the clock stands still
    if !sim.state.is_running() || !sim.input.capture_active() {
        return events;
    }

    let dt = clamp_dt(dt);

    let look = sim.input.take_look();
    sim.player.apply_look(look, sim.params.look_sensitivity);

    let step = sim
        .player
        .desired_step(sim.input.move_axes(), sim.params.movement_speed, dt);
    sim.player.step(step, &sim.world, dt);

    let found = detect_targets(
        &sim.world,
        sim.player.position,
        sim.params.detection_radius,
        &mut sim.state.discovered,
    );
    for discovery in found {
        log::info!(
            "Found target {} ({}/{})",
            discovery.target_id,
            discovery.found,
            discovery.total
        );
        sim.state.note_discovery(&discovery);
        events.push(GameEvent::Discovered(discovery));
    }

    sim.state.advance_timer(dt);

    if let Some(outcome) = sim.state.resolve() {
        sim.input.clear();
        events.push(GameEvent::Completed(outcome));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameStatus, MSG_ALL_FOUND, MSG_PAUSED, Outcome};
    use crate::sim::world::HiddenTarget;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn open_world(targets: &[Vec3]) -> World {
        let mut world = World::empty(50.0);
        world.targets = targets
            .iter()
            .enumerate()
            .map(|(i, &position)| HiddenTarget {
                id: i as u32,
                position,
            })
            .collect();
        world
    }

    fn far_targets(n: usize) -> Vec<Vec3> {
        (0..n)
            .map(|i| crate::polar_to_ground(40.0, i as f32, 0.0))
            .collect()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = SessionConfig {
            total_targets: 0,
            ..Default::default()
        };
        assert_eq!(
            Simulation::new(&config).unwrap_err(),
            ConfigError::NonPositiveTargets
        );
    }

    #[test]
    fn test_new_uses_seed() {
        let config = SessionConfig::default().with_seed(9);
        let a = Simulation::new(&config).unwrap();
        let b = Simulation::new(&config).unwrap();
        assert_eq!(a.seed, 9);
        assert_eq!(a.world.targets[2].position, b.world.targets[2].position);
        assert_eq!(a.state.total_targets, 5);
    }

    #[test]
    fn test_intro_does_not_tick() {
        let config = SessionConfig::default();
        let mut sim = Simulation::with_world(&config, open_world(&far_targets(5)), 0);
        sim.input.key_down("KeyW");
        assert!(tick(&mut sim, 0.05).is_empty());
        assert_eq!(sim.player.position, Player::new().position);
        assert_eq!(sim.state.time_remaining, config.time_limit_seconds);
    }

    #[test]
    fn test_single_target_found_next_tick() {
        let config = SessionConfig {
            total_targets: 1,
            ..Default::default()
        };
        let player_pos = Player::new().position;
        let target = player_pos + Vec3::new(0.01, 0.0, 0.0);
        let mut sim = Simulation::with_world(&config, open_world(&[target]), 0);
        sim.capture_acquired();

        let events = tick(&mut sim, DT);
        assert_eq!(sim.state.found(), 1);
        assert_eq!(sim.state.status, GameStatus::Complete);
        assert_eq!(sim.state.message, MSG_ALL_FOUND);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GameEvent::Completed(Outcome::AllFound)));
    }

    #[test]
    fn test_walking_over_ground_target_finds_it() {
        // Smallest radius that still reaches the ground from eye height
        let config = SessionConfig {
            total_targets: 1,
            detection_radius: crate::consts::EYE_HEIGHT + 0.3,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        let mut sim =
            Simulation::with_world(&config, open_world(&[Vec3::new(0.0, 0.0, -5.0)]), 0);
        sim.capture_acquired();
        sim.input.key_down("KeyW");

        for _ in 0..120 {
            tick(&mut sim, DT);
        }
        assert_eq!(sim.state.found(), 1);
        assert_eq!(sim.state.outcome, Some(Outcome::AllFound));
    }

    #[test]
    fn test_timeout_after_one_second() {
        let config = SessionConfig {
            time_limit_seconds: 1.0,
            ..Default::default()
        };
        let mut sim = Simulation::with_world(&config, open_world(&far_targets(5)), 0);
        sim.capture_acquired();

        let mut completed = None;
        for _ in 0..70 {
            for event in tick(&mut sim, DT) {
                if let GameEvent::Completed(outcome) = event {
                    completed = Some(outcome);
                }
            }
        }
        assert_eq!(completed, Some(Outcome::TimeUp));
        assert_eq!(sim.state.time_remaining, 0.0);
        assert_eq!(sim.state.status, GameStatus::Complete);
        assert_eq!(sim.state.message, "Time's up! You found 0 out of 5 hiders.");
    }

    #[test]
    fn test_forward_one_second_moves_speed_units() {
        let config = SessionConfig::default();
        let mut sim = Simulation::with_world(&config, open_world(&far_targets(5)), 0);
        sim.capture_acquired();
        sim.player.yaw = 0.7;
        let facing = sim.player.forward();
        let start = sim.player.position;

        sim.input.key_down("KeyW");
        // Deltas are clamped, so one second is ten maximal passes
        for _ in 0..10 {
            tick(&mut sim, 0.1);
        }
        let moved = sim.player.position - start;
        assert!((moved.length() - 7.0).abs() < 1e-3);
        assert!(moved.normalize().dot(facing) > 0.9999);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let config = SessionConfig::default();
        let mut sim = Simulation::with_world(&config, open_world(&far_targets(5)), 0);
        sim.capture_acquired();
        sim.input.key_down("KeyW");
        tick(&mut sim, 5.0);
        assert!((sim.player.position.z + 0.7).abs() < 1e-4);
        assert!((sim.state.time_remaining - (config.time_limit_seconds - 0.1)).abs() < 1e-4);
    }

    #[test]
    fn test_capture_loss_freezes_play() {
        let config = SessionConfig::default();
        let mut sim = Simulation::with_world(&config, open_world(&far_targets(5)), 0);
        sim.capture_acquired();
        tick(&mut sim, 0.1);
        let remaining = sim.state.time_remaining;

        sim.capture_lost();
        sim.input.key_down("KeyW");
        assert!(tick(&mut sim, 0.1).is_empty());
        assert_eq!(sim.state.time_remaining, remaining);
        assert_eq!(sim.state.status, GameStatus::Playing);
        assert_eq!(sim.state.message, MSG_PAUSED);

        sim.capture_acquired();
        tick(&mut sim, 0.1);
        assert!(sim.state.time_remaining < remaining);
    }

    #[test]
    fn test_monotonic_progress() {
        let config = SessionConfig {
            time_limit_seconds: 30.0,
            ..SessionConfig::default().with_seed(5)
        };
        let mut sim = Simulation::new(&config).unwrap();
        sim.capture_acquired();
        sim.input.key_down("KeyW");

        let mut last_found = 0;
        let mut last_time = sim.state.time_remaining;
        for i in 0..600 {
            sim.input.add_look(if i % 120 < 60 { 4.0 } else { -3.0 }, 0.0);
            tick(&mut sim, DT);
            assert!(sim.state.found() >= last_found);
            assert!(sim.state.time_remaining <= last_time);
            last_found = sim.state.found();
            last_time = sim.state.time_remaining;
        }
    }
}
