//! Demo mode - the game plays itself
//!
//! Turns toward the nearest target still hidden and walks. When an obstacle
//! eats most of the step it also strafes so axis sliding carries it around.

use glam::Vec3;

use super::bounds::ground;
use super::tick::Simulation;
use super::world::HiddenTarget;

const FORWARD_KEY: &str = "KeyW";
const STRAFE_KEY: &str = "KeyD";
/// Fraction of full speed below which the autopilot considers itself blocked
const BLOCKED_RATIO: f32 = 0.5;

/// Nearest target not yet discovered
pub fn nearest_hidden<'a>(sim: &'a Simulation, from: Vec3) -> Option<&'a HiddenTarget> {
    sim.world
        .targets
        .iter()
        .filter(|t| !sim.state.discovered.contains(&t.id))
        .min_by(|a, b| {
            let da = ground(a.position).distance(ground(from));
            let db = ground(b.position).distance(ground(from));
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Set up input for the next tick. Returns the id being chased, if any.
pub fn drive(sim: &mut Simulation) -> Option<u32> {
    let Some(target) = nearest_hidden(sim, sim.player.position).cloned() else {
        sim.input.key_up(FORWARD_KEY);
        sim.input.key_up(STRAFE_KEY);
        return None;
    };

    sim.player.face_towards(target.position);
    sim.input.key_down(FORWARD_KEY);

    let blocked = sim.player.velocity.length() < sim.params.movement_speed * BLOCKED_RATIO;
    if blocked {
        sim.input.key_down(STRAFE_KEY);
    } else {
        sim.input.key_up(STRAFE_KEY);
    }

    Some(target.id)
}
