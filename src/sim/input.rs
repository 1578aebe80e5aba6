//! Live keyboard and look state
//!
//! Raw key codes (`KeyboardEvent.code`) are folded into four movement actions.
//! Every physical key is tracked on its own, so holding `KeyW` and `ArrowUp`
//! and releasing one keeps moving forward.

use glam::Vec2;
use std::collections::BTreeSet;

/// Logical movement actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveAction {
    Forward,
    Back,
    Left,
    Right,
}

impl MoveAction {
    /// Map a key code to an action; anything else is ignored
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(MoveAction::Forward),
            "KeyS" | "ArrowDown" => Some(MoveAction::Back),
            "KeyA" | "ArrowLeft" => Some(MoveAction::Left),
            "KeyD" | "ArrowRight" => Some(MoveAction::Right),
            _ => None,
        }
    }
}

/// Pressed keys plus pending look movement
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<(MoveAction, String)>,
    look: Vec2,
    capture_active: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns false for keys that are not tracked.
    pub fn key_down(&mut self, code: &str) -> bool {
        match MoveAction::from_code(code) {
            Some(action) => {
                self.held.insert((action, code.to_string()));
                true
            }
            None => false,
        }
    }

    /// Record a key release
    pub fn key_up(&mut self, code: &str) -> bool {
        match MoveAction::from_code(code) {
            Some(action) => {
                self.held.remove(&(action, code.to_string()));
                true
            }
            None => false,
        }
    }

    pub fn pressed(&self, action: MoveAction) -> bool {
        self.held.iter().any(|(a, _)| *a == action)
    }

    /// Release everything (keys released while unfocused never arrive)
    pub fn clear(&mut self) {
        self.held.clear();
        self.look = Vec2::ZERO;
    }

    /// Movement intent as (strafe, forward), each in -1..=1
    pub fn move_axes(&self) -> Vec2 {
        let axis = |pos: MoveAction, neg: MoveAction| {
            (self.pressed(pos) as i8 - self.pressed(neg) as i8) as f32
        };
        Vec2::new(
            axis(MoveAction::Right, MoveAction::Left),
            axis(MoveAction::Forward, MoveAction::Back),
        )
    }

    pub fn capture_active(&self) -> bool {
        self.capture_active
    }

    /// Look-capture toggled by the host; pending look movement is dropped either way
    pub fn set_capture(&mut self, active: bool) {
        self.capture_active = active;
        self.look = Vec2::ZERO;
    }

    /// Accumulate pointer movement (pixels). Ignored without capture.
    pub fn add_look(&mut self, dx: f32, dy: f32) {
        if self.capture_active {
            self.look += Vec2::new(dx, dy);
        }
    }

    /// Take the look movement gathered since the last tick
    pub fn take_look(&mut self) -> Vec2 {
        std::mem::take(&mut self.look)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_ignored() {
        let mut input = InputState::new();
        assert!(!input.key_down("KeyQ"));
        assert!(!input.key_up("Space"));
        assert_eq!(input.move_axes(), Vec2::ZERO);
    }

    #[test]
    fn test_forward_and_strafe() {
        let mut input = InputState::new();
        input.key_down("KeyW");
        input.key_down("KeyD");
        assert_eq!(input.move_axes(), Vec2::new(1.0, 1.0));
        input.key_up("KeyW");
        assert_eq!(input.move_axes(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = InputState::new();
        input.key_down("KeyA");
        input.key_down("KeyD");
        assert_eq!(input.move_axes().x, 0.0);
    }

    #[test]
    fn test_aliased_keys_tracked_separately() {
        let mut input = InputState::new();
        input.key_down("KeyW");
        input.key_down("ArrowUp");
        input.key_up("KeyW");
        assert!(input.pressed(MoveAction::Forward));
        input.key_up("ArrowUp");
        assert!(!input.pressed(MoveAction::Forward));
    }

    #[test]
    fn test_movement_tracked_without_capture() {
        let mut input = InputState::new();
        assert!(!input.capture_active());
        input.key_down("KeyS");
        assert!(input.pressed(MoveAction::Back));
    }

    #[test]
    fn test_look_needs_capture() {
        let mut input = InputState::new();
        input.add_look(10.0, 5.0);
        assert_eq!(input.take_look(), Vec2::ZERO);

        input.set_capture(true);
        input.add_look(10.0, 5.0);
        input.add_look(2.0, -1.0);
        assert_eq!(input.take_look(), Vec2::new(12.0, 4.0));
        assert_eq!(input.take_look(), Vec2::ZERO);
    }
}
