//! Session lifecycle and scoring state
//!
//! The status only ever moves forward: `Intro` -> `Playing` -> `Complete`.
//! The timer runs only while playing with look-capture held.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::detection::Discovery;

pub const MSG_INTRO: &str = "Find all the hidden characters!";
pub const MSG_FIRST_FOUND: &str = "You found your first hider! Keep looking!";
pub const MSG_ONE_LEFT: &str = "Just one more to find!";
pub const MSG_ALL_FOUND: &str = "Congratulations! You found all the hiders!";
pub const MSG_PAUSED: &str = "Game paused. Click to resume.";

/// Lifecycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the player to start (acquire look-capture)
    Intro,
    /// Timer running, input live
    Playing,
    /// Terminal; timer frozen, input inert
    Complete,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    AllFound,
    TimeUp,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Discovered(Discovery),
    Completed(Outcome),
}

/// Session state - single source of truth for the lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: GameStatus,
    pub time_limit: f32,
    pub time_remaining: f32,
    pub discovered: BTreeSet<u32>,
    pub total_targets: u32,
    pub message: String,
    pub outcome: Option<Outcome>,
    /// Whether the session is paused for lack of look-capture
    pub paused: bool,
    /// Message to restore once capture comes back
    resume_message: Option<String>,
}

impl SessionState {
    pub fn new(total_targets: u32, time_limit: f32) -> Self {
        Self {
            status: GameStatus::Intro,
            time_limit,
            time_remaining: time_limit,
            discovered: BTreeSet::new(),
            total_targets,
            message: MSG_INTRO.to_string(),
            outcome: None,
            paused: false,
            resume_message: None,
        }
    }

    pub fn found(&self) -> u32 {
        self.discovered.len() as u32
    }

    pub fn remaining(&self) -> u32 {
        self.total_targets.saturating_sub(self.found())
    }

    /// Seconds used so far
    pub fn elapsed(&self) -> f32 {
        self.time_limit - self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Playing && !self.paused
    }

    /// `Intro` -> `Playing`. Any other status ignores the signal.
    pub fn begin(&mut self) -> bool {
        if self.status != GameStatus::Intro {
            log::debug!("Ignoring begin in {:?}", self.status);
            return false;
        }
        self.status = GameStatus::Playing;
        self.paused = false;
        log::info!("Session playing ({} targets, {}s)", self.total_targets, self.time_limit);
        true
    }

    /// Capture lost mid-game: pause without changing status
    pub fn pause(&mut self) {
        if self.status != GameStatus::Playing || self.paused {
            return;
        }
        self.paused = true;
        self.resume_message = Some(std::mem::replace(
            &mut self.message,
            MSG_PAUSED.to_string(),
        ));
    }

    /// Capture regained mid-game
    pub fn resume(&mut self) {
        if self.status != GameStatus::Playing || !self.paused {
            return;
        }
        self.paused = false;
        if let Some(msg) = self.resume_message.take() {
            self.message = msg;
        }
    }

    /// Update the progress message for a fresh discovery
    pub fn note_discovery(&mut self, discovery: &Discovery) {
        self.message = if discovery.found == 1 {
            MSG_FIRST_FOUND.to_string()
        } else if discovery.found + 1 == self.total_targets {
            MSG_ONE_LEFT.to_string()
        } else {
            format!(
                "You found a hider! {} remaining.",
                self.total_targets.saturating_sub(discovery.found)
            )
        };
    }

    /// Count the timer down, never below zero
    pub fn advance_timer(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }
        self.time_remaining = (self.time_remaining - dt.max(0.0)).max(0.0);
    }

    /// Check the end conditions; all-found wins over time-up
    pub fn resolve(&mut self) -> Option<Outcome> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let outcome = if self.found() >= self.total_targets {
            Outcome::AllFound
        } else if self.time_remaining <= 0.0 {
            Outcome::TimeUp
        } else {
            return None;
        };
        self.complete(outcome);
        Some(outcome)
    }

    fn complete(&mut self, outcome: Outcome) {
        self.status = GameStatus::Complete;
        self.outcome = Some(outcome);
        self.paused = false;
        self.resume_message = None;
        self.message = match outcome {
            Outcome::AllFound => MSG_ALL_FOUND.to_string(),
            Outcome::TimeUp => format!(
                "Time's up! You found {} out of {} hiders.",
                self.found(),
                self.total_targets
            ),
        };
        log::info!("Session complete: {:?} ({}/{})", outcome, self.found(), self.total_targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery(found: u32, total: u32) -> Discovery {
        Discovery {
            target_id: found - 1,
            found,
            total,
        }
    }

    #[test]
    fn test_starts_in_intro() {
        let state = SessionState::new(5, 120.0);
        assert_eq!(state.status, GameStatus::Intro);
        assert_eq!(state.message, MSG_INTRO);
        assert_eq!(state.time_remaining, 120.0);
    }

    #[test]
    fn test_intro_only_reaches_playing() {
        let mut state = SessionState::new(5, 120.0);
        // Nothing resolves before the game begins
        state.time_remaining = 0.0;
        assert_eq!(state.resolve(), None);
        assert_eq!(state.status, GameStatus::Intro);

        let mut state = SessionState::new(5, 120.0);
        assert!(state.begin());
        assert_eq!(state.status, GameStatus::Playing);
        assert!(!state.begin());
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut state = SessionState::new(1, 10.0);
        state.begin();
        state.discovered.insert(0);
        assert_eq!(state.resolve(), Some(Outcome::AllFound));
        assert!(!state.begin());
        state.pause();
        assert!(!state.paused);
        assert_eq!(state.resolve(), None);
        assert_eq!(state.status, GameStatus::Complete);
    }

    #[test]
    fn test_timer_frozen_outside_play() {
        let mut state = SessionState::new(5, 10.0);
        state.advance_timer(1.0);
        assert_eq!(state.time_remaining, 10.0);

        state.begin();
        state.advance_timer(1.0);
        assert_eq!(state.time_remaining, 9.0);

        state.pause();
        state.advance_timer(1.0);
        assert_eq!(state.time_remaining, 9.0);
    }

    #[test]
    fn test_timer_floors_at_zero() {
        let mut state = SessionState::new(5, 1.0);
        state.begin();
        state.advance_timer(5.0);
        assert_eq!(state.time_remaining, 0.0);
        assert_eq!(state.resolve(), Some(Outcome::TimeUp));
        assert_eq!(state.message, "Time's up! You found 0 out of 5 hiders.");
    }

    #[test]
    fn test_all_found_beats_time_up() {
        let mut state = SessionState::new(2, 1.0);
        state.begin();
        state.discovered.extend([0, 1]);
        state.advance_timer(2.0);
        assert_eq!(state.resolve(), Some(Outcome::AllFound));
        assert_eq!(state.message, MSG_ALL_FOUND);
    }

    #[test]
    fn test_pause_and_resume_restore_message() {
        let mut state = SessionState::new(5, 60.0);
        state.begin();
        state.note_discovery(&discovery(1, 5));
        state.pause();
        assert_eq!(state.message, MSG_PAUSED);
        assert_eq!(state.status, GameStatus::Playing);
        state.resume();
        assert_eq!(state.message, MSG_FIRST_FOUND);
    }

    #[test]
    fn test_discovery_messages() {
        let mut state = SessionState::new(5, 60.0);
        state.note_discovery(&discovery(1, 5));
        assert_eq!(state.message, MSG_FIRST_FOUND);
        state.note_discovery(&discovery(2, 5));
        assert_eq!(state.message, "You found a hider! 3 remaining.");
        state.note_discovery(&discovery(4, 5));
        assert_eq!(state.message, MSG_ONE_LEFT);
    }
}
