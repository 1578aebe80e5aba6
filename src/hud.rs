//! HUD text, derived from session state each frame

use serde::Serialize;

use crate::sim::{GameStatus, SessionState};

/// Format seconds as `m:ss` (floored)
pub fn format_time(secs: f32) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Everything the overlay shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub time: String,
    pub found: String,
    pub message: String,
    pub show_intro: bool,
    pub show_complete: bool,
    pub show_crosshair: bool,
    /// Final summary, present once complete
    pub summary: Option<String>,
}

impl HudSnapshot {
    pub fn from_state(state: &SessionState) -> Self {
        let complete = state.status == GameStatus::Complete;
        let summary = complete.then(|| {
            format!(
                "You found {} out of {} hiders\nTime: {}",
                state.found(),
                state.total_targets,
                format_time(state.elapsed())
            )
        });
        Self {
            time: format!("Time: {}", format_time(state.time_remaining)),
            found: format!("Found: {}/{}", state.found(), state.total_targets),
            message: state.message.clone(),
            show_intro: state.status == GameStatus::Intro,
            show_complete: complete,
            show_crosshair: state.is_running(),
            summary,
        }
    }
}
