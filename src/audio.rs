//! Feedback sounds using Web Audio
//!
//! Short oscillator cues, generated on the fly.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::Outcome;

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A hider was found
    Discovery,
    /// Every hider was found
    Victory,
    /// The clock ran out
    TimeUp,
}

impl From<Outcome> for Cue {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::AllFound => Cue::Victory,
            Outcome::TimeUp => Cue::TimeUp,
        }
    }
}

const VOLUME: f32 = 0.6;

/// One note of an arpeggio
struct Note {
    freq: f32,
    offset: f64,
    length: f64,
}

pub struct AudioCues {
    ctx: Option<AudioContext>,
}

impl Default for AudioCues {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCues {
    pub fn new() -> Self {
        // Not available outside secure contexts
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("No AudioContext, sounds disabled");
        }
        Self { ctx }
    }

    /// Must be called from a user gesture before anything is audible
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, cue: Cue) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            Cue::Discovery => self.arpeggio(
                ctx,
                &sequence(&[660.0, 990.0], 0.07, 0.18),
                OscillatorType::Sine,
                0.3,
            ),
            Cue::Victory => self.arpeggio(
                ctx,
                &sequence(&[523.0, 659.0, 784.0, 1047.0], 0.12, 0.45),
                OscillatorType::Triangle,
                0.3,
            ),
            Cue::TimeUp => self.arpeggio(
                ctx,
                &sequence(&[440.0, 370.0, 311.0, 220.0], 0.2, 0.35),
                OscillatorType::Sine,
                0.3,
            ),
        }
    }

    fn voice(
        &self,
        ctx: &AudioContext,
        freq: f32,
        kind: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(kind);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        Some((osc, gain))
    }

    fn arpeggio(&self, ctx: &AudioContext, notes: &[Note], kind: OscillatorType, level: f32) {
        let now = ctx.current_time();
        for note in notes {
            let Some((osc, gain)) = self.voice(ctx, note.freq, kind) else {
                continue;
            };
            let t = now + note.offset;
            gain.gain().set_value_at_time(VOLUME * level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + note.length)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + note.length + 0.05).ok();
        }
    }
}

/// Notes played one after another, `spacing` seconds apart
fn sequence(freqs: &[f32], spacing: f64, length: f64) -> Vec<Note> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, &freq)| Note {
            freq,
            offset: i as f64 * spacing,
            length,
        })
        .collect()
}
