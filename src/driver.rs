//! Render loop driver
//!
//! One (simulate, render) pass per display frame. The continuation is an
//! explicit frame request owned by the driver rather than a self re-arming
//! callback, so stopping is a single call and tests can step frames by hand.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::FIRST_FRAME_DT;
use crate::sim::clamp_dt;

/// Handle to a requested display frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub i32);

/// Source of display frames (requestAnimationFrame on the web)
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Option<FrameId>;
    fn cancel_frame(&mut self, id: FrameId);
}

/// Work done once per frame
pub trait FramePass {
    fn pass(&mut self, dt: f32);
}

/// Shared stop flag, checked at the top of every pass
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Turns monotonic timestamps (ms) into clamped frame deltas (s)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            None => FIRST_FRAME_DT,
            // A clock that runs backwards is treated as standing still
            Some(last) if now_ms <= last => 0.0,
            Some(last) => ((now_ms - last) / 1000.0) as f32,
        };
        self.last_ms = Some(self.last_ms.map_or(now_ms, |last| last.max(now_ms)));
        clamp_dt(dt)
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Drives frame passes until stopped
#[derive(Debug)]
pub struct LoopDriver<S: FrameScheduler> {
    scheduler: S,
    clock: FrameClock,
    token: CancellationToken,
    pending: Option<FrameId>,
    frames: u64,
}

impl<S: FrameScheduler> LoopDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            clock: FrameClock::new(),
            token: CancellationToken::new(),
            pending: None,
            frames: 0,
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Request the first frame
    pub fn start(&mut self) {
        if self.token.is_cancelled() || self.pending.is_some() {
            return;
        }
        self.clock.reset();
        self.pending = self.scheduler.request_frame();
    }

    /// A requested frame arrived. No-op once stopped.
    pub fn on_frame(&mut self, now_ms: f64, pass: &mut impl FramePass) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.pending = None;
        let dt = self.clock.delta(now_ms);
        self.run_pass(dt, pass);

        // The pass itself may have asked to stop
        if !self.token.is_cancelled() {
            self.pending = self.scheduler.request_frame();
        }
        true
    }

    /// Run one pass with an explicit delta, without touching the scheduler
    pub fn step(&mut self, dt: f32, pass: &mut impl FramePass) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.run_pass(clamp_dt(dt), pass);
        true
    }

    fn run_pass(&mut self, dt: f32, pass: &mut impl FramePass) {
        pass.pass(dt);
        self.frames += 1;
    }

    /// Cancel the pending frame; later deliveries are ignored
    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        log::debug!("Loop stopped after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ManualFrames {
        next: i32,
        requested: Vec<FrameId>,
        cancelled: Vec<FrameId>,
    }

    impl FrameScheduler for ManualFrames {
        fn request_frame(&mut self) -> Option<FrameId> {
            self.next += 1;
            let id = FrameId(self.next);
            self.requested.push(id);
            Some(id)
        }

        fn cancel_frame(&mut self, id: FrameId) {
            self.cancelled.push(id);
        }
    }

    #[derive(Default)]
    struct Recorder {
        deltas: Vec<f32>,
    }

    impl FramePass for Recorder {
        fn pass(&mut self, dt: f32) {
            self.deltas.push(dt);
        }
    }

    #[test]
    fn test_clock_deltas() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1000.0), FIRST_FRAME_DT);
        assert!((clock.delta(1016.0) - 0.016).abs() < 1e-6);
        // Backgrounded tab: clamped
        assert_eq!(clock.delta(6000.0), crate::consts::MAX_FRAME_DT);
        // Clock went backwards: zero, and the baseline is kept
        assert_eq!(clock.delta(5000.0), 0.0);
        assert!((clock.delta(6010.0) - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_loop_rearms_each_frame() {
        let mut driver = LoopDriver::new(ManualFrames::default());
        let mut pass = Recorder::default();
        driver.start();
        assert_eq!(driver.scheduler().requested.len(), 1);

        driver.on_frame(0.0, &mut pass);
        driver.on_frame(16.0, &mut pass);
        assert_eq!(pass.deltas.len(), 2);
        assert_eq!(driver.scheduler().requested.len(), 3);
        assert_eq!(driver.frames(), 2);
    }

    #[test]
    fn test_stop_cancels_pending_and_ignores_late_frames() {
        let mut driver = LoopDriver::new(ManualFrames::default());
        let mut pass = Recorder::default();
        driver.start();
        driver.on_frame(0.0, &mut pass);
        driver.stop();

        assert_eq!(driver.scheduler().cancelled, vec![FrameId(2)]);
        // A frame already queued by the browser still arrives
        assert!(!driver.on_frame(16.0, &mut pass));
        assert!(!driver.step(0.016, &mut pass));
        assert_eq!(pass.deltas.len(), 1);
        assert_eq!(driver.scheduler().requested.len(), 2);
        assert!(!driver.is_running());
    }

    #[test]
    fn test_token_cancel_from_inside_pass() {
        struct Quitter(CancellationToken);
        impl FramePass for Quitter {
            fn pass(&mut self, _dt: f32) {
                self.0.cancel();
            }
        }

        let mut driver = LoopDriver::new(ManualFrames::default());
        let mut pass = Quitter(driver.token());
        driver.start();
        driver.on_frame(0.0, &mut pass);
        // No continuation requested after the pass cancelled
        assert_eq!(driver.scheduler().requested.len(), 1);
    }

    #[test]
    fn test_step_clamps() {
        let mut driver = LoopDriver::new(ManualFrames::default());
        let mut pass = Recorder::default();
        driver.step(3.0, &mut pass);
        assert_eq!(pass.deltas, vec![crate::consts::MAX_FRAME_DT]);
        assert!(driver.scheduler().requested.is_empty());
    }
}
