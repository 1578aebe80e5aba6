//! Session context
//!
//! A `GameSession` is one play-through. It owns the simulation, the rendering
//! surface, the host capabilities, the listener table and the grace timer,
//! and releases all of them at teardown. Every call after teardown is a no-op.

use std::collections::BTreeMap;

use crate::config::SessionConfig;
use crate::consts::COMPLETION_GRACE_MS;
use crate::driver::FramePass;
use crate::error::GameError;
use crate::hud::HudSnapshot;
use crate::platform::{SessionHost, Subscription, Subscriptions, TimerId};
use crate::sim::{GameEvent, GameStatus, Player, Simulation, World, tick};
use crate::surface::{ObjectId, RenderSurface, SceneObject, SurfaceProvider, Viewport};

pub struct GameSession {
    sim: Simulation,
    surface: Box<dyn RenderSurface>,
    host: Box<dyn SessionHost>,
    subscriptions: Subscriptions,
    /// Surface objects for targets still hidden, by target id
    target_objects: BTreeMap<u32, ObjectId>,
    /// Ground and obstacles
    scenery: Vec<ObjectId>,
    viewport: Viewport,
    grace_timer: Option<TimerId>,
    completion_sent: bool,
    torn_down: bool,
}

impl GameSession {
    /// Validate, acquire a surface, build the world and show the intro.
    ///
    /// Nothing is created when the config is rejected; the surface is only
    /// requested once the config has passed.
    pub fn start(
        config: &SessionConfig,
        provider: &mut dyn SurfaceProvider,
        viewport: Viewport,
        host: Box<dyn SessionHost>,
    ) -> Result<Self, GameError> {
        if let Err(e) = config.validate() {
            log::warn!("Rejected session config: {}", e);
            return Err(e.into());
        }

        let surface = provider.acquire(viewport).inspect_err(|e| {
            log::error!("Cannot start session: {}", e);
        })?;
        let sim = Simulation::new(config)?;

        let mut session = Self {
            sim,
            surface,
            host,
            subscriptions: Subscriptions::new(),
            target_objects: BTreeMap::new(),
            scenery: Vec::new(),
            viewport,
            grace_timer: None,
            completion_sent: false,
            torn_down: false,
        };
        session.populate_surface();

        log::info!(
            "Session started (seed {}, {} targets, {} obstacles)",
            session.sim.seed,
            session.sim.world.targets.len(),
            session.sim.world.obstacles.len()
        );
        Ok(session)
    }

    fn populate_surface(&mut self) {
        let world = &self.sim.world;
        let surface = &mut self.surface;

        self.scenery.push(surface.add_object(
            SceneObject::Ground {
                half_extent: world.radius,
            },
            glam::Vec3::ZERO,
        ));
        for obstacle in &world.obstacles {
            let id = surface.add_object(
                SceneObject::Obstacle {
                    kind: obstacle.kind,
                    height: obstacle.height,
                },
                obstacle.position,
            );
            self.scenery.push(id);
        }
        for target in &world.targets {
            let id = surface.add_object(SceneObject::Target { id: target.id }, target.position);
            self.target_objects.insert(target.id, id);
        }

        surface.resize(self.viewport);
        surface.set_camera(self.sim.player.position, self.sim.player.rotation());
    }

    // === Accessors ===

    pub fn status(&self) -> GameStatus {
        self.sim.state.status
    }

    pub fn message(&self) -> &str {
        &self.sim.state.message
    }

    pub fn time_remaining(&self) -> f32 {
        self.sim.state.time_remaining
    }

    pub fn found(&self) -> u32 {
        self.sim.state.found()
    }

    pub fn total_targets(&self) -> u32 {
        self.sim.state.total_targets
    }

    pub fn is_paused(&self) -> bool {
        self.sim.state.paused
    }

    pub fn player(&self) -> &Player {
        &self.sim.player
    }

    pub fn world(&self) -> &World {
        &self.sim.world
    }

    pub fn seed(&self) -> u64 {
        self.sim.seed
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::from_state(&self.sim.state)
    }

    /// Direct access for the demo autopilot and tests
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    // === Host input ===

    /// The player pressed start (or clicked to resume)
    pub fn request_start(&mut self) {
        if self.torn_down || self.sim.state.status == GameStatus::Complete {
            return;
        }
        if !self.sim.input.capture_active() {
            self.host.request_capture();
        }
    }

    /// Look-capture granted: begins the game from the intro, or resumes it
    pub fn capture_acquired(&mut self) {
        if self.torn_down || self.sim.state.status == GameStatus::Complete {
            return;
        }
        log::info!("Look-capture acquired");
        self.sim.capture_acquired();
    }

    /// Look-capture lost: a running game pauses, nothing else changes
    pub fn capture_lost(&mut self) {
        if self.torn_down {
            return;
        }
        if self.sim.state.is_running() {
            log::warn!("Look-capture lost, pausing");
        }
        self.sim.capture_lost();
    }

    pub fn key_down(&mut self, code: &str) {
        if !self.torn_down {
            self.sim.input.key_down(code);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if !self.torn_down {
            self.sim.input.key_up(code);
        }
    }

    /// Pointer movement in pixels
    pub fn look(&mut self, dx: f32, dy: f32) {
        if !self.torn_down {
            self.sim.input.add_look(dx, dy);
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.torn_down {
            return;
        }
        self.viewport = viewport;
        self.surface.resize(viewport);
    }

    /// Register a listener to be detached at teardown
    pub fn attach(&mut self, mut subscription: Box<dyn Subscription>) {
        if self.torn_down {
            subscription.detach();
            return;
        }
        self.subscriptions.attach(subscription);
    }

    // === Frame work ===

    /// Simulate one pass and apply its events
    pub fn advance(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.torn_down {
            return Vec::new();
        }
        let events = tick(&mut self.sim, dt);
        for event in &events {
            match event {
                GameEvent::Discovered(discovery) => {
                    if let Some(object) = self.target_objects.remove(&discovery.target_id) {
                        self.surface.remove_object(object);
                    }
                    self.host.on_discovery(discovery);
                }
                GameEvent::Completed(outcome) => {
                    self.host.release_capture();
                    self.host.on_finished(*outcome);
                    self.schedule_completion();
                }
            }
        }
        events
    }

    pub fn render(&mut self) {
        if self.torn_down {
            return;
        }
        self.surface
            .set_camera(self.sim.player.position, self.sim.player.rotation());
        self.surface.render_frame();
    }

    /// One (simulate, render) pair
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        let events = self.advance(dt);
        self.render();
        events
    }

    fn schedule_completion(&mut self) {
        if self.grace_timer.is_some() || self.completion_sent {
            return;
        }
        match self.host.schedule_timer(COMPLETION_GRACE_MS) {
            Some(id) => self.grace_timer = Some(id),
            None => {
                log::warn!("Host cannot schedule timers, completing immediately");
                self.notify_complete();
            }
        }
    }

    fn notify_complete(&mut self) {
        if self.completion_sent {
            return;
        }
        self.completion_sent = true;
        self.host.on_complete();
    }

    /// A host timer fired. Only the pending grace timer means anything.
    pub fn fire_timer(&mut self, id: TimerId) {
        if self.torn_down || self.grace_timer != Some(id) {
            log::debug!("Ignoring timer {:?}", id);
            return;
        }
        self.grace_timer = None;
        self.notify_complete();
    }

    // === Lifecycle ===

    /// The player quit: tear down, then tell the host
    pub fn exit(&mut self) {
        if self.torn_down {
            return;
        }
        log::info!("Session exited in {:?}", self.sim.state.status);
        self.teardown();
        self.host.on_exit();
    }

    /// The host has seen the completion; release everything
    pub fn acknowledge(&mut self) {
        self.teardown();
    }

    /// Release every resource. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(id) = self.grace_timer.take() {
            self.host.cancel_timer(id);
        }
        self.subscriptions.detach_all();
        if self.sim.input.capture_active() {
            self.host.release_capture();
        }
        self.sim.input.clear();

        for (_, object) in std::mem::take(&mut self.target_objects) {
            self.surface.remove_object(object);
        }
        for object in std::mem::take(&mut self.scenery) {
            self.surface.remove_object(object);
        }
        self.surface.release();
        log::info!("Session torn down");
    }
}

impl FramePass for GameSession {
    fn pass(&mut self, dt: f32) {
        self.frame(dt);
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
