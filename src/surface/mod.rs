//! Abstract 3D rendering surface
//!
//! The session drives rendering through four verbs: add an object, remove
//! it, move it, draw a frame. How objects look is the surface's business.

mod headless;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use headless::{HeadlessProvider, HeadlessScene, HeadlessSurface};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::sim::ObstacleKind;

/// Handle to an object added to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Host viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; a collapsed viewport reports 1
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// What an object represents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneObject {
    Ground { half_extent: f32 },
    Obstacle { kind: ObstacleKind, height: f32 },
    Target { id: u32 },
}

/// Rendering capability supplied by the host
pub trait RenderSurface {
    fn add_object(&mut self, object: SceneObject, position: Vec3) -> ObjectId;
    fn remove_object(&mut self, id: ObjectId);
    fn set_position(&mut self, id: ObjectId, position: Vec3);
    fn set_camera(&mut self, position: Vec3, rotation: Quat);
    fn resize(&mut self, viewport: Viewport);
    fn render_frame(&mut self);
    /// Drop every buffer and detach from the page. Called once, at teardown.
    fn release(&mut self);
}

/// Acquires a rendering surface for a new session
pub trait SurfaceProvider {
    fn acquire(&mut self, viewport: Viewport) -> Result<Box<dyn RenderSurface>, GameError>;
}
