//! Canvas 2D surface
//!
//! A small software projector: each object is projected through the camera
//! and drawn as a flat sprite, far to near. Good enough to play in any
//! browser without a GPU context.

use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3, Vec4};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{ObjectId, RenderSurface, SceneObject, SurfaceProvider, Viewport};
use crate::error::GameError;
use crate::sim::ObstacleKind;

const FOV_Y: f32 = 75.0 * (std::f32::consts::PI / 180.0);
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

const SKY: &str = "#87ceeb";
const GRASS: &str = "#3a7d44";
const TRUNK: &str = "#8b4513";
const LEAVES: &str = "#228b22";
const ROCK: &str = "#808080";
const HIDER_COLORS: [&str; 5] = ["#ff6b6b", "#4ecdc4", "#ffd93d", "#a66cff", "#ff9f43"];

/// Creates a `<canvas>` inside a container element
pub struct CanvasProvider {
    container_id: String,
}

impl CanvasProvider {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

fn unavailable(what: &str) -> GameError {
    GameError::SurfaceUnavailable(what.to_string())
}

impl SurfaceProvider for CanvasProvider {
    fn acquire(&mut self, viewport: Viewport) -> Result<Box<dyn RenderSurface>, GameError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| unavailable("no document"))?;
        let container = document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| unavailable(&format!("no element #{}", self.container_id)))?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| unavailable("cannot create canvas"))?
            .dyn_into()
            .map_err(|_| unavailable("not a canvas"))?;
        canvas.set_class_name("hide-and-seek-canvas");
        container
            .append_child(&canvas)
            .map_err(|_| unavailable("cannot attach canvas"))?;

        let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
            Ok(Some(ctx)) => ctx
                .dyn_into()
                .map_err(|_| unavailable("unexpected 2d context type"))?,
            _ => {
                canvas.remove();
                return Err(unavailable("2d context unavailable"));
            }
        };

        let mut surface = CanvasSurface {
            canvas,
            ctx,
            objects: BTreeMap::new(),
            next_id: 0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            camera: Vec3::ZERO,
            heading: Vec3::NEG_Z,
            viewport,
            released: false,
        };
        surface.resize(viewport);
        log::info!("Canvas surface {}x{}", viewport.width, viewport.height);
        Ok(Box::new(surface))
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    objects: BTreeMap<ObjectId, (SceneObject, Vec3)>,
    next_id: u32,
    view: Mat4,
    proj: Mat4,
    camera: Vec3,
    /// Level view direction, used for the horizon
    heading: Vec3,
    viewport: Viewport,
    released: bool,
}

/// A projected sprite, ready to draw
struct Sprite {
    depth: f32,
    x: f64,
    y: f64,
    /// Pixels per world unit at this depth
    scale: f64,
    object: SceneObject,
}

impl CanvasSurface {
    fn to_screen(&self, world: Vec3) -> Option<(f64, f64, f32)> {
        let eye = self.view * Vec4::new(world.x, world.y, world.z, 1.0);
        let depth = -eye.z;
        if depth <= NEAR {
            return None;
        }
        let clip = self.proj * eye;
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x as f64 + 1.0) * 0.5 * self.viewport.width as f64;
        let y = (1.0 - ndc.y as f64) * 0.5 * self.viewport.height as f64;
        Some((x, y, depth))
    }

    fn focal_px(&self) -> f64 {
        self.viewport.height as f64 * 0.5 / (FOV_Y as f64 * 0.5).tan()
    }

    fn draw_backdrop(&self) {
        let (w, h) = (self.viewport.width as f64, self.viewport.height as f64);
        self.ctx.set_fill_style_str(SKY);
        self.ctx.fill_rect(0.0, 0.0, w, h);

        let far = self.camera + self.heading * FAR * 0.9;
        let horizon = self
            .to_screen(Vec3::new(far.x, 0.0, far.z))
            .map_or(h * 0.5, |(_, y, _)| y.clamp(0.0, h));
        self.ctx.set_fill_style_str(GRASS);
        self.ctx.fill_rect(0.0, horizon, w, h - horizon);
    }

    fn draw_sprite(&self, sprite: &Sprite) {
        let ctx = &self.ctx;
        let s = sprite.scale;
        match sprite.object {
            SceneObject::Ground { .. } => {}
            SceneObject::Obstacle {
                kind: ObstacleKind::Tree,
                height,
            } => {
                let h = height as f64 * s;
                let trunk_w = 0.4 * s;
                ctx.set_fill_style_str(TRUNK);
                ctx.fill_rect(sprite.x - trunk_w / 2.0, sprite.y - h * 0.45, trunk_w, h * 0.45);
                ctx.set_fill_style_str(LEAVES);
                ctx.begin_path();
                ctx.move_to(sprite.x, sprite.y - h);
                ctx.line_to(sprite.x - 1.5 * s, sprite.y - h * 0.35);
                ctx.line_to(sprite.x + 1.5 * s, sprite.y - h * 0.35);
                ctx.close_path();
                ctx.fill();
            }
            SceneObject::Obstacle {
                kind: ObstacleKind::Rock { scale },
                ..
            } => {
                ctx.set_fill_style_str(ROCK);
                ctx.begin_path();
                let _ = ctx.arc(
                    sprite.x,
                    sprite.y,
                    (scale as f64 * s).max(1.0),
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
            SceneObject::Target { id } => {
                let color = HIDER_COLORS[id as usize % HIDER_COLORS.len()];
                ctx.set_fill_style_str(color);
                ctx.fill_rect(sprite.x - 0.3 * s, sprite.y - 1.2 * s, 0.6 * s, 1.2 * s);
                ctx.begin_path();
                let _ = ctx.arc(
                    sprite.x,
                    sprite.y - 1.45 * s,
                    (0.25 * s).max(1.0),
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
        }
    }
}

impl RenderSurface for CanvasSurface {
    fn add_object(&mut self, object: SceneObject, position: Vec3) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, (object, position));
        id
    }

    fn remove_object(&mut self, id: ObjectId) {
        self.objects.remove(&id);
    }

    fn set_position(&mut self, id: ObjectId, position: Vec3) {
        if let Some(entry) = self.objects.get_mut(&id) {
            entry.1 = position;
        }
    }

    fn set_camera(&mut self, position: Vec3, rotation: Quat) {
        self.camera = position;
        self.view = Mat4::from_rotation_translation(rotation, position).inverse();
        let look = rotation * Vec3::NEG_Z;
        let level = Vec3::new(look.x, 0.0, look.z);
        if level.length_squared() > 1e-6 {
            self.heading = level.normalize();
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        self.proj = Mat4::perspective_rh(FOV_Y, viewport.aspect(), NEAR, FAR);
    }

    fn render_frame(&mut self) {
        if self.released {
            return;
        }
        self.draw_backdrop();

        let focal = self.focal_px();
        let mut sprites: Vec<Sprite> = self
            .objects
            .values()
            .filter(|(object, _)| !matches!(object, SceneObject::Ground { .. }))
            .filter_map(|&(object, position)| {
                // Sprites stand on the ground
                let base = Vec3::new(position.x, 0.0, position.z);
                let (x, y, depth) = self.to_screen(base)?;
                Some(Sprite {
                    depth,
                    x,
                    y,
                    scale: focal / depth as f64,
                    object,
                })
            })
            .collect();
        sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for sprite in &sprites {
            self.draw_sprite(sprite);
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.objects.clear();
        self.canvas.remove();
        log::debug!("Canvas surface released");
    }
}
