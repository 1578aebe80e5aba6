//! Surface that draws nothing
//!
//! Keeps the scene in memory so sessions can run without a display (native
//! demo runs, tests). The scene is shared so it stays inspectable after the
//! surface has been boxed and handed to a session.

use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{ObjectId, RenderSurface, SceneObject, SurfaceProvider, Viewport};
use crate::error::GameError;

/// Everything a headless surface has been told
#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub objects: BTreeMap<ObjectId, (SceneObject, Vec3)>,
    pub camera: Option<(Vec3, Quat)>,
    pub viewport: Option<Viewport>,
    pub frames: u64,
    pub released: bool,
}

impl HeadlessScene {
    pub fn target_count(&self) -> usize {
        self.objects
            .values()
            .filter(|(o, _)| matches!(o, SceneObject::Target { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    scene: Rc<RefCell<HeadlessScene>>,
    next_id: u32,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the scene
    pub fn scene(&self) -> Rc<RefCell<HeadlessScene>> {
        self.scene.clone()
    }
}

impl RenderSurface for HeadlessSurface {
    fn add_object(&mut self, object: SceneObject, position: Vec3) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.scene.borrow_mut().objects.insert(id, (object, position));
        id
    }

    fn remove_object(&mut self, id: ObjectId) {
        self.scene.borrow_mut().objects.remove(&id);
    }

    fn set_position(&mut self, id: ObjectId, position: Vec3) {
        if let Some(entry) = self.scene.borrow_mut().objects.get_mut(&id) {
            entry.1 = position;
        }
    }

    fn set_camera(&mut self, position: Vec3, rotation: Quat) {
        self.scene.borrow_mut().camera = Some((position, rotation));
    }

    fn resize(&mut self, viewport: Viewport) {
        self.scene.borrow_mut().viewport = Some(viewport);
    }

    fn render_frame(&mut self) {
        self.scene.borrow_mut().frames += 1;
    }

    fn release(&mut self) {
        let mut scene = self.scene.borrow_mut();
        scene.objects.clear();
        scene.released = true;
    }
}

/// Hands out headless surfaces; optionally refuses, to exercise the failure path
#[derive(Debug, Default)]
pub struct HeadlessProvider {
    pub unavailable: bool,
    /// Scene of the most recently acquired surface
    pub last_scene: Option<Rc<RefCell<HeadlessScene>>>,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            last_scene: None,
        }
    }
}

impl SurfaceProvider for HeadlessProvider {
    fn acquire(&mut self, viewport: Viewport) -> Result<Box<dyn RenderSurface>, GameError> {
        if self.unavailable {
            return Err(GameError::SurfaceUnavailable(
                "headless surface disabled".to_string(),
            ));
        }
        let mut surface = HeadlessSurface::new();
        surface.resize(viewport);
        self.last_scene = Some(surface.scene());
        Ok(Box::new(surface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_objects() {
        let mut surface = HeadlessSurface::new();
        let scene = surface.scene();
        let a = surface.add_object(SceneObject::Target { id: 0 }, Vec3::X);
        let b = surface.add_object(SceneObject::Ground { half_extent: 50.0 }, Vec3::ZERO);
        assert_ne!(a, b);
        assert_eq!(scene.borrow().target_count(), 1);

        surface.set_position(a, Vec3::Y);
        assert_eq!(scene.borrow().objects[&a].1, Vec3::Y);

        surface.remove_object(a);
        assert_eq!(scene.borrow().target_count(), 0);

        surface.render_frame();
        surface.release();
        assert_eq!(scene.borrow().frames, 1);
        assert!(scene.borrow().released);
        assert!(scene.borrow().objects.is_empty());
    }

    #[test]
    fn test_provider_failure() {
        let mut provider = HeadlessProvider::unavailable();
        assert!(matches!(
            provider.acquire(Viewport::new(800, 600)),
            Err(GameError::SurfaceUnavailable(_))
        ));
    }
}
