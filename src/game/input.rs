//! Orbit camera and pointer state.
//!
//! Handlers are called synchronously from DOM events; the frame reads the
//! cursor and writes back the latest picking result.

use glam::{Mat4, Vec2};

use crate::config::ZoomSettings;
use crate::math::transform;
use crate::render::CanvasSize;
use crate::scene::EntityId;

/// Radians of rotation for a drag across the full canvas height.
pub const DRAG_SPAN: f32 = 10.0;
/// Zoom change per wheel delta unit.
pub const WHEEL_ZOOM: f32 = 0.001;
/// Zoom change per arrow key press.
pub const KEY_ZOOM: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub angle_x: f32,
    pub angle_y: f32,
    zoom: ZoomSettings,
}

impl Camera {
    pub fn new(zoom: ZoomSettings) -> Self {
        Self {
            angle_x: 0.0,
            angle_y: 0.0,
            zoom,
        }
    }

    /// Distance from the dish centre.
    pub fn zoom(&self) -> f32 {
        self.zoom.val
    }

    pub fn set_zoom(&mut self, val: f32) {
        self.zoom.set(val);
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.set_zoom(self.zoom.val + delta);
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.angle_y += dx;
        self.angle_x += dy;
    }

    pub fn view_matrix(&self) -> Mat4 {
        transform::orbit_view(self.angle_x, self.angle_y, self.zoom.val)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    dragging: bool,
    cursor: Option<Vec2>,
    hit: Option<EntityId>,
}

impl InputState {
    /// Last cursor position in canvas CSS pixels.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Entity under the cursor as of the last picking pass.
    pub fn hit(&self) -> Option<EntityId> {
        self.hit
    }

    pub fn set_hit(&mut self, hit: Option<EntityId>) {
        self.hit = hit;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn mouse_move(&mut self, camera: &mut Camera, pos: Vec2, size: CanvasSize) {
        if self.dragging && size.backing.y > 0 {
            if let Some(last) = self.cursor {
                let factor = DRAG_SPAN / size.backing.y as f32;
                let delta = pos - last;
                camera.rotate(delta.x * factor, delta.y * factor);
            }
        }
        self.cursor = Some(pos);
    }

    /// Starts a drag if `pos` is on the canvas. Returns whether it did.
    pub fn mouse_down(&mut self, pos: Vec2, size: CanvasSize) -> bool {
        let inside = pos.cmpge(Vec2::ZERO).all() && pos.cmplt(size.display).all();
        if inside {
            self.dragging = true;
            self.cursor = Some(pos);
        }
        inside
    }

    pub fn mouse_up(&mut self) {
        self.dragging = false;
    }

    pub fn wheel(&mut self, camera: &mut Camera, delta_y: f32) {
        if delta_y.is_finite() {
            camera.zoom_by(delta_y * WHEEL_ZOOM);
        }
    }

    /// Arrow keys zoom. Returns whether the key was handled.
    pub fn key_down(&mut self, camera: &mut Camera, code: &str) -> bool {
        match code {
            "ArrowUp" => camera.zoom_by(-KEY_ZOOM),
            "ArrowDown" => camera.zoom_by(KEY_ZOOM),
            _ => return false,
        }
        true
    }
}
