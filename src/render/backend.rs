//! The seam between pipeline logic and the GPU.
//!
//! `Renderer` only talks to a `GraphicsBackend`, so the two-pass state
//! machine, the program cache and the buffer cache can run against a
//! recording backend in tests. `WebGlBackend` is the browser
//! implementation.

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use crate::config::GlFeatures;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

/// Canvas backing-store size (framebuffer pixels) and displayed size
/// (CSS pixels).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CanvasSize {
    pub backing: UVec2,
    pub display: Vec2,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32, display_width: f32, display_height: f32) -> Self {
        Self {
            backing: UVec2::new(width, height),
            display: Vec2::new(display_width, display_height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.backing.x == 0 || self.backing.y == 0
    }
}

pub trait GraphicsBackend {
    type Program;
    type Uniform;
    type Buffer;
    type Target;

    /// One-time GL state: depth test, culling, polygon offset, clear colour.
    fn configure(&self, features: &GlFeatures, clear_color: [f32; 4]);

    /// Compile, link and validate a program. Errors carry the driver log.
    fn compile_program(&self, alias: &str, vertex: &str, fragment: &str) -> Result<Self::Program>;
    fn use_program(&self, program: &Self::Program);
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Uniform>;
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn set_mat4(&self, location: &Self::Uniform, value: &Mat4);
    fn set_vec3(&self, location: &Self::Uniform, value: Vec3);
    fn set_vec4(&self, location: &Self::Uniform, value: Vec4);

    fn create_buffer(&self) -> Result<Self::Buffer>;
    /// Replace the whole contents of a vertex buffer.
    fn upload_vertices(&self, buffer: &Self::Buffer, data: &[f32]);
    /// Replace the whole contents of an index buffer.
    fn upload_indices(&self, buffer: &Self::Buffer, data: &[u32]);
    fn bind_attribute(&self, buffer: &Self::Buffer, location: u32, components: i32);
    fn bind_indices(&self, buffer: &Self::Buffer);
    fn draw(&self, primitive: Primitive, count: usize);
    fn polygon_offset(&self, factor: f32, units: f32);

    /// Off-screen colour + depth target.
    fn create_target(&self, width: u32, height: u32) -> Result<Self::Target>;
    fn resize_target(&self, target: &Self::Target, width: u32, height: u32) -> Result<()>;
    /// Bind `target` (or the canvas for `None`) and set the viewport.
    fn bind_target(&self, target: Option<&Self::Target>, width: u32, height: u32);
    fn clear(&self, color: [f32; 4], depth: bool);
    /// RGBA bytes of one pixel of the bound target, origin bottom-left.
    fn read_pixel(&self, x: u32, y: u32) -> Result<[u8; 4]>;

    fn canvas_size(&self) -> CanvasSize;
}
