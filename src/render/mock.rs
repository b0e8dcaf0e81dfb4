//! Recording backend for pipeline tests.

use std::cell::{Cell, RefCell};

use glam::{Mat4, Vec3, Vec4};

use super::backend::{CanvasSize, GraphicsBackend, Primitive};
use crate::config::GlFeatures;
use crate::error::{Error, Result, ShaderStage};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Configure,
    Compile(String),
    UseProgram(String),
    SetMat4(String),
    SetVec3(String, Vec3),
    SetVec4(String, Vec4),
    CreateBuffer(u32),
    UploadVertices { buffer: u32, len: usize },
    UploadIndices { buffer: u32, len: usize },
    BindAttribute { buffer: u32, location: u32, components: i32 },
    BindIndices(u32),
    Draw(Primitive, usize),
    PolygonOffset(f32, f32),
    CreateTarget(u32, u32),
    ResizeTarget(u32, u32),
    BindTarget { offscreen: bool, width: u32, height: u32 },
    Clear([f32; 4]),
    ReadPixel(u32, u32),
}

#[derive(Clone, Debug)]
pub struct MockProgram {
    pub alias: String,
    source: String,
}

pub struct MockBackend {
    calls: RefCell<Vec<Call>>,
    next_handle: Cell<u32>,
    pixel: Cell<[u8; 4]>,
    size: Cell<CanvasSize>,
    failing: RefCell<Option<String>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
            pixel: Cell::new([0; 4]),
            size: Cell::new(CanvasSize::new(200, 100, 200.0, 100.0)),
            failing: RefCell::new(None),
        }
    }

    /// Pixel returned by every read-back.
    pub fn set_pixel(&self, pixel: [u8; 4]) {
        self.pixel.set(pixel);
    }

    pub fn set_size(&self, size: CanvasSize) {
        self.size.set(size);
    }

    /// Make compilation of `alias` fail.
    pub fn fail_alias(&self, alias: &str) {
        *self.failing.borrow_mut() = Some(alias.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn handle(&self) -> u32 {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        h
    }
}

impl GraphicsBackend for MockBackend {
    type Program = MockProgram;
    type Uniform = String;
    type Buffer = u32;
    type Target = u32;

    fn configure(&self, _features: &GlFeatures, _clear_color: [f32; 4]) {
        self.record(Call::Configure);
    }

    fn compile_program(&self, alias: &str, vertex: &str, fragment: &str) -> Result<MockProgram> {
        self.record(Call::Compile(alias.to_owned()));
        if self.failing.borrow().as_deref() == Some(alias) {
            return Err(Error::ShaderCompile {
                alias: alias.to_owned(),
                stage: ShaderStage::Fragment,
                log: "ERROR: 0:1: syntax error".to_owned(),
            });
        }
        Ok(MockProgram {
            alias: alias.to_owned(),
            source: format!("{vertex}{fragment}"),
        })
    }

    fn use_program(&self, program: &MockProgram) {
        self.record(Call::UseProgram(program.alias.clone()));
    }

    fn uniform_location(&self, program: &MockProgram, name: &str) -> Option<String> {
        program.source.contains(name).then(|| name.to_owned())
    }

    fn attrib_location(&self, program: &MockProgram, name: &str) -> Option<u32> {
        program.source.find(name).map(|offset| offset as u32)
    }

    fn set_mat4(&self, location: &String, _value: &Mat4) {
        self.record(Call::SetMat4(location.clone()));
    }

    fn set_vec3(&self, location: &String, value: Vec3) {
        self.record(Call::SetVec3(location.clone(), value));
    }

    fn set_vec4(&self, location: &String, value: Vec4) {
        self.record(Call::SetVec4(location.clone(), value));
    }

    fn create_buffer(&self) -> Result<u32> {
        let h = self.handle();
        self.record(Call::CreateBuffer(h));
        Ok(h)
    }

    fn upload_vertices(&self, buffer: &u32, data: &[f32]) {
        self.record(Call::UploadVertices { buffer: *buffer, len: data.len() });
    }

    fn upload_indices(&self, buffer: &u32, data: &[u32]) {
        self.record(Call::UploadIndices { buffer: *buffer, len: data.len() });
    }

    fn bind_attribute(&self, buffer: &u32, location: u32, components: i32) {
        self.record(Call::BindAttribute { buffer: *buffer, location, components });
    }

    fn bind_indices(&self, buffer: &u32) {
        self.record(Call::BindIndices(*buffer));
    }

    fn draw(&self, primitive: Primitive, count: usize) {
        self.record(Call::Draw(primitive, count));
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        self.record(Call::PolygonOffset(factor, units));
    }

    fn create_target(&self, width: u32, height: u32) -> Result<u32> {
        self.record(Call::CreateTarget(width, height));
        Ok(self.handle())
    }

    fn resize_target(&self, _target: &u32, width: u32, height: u32) -> Result<()> {
        self.record(Call::ResizeTarget(width, height));
        Ok(())
    }

    fn bind_target(&self, target: Option<&u32>, width: u32, height: u32) {
        self.record(Call::BindTarget { offscreen: target.is_some(), width, height });
    }

    fn clear(&self, color: [f32; 4], _depth: bool) {
        self.record(Call::Clear(color));
    }

    fn read_pixel(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        self.record(Call::ReadPixel(x, y));
        Ok(self.pixel.get())
    }

    fn canvas_size(&self) -> CanvasSize {
        self.size.get()
    }
}
