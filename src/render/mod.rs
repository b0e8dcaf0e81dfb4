//! Render and picking pipeline.

pub mod backend;
pub mod picking;
pub mod pipeline;
pub mod programs;
pub mod shaders;
pub mod webgl;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{CanvasSize, GraphicsBackend, Primitive};
pub use pipeline::{FrameView, Renderer};
pub use shaders::RenderPass;
pub use webgl::WebGlBackend;
