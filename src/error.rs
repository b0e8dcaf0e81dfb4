//! Crate-wide error type.
//!
//! Resource and shader failures are terminal for the subsystem that hit
//! them. Degenerate geometry and picking misses are not errors at all.

use std::fmt;

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Shader stage, used in compile diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("canvas element `{0}` not found")]
    CanvasNotFound(String),

    #[error("no WebGL2 context available: {0}")]
    NoContext(String),

    #[error("failed to compile {stage} shader for `{alias}`: {log}")]
    ShaderCompile {
        alias: String,
        stage: ShaderStage,
        log: String,
    },

    #[error("failed to link program `{alias}`: {log}")]
    ProgramLink { alias: String, log: String },

    #[error("failed to validate program `{alias}`: {log}")]
    ProgramValidate { alias: String, log: String },

    #[error("program `{0}` failed to build earlier and cannot be drawn with")]
    ProgramUnusable(String),

    #[error("failed to create GPU resource: {0}")]
    ResourceCreation(&'static str),

    #[error("picking framebuffer incomplete (status 0x{0:04x})")]
    FramebufferIncomplete(u32),

    #[error("pixel read-back failed: {0}")]
    ReadPixels(String),

    #[error("invalid surface parameter `{name}`: {value}")]
    InvalidSurface { name: &'static str, value: f32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_error_message_names_stage_and_alias() {
        let err = Error::ShaderCompile {
            alias: "EllipsoidPicking".into(),
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:3: syntax error".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fragment"));
        assert!(msg.contains("EllipsoidPicking"));
        assert!(msg.contains("syntax error"));
    }

    #[test]
    fn test_framebuffer_status_is_hex() {
        let msg = Error::FramebufferIncomplete(0x8cd6).to_string();
        assert!(msg.contains("0x8cd6"));
    }
}
