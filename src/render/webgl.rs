//! WebGL2 implementation of `GraphicsBackend`.

use glam::{Mat4, Vec3, Vec4};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlFramebuffer, WebGlProgram,
    WebGlRenderbuffer, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use super::backend::{CanvasSize, GraphicsBackend, Primitive};
use crate::config::GlFeatures;
use crate::error::{Error, Result, ShaderStage};

/// Off-screen colour texture + depth renderbuffer behind one framebuffer.
pub struct WebGlTarget {
    framebuffer: WebGlFramebuffer,
    texture: WebGlTexture,
    depth: WebGlRenderbuffer,
}

pub struct WebGlBackend {
    gl: Gl,
    canvas: HtmlCanvasElement,
}

impl WebGlBackend {
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(|e| Error::NoContext(format!("{e:?}")))?
            .ok_or_else(|| Error::NoContext("webgl2 unsupported".to_owned()))?
            .dyn_into::<Gl>()
            .map_err(|_| Error::NoContext("context is not a WebGl2RenderingContext".to_owned()))?;
        Ok(Self { gl, canvas })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn compile_shader(&self, alias: &str, stage: ShaderStage, source: &str) -> Result<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        let shader = self
            .gl
            .create_shader(kind)
            .ok_or(Error::ResourceCreation("shader"))?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        let compiled = self
            .gl
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if compiled {
            return Ok(shader);
        }
        let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
        self.gl.delete_shader(Some(&shader));
        Err(Error::ShaderCompile {
            alias: alias.to_owned(),
            stage,
            log,
        })
    }

    fn program_status(&self, program: &WebGlProgram, status: u32) -> bool {
        self.gl
            .get_program_parameter(program, status)
            .as_bool()
            .unwrap_or(false)
    }

    fn allocate_target(&self, target: &WebGlTarget, width: u32, height: u32) -> Result<()> {
        let (w, h) = (width as i32, height as i32);

        self.gl.bind_texture(Gl::TEXTURE_2D, Some(&target.texture));
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                Gl::RGBA as i32,
                w,
                h,
                0,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                None,
            )
            .map_err(|_| Error::ResourceCreation("picking texture storage"))?;
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, Gl::NEAREST as i32);
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::NEAREST as i32);
        self.gl.bind_texture(Gl::TEXTURE_2D, None);

        self.gl.bind_renderbuffer(Gl::RENDERBUFFER, Some(&target.depth));
        self.gl
            .renderbuffer_storage(Gl::RENDERBUFFER, Gl::DEPTH_COMPONENT16, w, h);
        self.gl.bind_renderbuffer(Gl::RENDERBUFFER, None);

        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&target.framebuffer));
        self.gl.framebuffer_texture_2d(
            Gl::FRAMEBUFFER,
            Gl::COLOR_ATTACHMENT0,
            Gl::TEXTURE_2D,
            Some(&target.texture),
            0,
        );
        self.gl.framebuffer_renderbuffer(
            Gl::FRAMEBUFFER,
            Gl::DEPTH_ATTACHMENT,
            Gl::RENDERBUFFER,
            Some(&target.depth),
        );
        let status = self.gl.check_framebuffer_status(Gl::FRAMEBUFFER);
        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, None);

        if status != Gl::FRAMEBUFFER_COMPLETE {
            return Err(Error::FramebufferIncomplete(status));
        }
        Ok(())
    }
}

impl GraphicsBackend for WebGlBackend {
    type Program = WebGlProgram;
    type Uniform = WebGlUniformLocation;
    type Buffer = WebGlBuffer;
    type Target = WebGlTarget;

    fn configure(&self, features: &GlFeatures, clear_color: [f32; 4]) {
        let [r, g, b, a] = clear_color;
        self.gl.clear_color(r, g, b, a);
        if features.depth_test {
            self.gl.enable(Gl::DEPTH_TEST);
            self.gl.depth_func(Gl::LEQUAL);
        }
        if features.cull_face {
            self.gl.front_face(Gl::CCW);
            self.gl.cull_face(Gl::BACK);
            self.gl.enable(Gl::CULL_FACE);
        }
        if features.polygon_offset {
            self.gl.enable(Gl::POLYGON_OFFSET_FILL);
        }
    }

    fn compile_program(&self, alias: &str, vertex: &str, fragment: &str) -> Result<WebGlProgram> {
        let vs = self.compile_shader(alias, ShaderStage::Vertex, vertex)?;
        let fs = match self.compile_shader(alias, ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(err) => {
                self.gl.delete_shader(Some(&vs));
                return Err(err);
            }
        };
        let program = self
            .gl
            .create_program()
            .ok_or(Error::ResourceCreation("program"))?;
        self.gl.attach_shader(&program, &vs);
        self.gl.attach_shader(&program, &fs);
        self.gl.link_program(&program);
        // Shaders are owned by the program from here on.
        self.gl.delete_shader(Some(&vs));
        self.gl.delete_shader(Some(&fs));

        if !self.program_status(&program, Gl::LINK_STATUS) {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            return Err(Error::ProgramLink { alias: alias.to_owned(), log });
        }

        self.gl.validate_program(&program);
        if !self.program_status(&program, Gl::VALIDATE_STATUS) {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            return Err(Error::ProgramValidate { alias: alias.to_owned(), log });
        }
        Ok(program)
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn set_mat4(&self, location: &WebGlUniformLocation, value: &Mat4) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, &value.to_cols_array());
    }

    fn set_vec3(&self, location: &WebGlUniformLocation, value: Vec3) {
        self.gl.uniform3f(Some(location), value.x, value.y, value.z);
    }

    fn set_vec4(&self, location: &WebGlUniformLocation, value: Vec4) {
        self.gl
            .uniform4f(Some(location), value.x, value.y, value.z, value.w);
    }

    fn create_buffer(&self) -> Result<WebGlBuffer> {
        self.gl
            .create_buffer()
            .ok_or(Error::ResourceCreation("buffer"))
    }

    fn upload_vertices(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
        self.gl.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(data),
            Gl::STATIC_DRAW,
        );
    }

    fn upload_indices(&self, buffer: &WebGlBuffer, data: &[u32]) {
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(buffer));
        self.gl.buffer_data_with_u8_array(
            Gl::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(data),
            Gl::STATIC_DRAW,
        );
    }

    fn bind_attribute(&self, buffer: &WebGlBuffer, location: u32, components: i32) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, 0, 0);
        self.gl.enable_vertex_attrib_array(location);
    }

    fn bind_indices(&self, buffer: &WebGlBuffer) {
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(buffer));
    }

    fn draw(&self, primitive: Primitive, count: usize) {
        let mode = match primitive {
            Primitive::Triangles => Gl::TRIANGLES,
            Primitive::Lines => Gl::LINES,
        };
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        self.gl
            .draw_elements_with_i32(mode, count, Gl::UNSIGNED_INT, 0);
    }

    fn polygon_offset(&self, factor: f32, units: f32) {
        self.gl.polygon_offset(factor, units);
    }

    fn create_target(&self, width: u32, height: u32) -> Result<WebGlTarget> {
        let target = WebGlTarget {
            framebuffer: self
                .gl
                .create_framebuffer()
                .ok_or(Error::ResourceCreation("framebuffer"))?,
            texture: self
                .gl
                .create_texture()
                .ok_or(Error::ResourceCreation("texture"))?,
            depth: self
                .gl
                .create_renderbuffer()
                .ok_or(Error::ResourceCreation("renderbuffer"))?,
        };
        self.allocate_target(&target, width, height)?;
        log::debug!("picking target created at {width}x{height}");
        Ok(target)
    }

    fn resize_target(&self, target: &WebGlTarget, width: u32, height: u32) -> Result<()> {
        self.allocate_target(target, width, height)
    }

    fn bind_target(&self, target: Option<&WebGlTarget>, width: u32, height: u32) {
        self.gl
            .bind_framebuffer(Gl::FRAMEBUFFER, target.map(|t| &t.framebuffer));
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn clear(&self, color: [f32; 4], depth: bool) {
        let [r, g, b, a] = color;
        self.gl.clear_color(r, g, b, a);
        let mut mask = Gl::COLOR_BUFFER_BIT;
        if depth {
            mask |= Gl::DEPTH_BUFFER_BIT;
        }
        self.gl.clear(mask);
    }

    fn read_pixel(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        let mut pixel = [0u8; 4];
        self.gl
            .read_pixels_with_opt_u8_array(
                x as i32,
                y as i32,
                1,
                1,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                Some(&mut pixel),
            )
            .map_err(|e| Error::ReadPixels(format!("{e:?}")))?;
        Ok(pixel)
    }

    fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(
            self.canvas.width(),
            self.canvas.height(),
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
        )
    }
}
