//! OpenGL ES backend over `glow`
//!
//! The only module that calls into the driver. Native targets only: handles
//! are carried across the [`GlBackend`] seam as their raw integer names.

#![allow(unsafe_code)]

use std::num::NonZeroU32;

use glow::HasContext;

use super::{AttribLocation, GlBackend, ProgramId, ShaderObject, ShaderStage, UniformLocation};
use crate::render::{RenderError, RenderResult};

/// [`GlBackend`] backed by a live `glow` context
///
/// The context must be current on the calling thread for every method.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Wrap a context created by the platform layer
    pub const fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// The wrapped context, for draw calls outside the shader seam
    pub const fn context(&self) -> &glow::Context {
        &self.gl
    }

    fn shader(shader: ShaderObject) -> Option<glow::NativeShader> {
        NonZeroU32::new(shader.0).map(glow::NativeShader)
    }

    fn program(program: ProgramId) -> Option<glow::NativeProgram> {
        NonZeroU32::new(program.0).map(glow::NativeProgram)
    }

    fn location(location: UniformLocation) -> Option<glow::NativeUniformLocation> {
        u32::try_from(location.0).ok().map(glow::NativeUniformLocation)
    }
}

impl GlBackend for GlowBackend {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderObject> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self.gl.create_shader(kind).map_err(RenderError::Backend)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(RenderError::ShaderCompilation { stage, log });
            }
            Ok(ShaderObject(shader.0.get()))
        }
    }

    fn delete_shader(&mut self, shader: ShaderObject) {
        if let Some(shader) = Self::shader(shader) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn link_program(
        &mut self,
        vertex: ShaderObject,
        fragment: ShaderObject,
        attributes: &[&str],
    ) -> RenderResult<ProgramId> {
        let (Some(vs), Some(fs)) = (Self::shader(vertex), Self::shader(fragment)) else {
            return Err(RenderError::ShaderLink { log: "Attached shader object is not valid".to_owned() });
        };
        unsafe {
            let program = self.gl.create_program().map_err(RenderError::Backend)?;
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            for (index, name) in (0_u32..).zip(attributes) {
                self.gl.bind_attrib_location(program, index, name);
            }
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(RenderError::ShaderLink { log });
            }
            Ok(ProgramId(program.0.get()))
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(program) = Self::program(program) {
            unsafe { self.gl.delete_program(program) }
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.and_then(Self::program)) }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> UniformLocation {
        let Some(program) = Self::program(program) else {
            return UniformLocation::INVALID;
        };
        unsafe { self.gl.get_uniform_location(program, name) }
            .and_then(|location| i32::try_from(location.0).ok())
            .map_or(UniformLocation::INVALID, UniformLocation)
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> AttribLocation {
        let Some(program) = Self::program(program) else {
            return AttribLocation::INVALID;
        };
        unsafe { self.gl.get_attrib_location(program, name) }
            .and_then(|location| i32::try_from(location).ok())
            .map_or(AttribLocation::INVALID, AttribLocation)
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        if let Some(location) = Self::location(location) {
            unsafe { self.gl.uniform_1_f32(Some(&location), value) }
        }
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        if let Some(location) = Self::location(location) {
            unsafe { self.gl.uniform_1_i32(Some(&location), value) }
        }
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        if let Some(location) = Self::location(location) {
            unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&location), false, matrix) }
        }
    }
}
