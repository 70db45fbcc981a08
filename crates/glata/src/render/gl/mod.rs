//! GL backend abstraction
//!
//! Every GL call the toolkit makes goes through [`GlBackend`]. The driver's
//! "current program" is global state; here it is an explicit value,
//! [`BoundProgram`], which mutably borrows the backend for as long as the
//! binding is in use. Uniform uploads are only reachable through it, so
//! bind-then-set ordering is checked by the borrow checker.

mod recording;

#[cfg(feature = "glow")]
mod glow_backend;

pub use recording::{GlCall, RecordingBackend, UniformValue};

#[cfg(feature = "glow")]
pub use glow_backend::GlowBackend;

use std::fmt;

use crate::foundation::math::Mat4;
use crate::render::RenderResult;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Driver handle to a compiled, not yet linked, shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderObject(pub u32);

/// Driver handle to a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Uniform location within a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// GL's "not found" location; uploads to it are ignored
    pub const INVALID: Self = Self(-1);

    /// Whether the driver resolved this location
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Vertex attribute location within a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub i32);

impl AttribLocation {
    /// GL's "not found" location
    pub const INVALID: Self = Self(-1);

    /// Whether the driver resolved this location
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Index usable with vertex attribute pointer calls
    pub fn index(self) -> Option<u32> {
        u32::try_from(self.0).ok()
    }
}

impl Default for AttribLocation {
    fn default() -> Self {
        Self::INVALID
    }
}

/// The GL calls shader programs need
///
/// Implementations must be driven from the thread owning the GL context.
pub trait GlBackend {
    /// Compile one stage. Failure carries the driver info log and leaves no
    /// shader object behind.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderObject>;

    /// Delete a shader stage object
    fn delete_shader(&mut self, shader: ShaderObject);

    /// Link two stages, binding `attributes[i]` to attribute index `i`
    /// before linking. Failure leaves no program behind.
    fn link_program(
        &mut self,
        vertex: ShaderObject,
        fragment: ShaderObject,
        attributes: &[&str],
    ) -> RenderResult<ProgramId>;

    /// Delete a linked program
    fn delete_program(&mut self, program: ProgramId);

    /// Make `program` current, or unbind with `None`
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Look up a uniform; [`UniformLocation::INVALID`] when absent
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> UniformLocation;

    /// Look up a vertex attribute; [`AttribLocation::INVALID`] when absent
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> AttribLocation;

    /// Upload a float to the current program
    fn uniform_1f(&mut self, location: UniformLocation, value: f32);

    /// Upload an int (or sampler unit) to the current program
    fn uniform_1i(&mut self, location: UniformLocation, value: i32);

    /// Upload a column-major 4x4 matrix to the current program
    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]);
}

/// A program made current on a backend
///
/// Holding one is proof that `program` is the driver's current program:
/// the backend is mutably borrowed, so nothing else can rebind it.
pub struct BoundProgram<'a> {
    gl: &'a mut dyn GlBackend,
    program: ProgramId,
}

impl<'a> BoundProgram<'a> {
    /// Make `program` current and return the binding
    pub fn bind(gl: &'a mut dyn GlBackend, program: ProgramId) -> Self {
        gl.use_program(Some(program));
        Self { gl, program }
    }

    /// The bound program
    pub const fn program(&self) -> ProgramId {
        self.program
    }

    /// Resolve a uniform, warning when the program does not declare it
    pub fn uniform(&mut self, name: &str) -> UniformLocation {
        let location = self.gl.uniform_location(self.program, name);
        if location.is_valid() {
            log::debug!("Program {}: uniform '{}' at {}", self.program.0, name, location.0);
        } else {
            log::warn!("Program {}: uniform '{}' not found", self.program.0, name);
        }
        location
    }

    /// Resolve a vertex attribute, warning when the program does not declare it
    pub fn attribute(&mut self, name: &str) -> AttribLocation {
        let location = self.gl.attrib_location(self.program, name);
        if location.is_valid() {
            log::debug!("Program {}: attribute '{}' at {}", self.program.0, name, location.0);
        } else {
            log::warn!("Program {}: attribute '{}' not found", self.program.0, name);
        }
        location
    }

    /// Upload a float
    pub fn set_float(&mut self, location: UniformLocation, value: f32) {
        self.gl.uniform_1f(location, value);
    }

    /// Upload an int or sampler unit
    pub fn set_int(&mut self, location: UniformLocation, value: i32) {
        self.gl.uniform_1i(location, value);
    }

    /// Upload a matrix, column-major, untransposed
    pub fn set_matrix4(&mut self, location: UniformLocation, matrix: &Mat4) {
        let mut columns = [0.0_f32; 16];
        columns.copy_from_slice(matrix.as_slice());
        self.gl.uniform_matrix4(location, &columns);
    }

    /// The backend, for issuing draw calls against this binding
    pub fn backend(&mut self) -> &mut dyn GlBackend {
        &mut *self.gl
    }
}

impl fmt::Debug for BoundProgram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundProgram").field("program", &self.program).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinels() {
        assert!(!UniformLocation::INVALID.is_valid());
        assert!(!AttribLocation::INVALID.is_valid());
        assert_eq!(UniformLocation::default(), UniformLocation::INVALID);
        assert_eq!(AttribLocation::INVALID.index(), None);
        assert_eq!(AttribLocation(3).index(), Some(3));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }

    #[test]
    fn test_bind_makes_program_current() {
        let mut gl = RecordingBackend::new();
        let vs = gl.compile_shader(ShaderStage::Vertex, "attribute vec4 a_Position;").unwrap();
        let fs = gl.compile_shader(ShaderStage::Fragment, "uniform float u_Alpha;").unwrap();
        let program = gl.link_program(vs, fs, &["a_Position"]).unwrap();

        let bound = BoundProgram::bind(&mut gl, program);
        assert_eq!(bound.program(), program);
        drop(bound);

        assert_eq!(gl.current_program(), Some(program));
    }

    #[test]
    fn test_matrix_upload_is_column_major() {
        let mut gl = RecordingBackend::new();
        let vs = gl.compile_shader(ShaderStage::Vertex, "uniform mat4 u_MVPMatrix;").unwrap();
        let fs = gl.compile_shader(ShaderStage::Fragment, "").unwrap();
        let program = gl.link_program(vs, fs, &[]).unwrap();

        let matrix = Mat4::new_translation(&crate::foundation::math::Vec3::new(1.0, 2.0, 3.0));
        let mut bound = BoundProgram::bind(&mut gl, program);
        let location = bound.uniform("u_MVPMatrix");
        bound.set_matrix4(location, &matrix);
        drop(bound);

        let Some(UniformValue::Mat4(columns)) = gl.uniform_value(program, "u_MVPMatrix") else {
            panic!("matrix was not uploaded");
        };
        assert_eq!(&columns[12..15], &[1.0, 2.0, 3.0]);
    }
}
