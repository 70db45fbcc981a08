//! Recording backend for tests and offline tooling
//!
//! Provides a [`RecordingBackend`] that behaves like a minimal GL ES driver
//! without a GPU: it "compiles" by scanning declarations, hands out
//! locations in declaration order, tracks the current program, stores
//! uploaded uniform values for readback, and records every call.

use std::collections::HashMap;

use super::{AttribLocation, GlBackend, ProgramId, ShaderObject, ShaderStage, UniformLocation};
use crate::render::shader::declarations;
use crate::render::{RenderError, RenderResult};

/// Record of a GL call for test inspection
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    /// A stage was compiled
    CompileShader(ShaderStage),
    /// A stage object was deleted
    DeleteShader(ShaderObject),
    /// A program was linked with the given attribute bindings
    LinkProgram {
        /// New program
        program: ProgramId,
        /// Attribute names bound to indices 0..n
        attributes: Vec<String>,
    },
    /// A program was deleted
    DeleteProgram(ProgramId),
    /// The current program changed
    UseProgram(Option<ProgramId>),
    /// A uniform location was queried
    UniformLocation(ProgramId, String),
    /// An attribute location was queried
    AttribLocation(ProgramId, String),
    /// A uniform was uploaded
    Uniform(UniformLocation, UniformValue),
}

/// Value stored in a uniform slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `float`
    Float(f32),
    /// `int` or `sampler2D`
    Int(i32),
    /// `mat4`, column-major
    Mat4([f32; 16]),
}

#[derive(Debug)]
struct StageRecord {
    uniforms: Vec<String>,
    attributes: Vec<String>,
}

#[derive(Debug)]
struct ProgramRecord {
    uniforms: Vec<String>,
    attributes: Vec<String>,
    values: HashMap<i32, UniformValue>,
}

/// A GL backend that records calls instead of talking to a driver
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// All calls made to this backend
    pub calls: Vec<GlCall>,
    stages: HashMap<u32, StageRecord>,
    programs: HashMap<u32, ProgramRecord>,
    current: Option<ProgramId>,
    next_id: u32,
    compile_failures: Vec<String>,
    fail_next_link: bool,
    invalid_operations: usize,
}

impl RecordingBackend {
    /// Create a new recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail compilation of any stage whose source contains `pattern`
    pub fn fail_compile_containing(&mut self, pattern: impl Into<String>) {
        self.compile_failures.push(pattern.into());
    }

    /// Fail the next link
    pub fn fail_next_link(&mut self) {
        self.fail_next_link = true;
    }

    /// Simulate a lost context: every stage and program disappears
    ///
    /// Ids are never reused, so stale handles stay detectably stale.
    pub fn lose_context(&mut self) {
        self.stages.clear();
        self.programs.clear();
        self.current = None;
    }

    /// Clear all recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Currently bound program
    pub const fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    /// Whether `program` is alive
    pub fn has_program(&self, program: ProgramId) -> bool {
        self.programs.contains_key(&program.0)
    }

    /// Number of live programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Uploads attempted with no program bound
    pub const fn invalid_operations(&self) -> usize {
        self.invalid_operations
    }

    /// Read back the last value uploaded to a uniform of `program`
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let record = self.programs.get(&program.0)?;
        let location = record.uniforms.iter().position(|u| u == name)?;
        record.values.get(&i32::try_from(location).ok()?).copied()
    }

    /// Names queried through `uniform_location` for `program`, in call order
    pub fn queried_uniforms(&self, program: ProgramId) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GlCall::UniformLocation(p, name) if *p == program => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names queried through `attrib_location` for `program`, in call order
    pub fn queried_attributes(&self, program: ProgramId) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GlCall::AttribLocation(p, name) if *p == program => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of successful links so far
    pub fn link_count(&self) -> usize {
        self.calls.iter().filter(|call| matches!(call, GlCall::LinkProgram { .. })).count()
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn upload(&mut self, location: UniformLocation, value: UniformValue) {
        self.calls.push(GlCall::Uniform(location, value));
        let Some(program) = self.current else {
            self.invalid_operations += 1;
            return;
        };
        if !location.is_valid() {
            return;
        }
        if let Some(record) = self.programs.get_mut(&program.0) {
            record.values.insert(location.0, value);
        }
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_owned());
    }
}

impl GlBackend for RecordingBackend {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderObject> {
        self.calls.push(GlCall::CompileShader(stage));
        if let Some(pattern) = self.compile_failures.iter().find(|p| source.contains(p.as_str())) {
            return Err(RenderError::ShaderCompilation {
                stage,
                log: format!("ERROR: 0:1: '{pattern}' : syntax error"),
            });
        }

        let id = self.allocate_id();
        self.stages.insert(
            id,
            StageRecord {
                uniforms: declarations(source, "uniform"),
                attributes: declarations(source, "attribute"),
            },
        );
        Ok(ShaderObject(id))
    }

    fn delete_shader(&mut self, shader: ShaderObject) {
        self.calls.push(GlCall::DeleteShader(shader));
        self.stages.remove(&shader.0);
    }

    fn link_program(
        &mut self,
        vertex: ShaderObject,
        fragment: ShaderObject,
        attributes: &[&str],
    ) -> RenderResult<ProgramId> {
        if std::mem::take(&mut self.fail_next_link) {
            return Err(RenderError::ShaderLink { log: "Link failed (injected)".to_owned() });
        }
        let (Some(vs), Some(fs)) = (self.stages.get(&vertex.0), self.stages.get(&fragment.0)) else {
            return Err(RenderError::ShaderLink { log: "Attached shader object is not valid".to_owned() });
        };

        let mut uniforms = Vec::new();
        for name in vs.uniforms.iter().chain(&fs.uniforms) {
            push_unique(&mut uniforms, name);
        }
        // Explicit bindings take indices 0..n; anything else follows in declaration order.
        let mut bound_attributes: Vec<String> = Vec::new();
        for name in attributes {
            push_unique(&mut bound_attributes, name);
        }
        for name in &vs.attributes {
            push_unique(&mut bound_attributes, name);
        }
        bound_attributes.retain(|name| vs.attributes.contains(name));

        let id = self.allocate_id();
        self.programs.insert(
            id,
            ProgramRecord { uniforms, attributes: bound_attributes, values: HashMap::new() },
        );
        let program = ProgramId(id);
        self.calls.push(GlCall::LinkProgram {
            program,
            attributes: attributes.iter().map(|a| (*a).to_owned()).collect(),
        });
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(GlCall::DeleteProgram(program));
        self.programs.remove(&program.0);
        if self.current == Some(program) {
            self.current = None;
        }
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(GlCall::UseProgram(program));
        self.current = program;
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> UniformLocation {
        self.calls.push(GlCall::UniformLocation(program, name.to_owned()));
        self.programs
            .get(&program.0)
            .and_then(|record| record.uniforms.iter().position(|u| u == name))
            .and_then(|index| i32::try_from(index).ok())
            .map_or(UniformLocation::INVALID, UniformLocation)
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> AttribLocation {
        self.calls.push(GlCall::AttribLocation(program, name.to_owned()));
        self.programs
            .get(&program.0)
            .and_then(|record| record.attributes.iter().position(|a| a == name))
            .and_then(|index| i32::try_from(index).ok())
            .map_or(AttribLocation::INVALID, AttribLocation)
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.upload(location, UniformValue::Float(value));
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.upload(location, UniformValue::Int(value));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &[f32; 16]) {
        self.upload(location, UniformValue::Mat4(*matrix));
    }
}
