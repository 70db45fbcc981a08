//! Shared shader lifecycle
//!
//! Every concrete shader supplies its GLSL ([`Shader::init_shaders`]), the
//! handles it needs ([`Shader::set_variable_handles`]) and how it pushes
//! per-draw state ([`Shader::set_shader_params`]). The provided methods on
//! [`Shader`] drive the lifecycle:
//!
//! ```text
//! Uninitialized -> CompiledLinked -> HandlesResolved -> (bind, set params, draw)*
//!       ^                                  |
//!       +---------- on_context_lost -------+
//! ```
//!
//! A compile or link failure moves the shader to `Failed` for good.
//!
//! Context loss uses full re-initialization: the program and every cached
//! handle are forgotten and the next [`Shader::initialize`] recompiles from
//! source.

mod params;
mod source;

pub use params::{ModelParams, RendererParams, SceneParams, ShaderVars};
pub use source::{declarations, names, ShaderSource};

use crate::render::gl::{AttribLocation, BoundProgram, GlBackend, ProgramId, ShaderStage, UniformLocation};
use crate::render::{RenderError, RenderResult};

/// Where a shader is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderState {
    /// No program exists
    #[default]
    Uninitialized,
    /// Program linked, handles not yet resolved
    CompiledLinked,
    /// Ready to bind and draw
    HandlesResolved,
    /// Compile or link failed; never retried
    Failed,
}

/// Program handle and the handles every textured shader shares
#[derive(Debug, Default)]
pub struct ShaderCore {
    program: Option<ProgramId>,
    state: ShaderState,
    /// `u_MVPMatrix`
    pub u_mvp_matrix: UniformLocation,
    /// `u_Texture`
    pub u_texture: UniformLocation,
    /// `a_Position`
    pub a_position: AttribLocation,
    /// `a_TexCoordinate`
    pub a_tex_coordinate: AttribLocation,
}

impl ShaderCore {
    /// A core with no program
    pub fn new() -> Self {
        Self::default()
    }

    /// Linked program, if any
    pub const fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Lifecycle state
    pub const fn state(&self) -> ShaderState {
        self.state
    }

    /// Resolve the MVP matrix, sampler and both vertex attributes
    pub fn resolve_common(&mut self, program: &mut BoundProgram<'_>) {
        self.u_mvp_matrix = program.uniform(names::U_MVP_MATRIX);
        self.u_texture = program.uniform(names::U_TEXTURE);
        self.a_position = program.attribute(names::A_POSITION);
        self.a_tex_coordinate = program.attribute(names::A_TEX_COORDINATE);
    }

    /// Compute `projection * view * model` and upload it
    pub fn upload_mvp(&self, program: &mut BoundProgram<'_>, model: &ModelParams, scene: &SceneParams) {
        program.set_matrix4(self.u_mvp_matrix, &scene.mvp(model));
    }

    /// Point the sampler at a texture unit
    pub fn upload_texture_unit(&self, program: &mut BoundProgram<'_>, unit: i32) {
        program.set_int(self.u_texture, unit);
    }

    /// Fail unless `program` is this core's program
    pub fn ensure_bound(&self, shader: &str, program: &BoundProgram<'_>) -> RenderResult<()> {
        match self.program {
            Some(own) if own == program.program() => Ok(()),
            Some(own) => Err(RenderError::ProgramMismatch {
                shader: shader.to_owned(),
                expected: own.0,
                bound: program.program().0,
            }),
            None => Err(RenderError::ShaderNotReady(shader.to_owned())),
        }
    }

    fn reset_handles(&mut self) {
        self.u_mvp_matrix = UniformLocation::INVALID;
        self.u_texture = UniformLocation::INVALID;
        self.a_position = AttribLocation::INVALID;
        self.a_tex_coordinate = AttribLocation::INVALID;
    }
}

/// A GL program wrapper with a fixed variable contract
pub trait Shader {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Shared program state
    fn core(&self) -> &ShaderCore;

    /// Shared program state, mutably
    fn core_mut(&mut self) -> &mut ShaderCore;

    /// Produce the GLSL and attribute list for this shader
    fn init_shaders(&self) -> ShaderSource;

    /// Resolve and cache every handle this shader uses
    fn set_variable_handles(&mut self, program: &mut BoundProgram<'_>);

    /// Push per-draw state into the bound program
    fn set_shader_params(
        &mut self,
        program: &mut BoundProgram<'_>,
        renderer: &RendererParams,
        model: &ModelParams,
        scene: &SceneParams,
    ) -> RenderResult<()>;

    /// Forget handles beyond those in [`ShaderCore`]
    fn reset_variable_handles(&mut self) {}

    /// Lifecycle state
    fn state(&self) -> ShaderState {
        self.core().state()
    }

    /// Compile both stages and link them
    ///
    /// No-op unless `Uninitialized`. Failure is permanent.
    fn compile_and_link(&mut self, gl: &mut dyn GlBackend) -> RenderResult<()> {
        match self.state() {
            ShaderState::Uninitialized => {}
            ShaderState::Failed => return Err(RenderError::ShaderFailed(self.name().to_owned())),
            ShaderState::CompiledLinked | ShaderState::HandlesResolved => return Ok(()),
        }

        let source = self.init_shaders();
        match build_program(gl, &source) {
            Ok(program) => {
                log::debug!("Shader '{}' linked as program {}", self.name(), program.0);
                let core = self.core_mut();
                core.program = Some(program);
                core.state = ShaderState::CompiledLinked;
                Ok(())
            }
            Err(e) => {
                log::error!("Shader '{}' failed to build: {}", self.name(), e);
                self.core_mut().state = ShaderState::Failed;
                Err(e)
            }
        }
    }

    /// Bind the linked program and resolve handles
    fn resolve_handles(&mut self, gl: &mut dyn GlBackend) -> RenderResult<()> {
        let program = match (self.state(), self.core().program()) {
            (ShaderState::CompiledLinked, Some(program)) => program,
            (ShaderState::HandlesResolved, _) => return Ok(()),
            (ShaderState::Failed, _) => return Err(RenderError::ShaderFailed(self.name().to_owned())),
            _ => return Err(RenderError::ShaderNotReady(self.name().to_owned())),
        };

        let mut bound = BoundProgram::bind(gl, program);
        self.set_variable_handles(&mut bound);
        self.core_mut().state = ShaderState::HandlesResolved;
        Ok(())
    }

    /// Bring the shader to `HandlesResolved`; idempotent
    fn initialize(&mut self, gl: &mut dyn GlBackend) -> RenderResult<()> {
        self.compile_and_link(gl)?;
        self.resolve_handles(gl)
    }

    /// Make this shader's program current
    fn bind<'a>(&self, gl: &'a mut dyn GlBackend) -> RenderResult<BoundProgram<'a>> {
        match (self.state(), self.core().program()) {
            (ShaderState::HandlesResolved, Some(program)) => Ok(BoundProgram::bind(gl, program)),
            (ShaderState::Failed, _) => Err(RenderError::ShaderFailed(self.name().to_owned())),
            _ => Err(RenderError::ShaderNotReady(self.name().to_owned())),
        }
    }

    /// Initialize if needed, bind, and push this draw's parameters
    ///
    /// The returned binding is the one draw calls should be issued against.
    fn prepare_draw<'a>(
        &mut self,
        gl: &'a mut dyn GlBackend,
        renderer: &RendererParams,
        model: &ModelParams,
        scene: &SceneParams,
    ) -> RenderResult<BoundProgram<'a>> {
        self.initialize(gl)?;
        let mut bound = self.bind(gl)?;
        self.set_shader_params(&mut bound, renderer, model, scene)?;
        Ok(bound)
    }

    /// The context and every GL object in it are gone
    ///
    /// Drops the program id without deleting it and invalidates all
    /// handles. A failed shader stays failed.
    fn on_context_lost(&mut self) {
        if self.state() == ShaderState::Failed {
            return;
        }
        log::info!("Shader '{}' invalidated by context loss", self.name());
        self.reset_variable_handles();
        let core = self.core_mut();
        core.program = None;
        core.reset_handles();
        core.state = ShaderState::Uninitialized;
    }

    /// Delete the program and return to `Uninitialized`
    fn release(&mut self, gl: &mut dyn GlBackend) {
        self.reset_variable_handles();
        let core = self.core_mut();
        if let Some(program) = core.program.take() {
            gl.delete_program(program);
        }
        core.reset_handles();
        if core.state != ShaderState::Failed {
            core.state = ShaderState::Uninitialized;
        }
    }
}

/// Compile, bind attributes, link; stage objects never outlive the call
fn build_program(gl: &mut dyn GlBackend, source: &ShaderSource) -> RenderResult<ProgramId> {
    let vertex = gl.compile_shader(ShaderStage::Vertex, &source.vertex)?;
    let fragment = match gl.compile_shader(ShaderStage::Fragment, &source.fragment) {
        Ok(fragment) => fragment,
        Err(e) => {
            gl.delete_shader(vertex);
            return Err(e);
        }
    };

    let linked = gl.link_program(vertex, fragment, &source.attributes);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);
    linked
}
