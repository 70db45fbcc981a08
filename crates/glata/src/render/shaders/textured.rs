//! Plain textured quad

use crate::render::gl::BoundProgram;
use crate::render::shader::{
    names, ModelParams, RendererParams, SceneParams, Shader, ShaderCore, ShaderSource,
};
use crate::render::RenderResult;

/// Vertex stage shared by the textured shaders: MVP transform, texture
/// coordinate passed through
pub const TEXTURED_VERTEX_SHADER: &str = concat!(
    "uniform mat4 u_MVPMatrix; \n",
    "attribute vec4 a_Position; \n",
    "attribute vec2 a_TexCoordinate; \n",
    "varying vec2 v_TexCoordinate; \n",
    "void main() { \n",
    "   v_TexCoordinate = a_TexCoordinate; \n",
    "   gl_Position = u_MVPMatrix * a_Position; \n",
    "}",
);

/// Fragment stage that outputs the sampled texel unchanged
pub const TEXTURED_FRAGMENT_SHADER: &str = concat!(
    "precision mediump float; \n",
    "uniform sampler2D u_Texture; \n",
    "varying vec2 v_TexCoordinate; \n",
    "void main() { \n",
    "   gl_FragColor = texture2D(u_Texture, v_TexCoordinate);\n",
    "}",
);

/// Attributes of [`TEXTURED_VERTEX_SHADER`], in binding order
pub const TEXTURED_ATTRIBUTES: [&str; 2] = [names::A_POSITION, names::A_TEX_COORDINATE];

/// Samples the bound texture on unit 0 and draws it unmodified
#[derive(Debug)]
pub struct TexturedShader {
    name: String,
    core: ShaderCore,
}

impl TexturedShader {
    /// Create an uninitialized shader
    pub fn new() -> Self {
        Self::with_name("textured")
    }

    /// Create an uninitialized shader with a log name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into(), core: ShaderCore::new() }
    }
}

impl Default for TexturedShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for TexturedShader {
    fn name(&self) -> &str {
        &self.name
    }

    fn core(&self) -> &ShaderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ShaderCore {
        &mut self.core
    }

    fn init_shaders(&self) -> ShaderSource {
        ShaderSource {
            vertex: TEXTURED_VERTEX_SHADER.to_owned(),
            fragment: TEXTURED_FRAGMENT_SHADER.to_owned(),
            attributes: TEXTURED_ATTRIBUTES.to_vec(),
        }
    }

    fn set_variable_handles(&mut self, program: &mut BoundProgram<'_>) {
        self.core.resolve_common(program);
    }

    fn set_shader_params(
        &mut self,
        program: &mut BoundProgram<'_>,
        _renderer: &RendererParams,
        model: &ModelParams,
        scene: &SceneParams,
    ) -> RenderResult<()> {
        self.core.ensure_bound(&self.name, program)?;
        self.core.upload_mvp(program, model, scene);
        self.core.upload_texture_unit(program, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Transform, Vec3};
    use crate::render::gl::{GlCall, RecordingBackend, UniformValue};
    use crate::render::shader::ShaderState;
    use crate::render::RenderError;

    fn draw(shader: &mut TexturedShader, gl: &mut RecordingBackend, model: &ModelParams, scene: &SceneParams) {
        shader.prepare_draw(gl, &RendererParams::default(), model, scene).unwrap();
    }

    #[test]
    fn test_sources_declare_expected_names() {
        let source = TexturedShader::new().init_shaders();
        assert_eq!(source.attributes, vec!["a_Position", "a_TexCoordinate"]);
        assert_eq!(source.declared_attributes(), vec!["a_Position", "a_TexCoordinate"]);
        assert_eq!(source.declared_uniforms(), vec!["u_MVPMatrix", "u_Texture"]);
        assert!(source.fragment.contains("gl_FragColor = texture2D(u_Texture, v_TexCoordinate);"));
        assert!(source.vertex.contains("gl_Position = u_MVPMatrix * a_Position;"));
    }

    #[test]
    fn test_initialize_resolves_every_handle() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        assert_eq!(shader.state(), ShaderState::Uninitialized);

        shader.initialize(&mut gl).unwrap();

        assert_eq!(shader.state(), ShaderState::HandlesResolved);
        let core = shader.core();
        assert!(core.u_mvp_matrix.is_valid());
        assert!(core.u_texture.is_valid());
        assert_eq!(core.a_position.index(), Some(0));
        assert_eq!(core.a_tex_coordinate.index(), Some(1));
    }

    #[test]
    fn test_queried_names_match_declared_names() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        shader.initialize(&mut gl).unwrap();
        let program = shader.core().program().unwrap();
        let source = shader.init_shaders();

        let mut queried: Vec<&str> = gl.queried_uniforms(program);
        queried.sort_unstable();
        let mut declared = source.declared_uniforms();
        declared.sort_unstable();
        assert_eq!(queried, declared);

        assert_eq!(gl.queried_attributes(program), source.declared_attributes());
    }

    #[test]
    fn test_set_shader_params_uploads_mvp_and_sampler() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        let model = ModelParams::new(Transform::from_position(Vec3::new(0.0, 0.0, -3.0)));
        let scene = SceneParams::new(Mat4::identity(), Mat4::new_scaling(2.0));

        draw(&mut shader, &mut gl, &model, &scene);

        let program = shader.core().program().unwrap();
        let expected = scene.mvp(&model);
        assert_eq!(
            gl.uniform_value(program, "u_MVPMatrix"),
            Some(UniformValue::Mat4(expected.as_slice().try_into().unwrap()))
        );
        assert_eq!(gl.uniform_value(program, "u_Texture"), Some(UniformValue::Int(0)));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        shader.initialize(&mut gl).unwrap();
        shader.initialize(&mut gl).unwrap();
        draw(&mut shader, &mut gl, &ModelParams::default(), &SceneParams::default());
        assert_eq!(gl.link_count(), 1);
    }

    #[test]
    fn test_bind_before_initialize_is_rejected() {
        let mut gl = RecordingBackend::new();
        let shader = TexturedShader::new();
        let err = shader.bind(&mut gl).unwrap_err();
        assert_eq!(err, RenderError::ShaderNotReady("textured".to_owned()));
    }

    #[test]
    fn test_compile_failure_is_permanent() {
        let mut gl = RecordingBackend::new();
        gl.fail_compile_containing("texture2D");
        let mut shader = TexturedShader::new();

        let err = shader.initialize(&mut gl).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompilation { .. }));
        assert_eq!(shader.state(), ShaderState::Failed);

        let compiles = gl.calls.len();
        let err = shader.initialize(&mut gl).unwrap_err();
        assert_eq!(err, RenderError::ShaderFailed("textured".to_owned()));
        assert_eq!(gl.calls.len(), compiles);

        shader.on_context_lost();
        assert_eq!(shader.state(), ShaderState::Failed);
    }

    #[test]
    fn test_failed_fragment_compile_deletes_vertex_stage() {
        let mut gl = RecordingBackend::new();
        gl.fail_compile_containing("precision mediump");
        let mut shader = TexturedShader::new();
        assert!(shader.initialize(&mut gl).is_err());
        assert!(gl.calls.iter().any(|c| matches!(c, GlCall::DeleteShader(_))));
    }

    #[test]
    fn test_link_failure_is_permanent() {
        let mut gl = RecordingBackend::new();
        gl.fail_next_link();
        let mut shader = TexturedShader::new();
        assert!(matches!(shader.initialize(&mut gl), Err(RenderError::ShaderLink { .. })));
        assert_eq!(shader.state(), ShaderState::Failed);
        assert_eq!(gl.program_count(), 0);
    }

    #[test]
    fn test_context_loss_forces_relink() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        draw(&mut shader, &mut gl, &ModelParams::default(), &SceneParams::default());
        let before = shader.core().program().unwrap();

        gl.lose_context();
        shader.on_context_lost();
        assert_eq!(shader.state(), ShaderState::Uninitialized);
        assert!(!shader.core().u_mvp_matrix.is_valid());
        assert!(!shader.core().a_position.is_valid());

        draw(&mut shader, &mut gl, &ModelParams::default(), &SceneParams::default());
        let after = shader.core().program().unwrap();
        assert_ne!(before, after);
        assert_eq!(gl.link_count(), 2);
        assert!(gl.uniform_value(after, "u_MVPMatrix").is_some());
    }

    #[test]
    fn test_release_deletes_program() {
        let mut gl = RecordingBackend::new();
        let mut shader = TexturedShader::new();
        shader.initialize(&mut gl).unwrap();
        let program = shader.core().program().unwrap();

        shader.release(&mut gl);

        assert!(!gl.has_program(program));
        assert_eq!(shader.core().program(), None);
        assert_eq!(shader.state(), ShaderState::Uninitialized);
    }

    #[test]
    fn test_params_through_foreign_binding_are_rejected() {
        let mut gl = RecordingBackend::new();
        let mut first = TexturedShader::with_name("first");
        let mut second = TexturedShader::with_name("second");
        first.initialize(&mut gl).unwrap();
        second.initialize(&mut gl).unwrap();

        let mut bound = second.bind(&mut gl).unwrap();
        let err = first
            .set_shader_params(&mut bound, &RendererParams::default(), &ModelParams::default(), &SceneParams::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::ProgramMismatch { .. }));
        drop(bound);

        assert_eq!(gl.current_program(), second.core().program());
    }
}
