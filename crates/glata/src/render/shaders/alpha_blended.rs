//! Alpha-faded textured quad
//!
//! The fade is a construction-time choice of two closed axes, baked into
//! the fragment text rather than selected by a uniform:
//!
//! | `SourceAlpha`      | factor          |   | `BlendTarget` | destination      |
//! |--------------------|-----------------|---|---------------|------------------|
//! | `SrcAlpha`         | `u_Alpha`       |   | `AlphaOnly`   | `gl_FragColor.a` |
//! | `OneMinusSrcAlpha` | `1.0 - u_Alpha` |   | `FullColor`   | `gl_FragColor`   |

use serde::{Deserialize, Serialize};

use super::textured::TEXTURED_ATTRIBUTES;
use crate::foundation::math::utils;
use crate::render::gl::{BoundProgram, UniformLocation};
use crate::render::shader::{
    names, ModelParams, RendererParams, SceneParams, Shader, ShaderCore, ShaderSource,
};
use crate::render::RenderResult;

/// Which alpha term multiplies the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceAlpha {
    /// Multiply by `u_Alpha` (fade in as alpha rises)
    #[default]
    SrcAlpha,
    /// Multiply by `1.0 - u_Alpha` (fade out as alpha rises)
    OneMinusSrcAlpha,
}

impl SourceAlpha {
    /// Every variant
    pub const ALL: [Self; 2] = [Self::SrcAlpha, Self::OneMinusSrcAlpha];

    /// GLSL expression for the factor
    pub const fn expression(self) -> &'static str {
        match self {
            Self::SrcAlpha => "u_Alpha",
            Self::OneMinusSrcAlpha => "1.0 - u_Alpha",
        }
    }
}

/// Which part of the output color is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendTarget {
    /// Only the alpha channel
    #[default]
    AlphaOnly,
    /// All four channels
    FullColor,
}

impl BlendTarget {
    /// Every variant
    pub const ALL: [Self; 2] = [Self::AlphaOnly, Self::FullColor];

    /// GLSL lvalue that gets scaled
    pub const fn destination(self) -> &'static str {
        match self {
            Self::AlphaOnly => "gl_FragColor.a",
            Self::FullColor => "gl_FragColor",
        }
    }
}

/// Vertex stage of the fade shaders
///
/// Same statements as [`TEXTURED_VERTEX_SHADER`](super::textured::TEXTURED_VERTEX_SHADER)
/// with different indentation.
pub const ALPHA_BLENDED_VERTEX_SHADER: &str = concat!(
    "uniform mat4 u_MVPMatrix; \n",
    "attribute vec4 a_Position; \n",
    "attribute vec2 a_TexCoordinate; \n",
    "varying vec2 v_TexCoordinate; \n",
    "void main() { \n",
    "\t  v_TexCoordinate = a_TexCoordinate; \n",
    "    gl_Position = u_MVPMatrix * a_Position; \n",
    "} \n",
);

/// Fragment stage for a fade configuration
///
/// Pure: the same configuration always yields the same text.
pub fn fragment_source(source_alpha: SourceAlpha, blend_target: BlendTarget) -> String {
    format!(
        concat!(
            "precision mediump float; \n",
            "uniform sampler2D u_Texture; \n",
            "uniform float u_Alpha; \n",
            "varying vec2 v_TexCoordinate; \n",
            "void main() {{ \n",
            "\t\tgl_FragColor = texture2D(u_Texture, v_TexCoordinate); \n",
            "       {destination} *= {factor}; \n",
            "}}",
        ),
        destination = blend_target.destination(),
        factor = source_alpha.expression(),
    )
}

/// Textured quad whose alpha or color is scaled by `u_Alpha`
#[derive(Debug)]
pub struct AlphaBlendedTexturedShader {
    name: String,
    core: ShaderCore,
    source_alpha: SourceAlpha,
    blend_target: BlendTarget,
    u_alpha: UniformLocation,
}

impl AlphaBlendedTexturedShader {
    /// Create an uninitialized shader for a fade configuration
    pub fn new(source_alpha: SourceAlpha, blend_target: BlendTarget) -> Self {
        Self::with_name("alpha_blended", source_alpha, blend_target)
    }

    /// Same as [`Self::new`] with a log name
    pub fn with_name(name: impl Into<String>, source_alpha: SourceAlpha, blend_target: BlendTarget) -> Self {
        Self {
            name: name.into(),
            core: ShaderCore::new(),
            source_alpha,
            blend_target,
            u_alpha: UniformLocation::INVALID,
        }
    }

    /// Alpha term baked into the fragment stage
    pub const fn source_alpha(&self) -> SourceAlpha {
        self.source_alpha
    }

    /// Scaled destination baked into the fragment stage
    pub const fn blend_target(&self) -> BlendTarget {
        self.blend_target
    }

    /// Cached `u_Alpha` location
    pub const fn alpha_handle(&self) -> UniformLocation {
        self.u_alpha
    }

    /// Clamp `alpha` to [0, 1] and upload it
    ///
    /// `program` must be this shader's binding.
    pub fn set_alpha(&self, program: &mut BoundProgram<'_>, alpha: f32) -> RenderResult<()> {
        self.core.ensure_bound(&self.name, program)?;
        program.set_float(self.u_alpha, utils::clamp(alpha, 0.0, 1.0));
        Ok(())
    }
}

impl Default for AlphaBlendedTexturedShader {
    fn default() -> Self {
        Self::new(SourceAlpha::default(), BlendTarget::default())
    }
}

impl Shader for AlphaBlendedTexturedShader {
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
            vertex: ALPHA_BLENDED_VERTEX_SHADER.to_owned(),
            fragment: fragment_source(self.source_alpha, self.blend_target),
            attributes: TEXTURED_ATTRIBUTES.to_vec(),
        }
    }

    fn set_variable_handles(&mut self, program: &mut BoundProgram<'_>) {
        self.core.resolve_common(program);
        self.u_alpha = program.uniform(names::U_ALPHA);
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
        if let Some(vars) = model.shader_vars {
            self.set_alpha(program, vars.alpha)?;
        }
        Ok(())
    }

    fn reset_variable_handles(&mut self) {
        self.u_alpha = UniformLocation::INVALID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::{GlCall, RecordingBackend, UniformValue};
    use crate::render::RenderError;
    use std::collections::HashSet;

    fn ready(source_alpha: SourceAlpha, blend_target: BlendTarget) -> (AlphaBlendedTexturedShader, RecordingBackend) {
        let mut gl = RecordingBackend::new();
        let mut shader = AlphaBlendedTexturedShader::new(source_alpha, blend_target);
        shader.initialize(&mut gl).unwrap();
        (shader, gl)
    }

    fn uploaded_alpha(shader: &AlphaBlendedTexturedShader, gl: &RecordingBackend) -> Option<UniformValue> {
        gl.uniform_value(shader.core().program()?, "u_Alpha")
    }

    #[test]
    fn test_src_alpha_alpha_only_fragment() {
        let text = fragment_source(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
        assert!(text.contains("gl_FragColor.a *= u_Alpha;"));
    }

    #[test]
    fn test_one_minus_full_color_fragment() {
        let text = fragment_source(SourceAlpha::OneMinusSrcAlpha, BlendTarget::FullColor);
        assert!(text.contains("gl_FragColor *= 1.0 - u_Alpha;"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        for source_alpha in SourceAlpha::ALL {
            for blend_target in BlendTarget::ALL {
                assert_eq!(
                    fragment_source(source_alpha, blend_target),
                    fragment_source(source_alpha, blend_target)
                );
            }
        }
    }

    #[test]
    fn test_each_configuration_substitutes_one_pair() {
        let mut bodies = HashSet::new();
        for source_alpha in SourceAlpha::ALL {
            for blend_target in BlendTarget::ALL {
                let text = fragment_source(source_alpha, blend_target);
                let line = text
                    .lines()
                    .find(|line| line.contains("*="))
                    .expect("fade statement");
                assert_eq!(text.matches("*=").count(), 1);
                assert_eq!(
                    line.trim(),
                    format!("{} *= {};", blend_target.destination(), source_alpha.expression())
                );
                bodies.insert(text);
            }
        }
        assert_eq!(bodies.len(), 4);
    }

    #[test]
    fn test_sources_are_byte_exact() {
        assert_eq!(
            ALPHA_BLENDED_VERTEX_SHADER,
            "uniform mat4 u_MVPMatrix; \nattribute vec4 a_Position; \nattribute vec2 a_TexCoordinate; \n\
             varying vec2 v_TexCoordinate; \nvoid main() { \n\t  v_TexCoordinate = a_TexCoordinate; \n    \
             gl_Position = u_MVPMatrix * a_Position; \n} \n"
        );
        assert_eq!(
            fragment_source(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly),
            "precision mediump float; \nuniform sampler2D u_Texture; \nuniform float u_Alpha; \n\
             varying vec2 v_TexCoordinate; \nvoid main() { \n\
             \t\tgl_FragColor = texture2D(u_Texture, v_TexCoordinate); \n       gl_FragColor.a *= u_Alpha; \n}"
        );
    }

    #[test]
    fn test_vertex_stage_declares_textured_names() {
        let source = AlphaBlendedTexturedShader::default().init_shaders();
        assert_eq!(source.vertex, ALPHA_BLENDED_VERTEX_SHADER);
        assert_eq!(source.declared_attributes(), vec!["a_Position", "a_TexCoordinate"]);
        assert_eq!(source.attributes, vec!["a_Position", "a_TexCoordinate"]);
        assert_eq!(source.declared_uniforms(), vec!["u_MVPMatrix", "u_Texture", "u_Alpha"]);
    }

    #[test]
    fn test_queried_names_match_declared_names() {
        let (shader, gl) = ready(SourceAlpha::SrcAlpha, BlendTarget::FullColor);
        let program = shader.core().program().unwrap();
        let source = shader.init_shaders();

        let queried: HashSet<&str> = gl.queried_uniforms(program).into_iter().collect();
        let declared = source.declared_uniforms();
        let declared: HashSet<&str> = declared.iter().map(String::as_str).collect();
        assert_eq!(queried, declared);

        let queried: HashSet<&str> = gl.queried_attributes(program).into_iter().collect();
        let declared = source.declared_attributes();
        let declared: HashSet<&str> = declared.iter().map(String::as_str).collect();
        assert_eq!(queried, declared);
    }

    #[test]
    fn test_set_alpha_clamps() {
        let (shader, mut gl) = ready(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);

        let mut bound = shader.bind(&mut gl).unwrap();
        shader.set_alpha(&mut bound, 1.5).unwrap();
        drop(bound);
        assert_eq!(uploaded_alpha(&shader, &gl), Some(UniformValue::Float(1.0)));

        let mut bound = shader.bind(&mut gl).unwrap();
        shader.set_alpha(&mut bound, -0.3).unwrap();
        drop(bound);
        assert_eq!(uploaded_alpha(&shader, &gl), Some(UniformValue::Float(0.0)));

        let mut bound = shader.bind(&mut gl).unwrap();
        shader.set_alpha(&mut bound, 0.35).unwrap();
        drop(bound);
        assert_eq!(uploaded_alpha(&shader, &gl), Some(UniformValue::Float(0.35)));
    }

    #[test]
    fn test_shader_params_forward_model_alpha() {
        let (mut shader, mut gl) = ready(SourceAlpha::OneMinusSrcAlpha, BlendTarget::FullColor);
        let model = ModelParams::default().with_alpha(2.0);

        shader
            .prepare_draw(&mut gl, &RendererParams::default(), &model, &SceneParams::default())
            .unwrap();

        assert_eq!(uploaded_alpha(&shader, &gl), Some(UniformValue::Float(1.0)));
        let program = shader.core().program().unwrap();
        assert!(matches!(gl.uniform_value(program, "u_MVPMatrix"), Some(UniformValue::Mat4(_))));
    }

    #[test]
    fn test_missing_shader_vars_skip_alpha_upload() {
        let (mut shader, mut gl) = ready(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
        gl.clear_calls();

        shader
            .prepare_draw(&mut gl, &RendererParams::default(), &ModelParams::default(), &SceneParams::default())
            .unwrap();

        assert_eq!(uploaded_alpha(&shader, &gl), None);
        let alpha = shader.alpha_handle();
        assert!(!gl.calls.iter().any(|c| matches!(c, GlCall::Uniform(loc, _) if *loc == alpha)));
    }

    #[test]
    fn test_set_alpha_rejects_foreign_binding() {
        let (shader, mut gl) = ready(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
        let mut other = AlphaBlendedTexturedShader::with_name("other", SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
        other.initialize(&mut gl).unwrap();

        let mut bound = other.bind(&mut gl).unwrap();
        let err = shader.set_alpha(&mut bound, 0.5).unwrap_err();
        drop(bound);

        assert!(matches!(err, RenderError::ProgramMismatch { .. }));
        assert_eq!(uploaded_alpha(&shader, &gl), None);
    }

    #[test]
    fn test_context_loss_invalidates_alpha_handle() {
        let (mut shader, mut gl) = ready(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
        assert!(shader.alpha_handle().is_valid());

        gl.lose_context();
        shader.on_context_lost();
        assert!(!shader.alpha_handle().is_valid());

        let model = ModelParams::default().with_alpha(0.25);
        shader
            .prepare_draw(&mut gl, &RendererParams::default(), &model, &SceneParams::default())
            .unwrap();
        assert!(shader.alpha_handle().is_valid());
        assert_eq!(uploaded_alpha(&shader, &gl), Some(UniformValue::Float(0.25)));
    }

    #[test]
    fn test_fade_axes_serialize_snake_case() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Fade {
            source_alpha: SourceAlpha,
            blend_target: BlendTarget,
        }

        let text = toml::to_string(&Fade {
            source_alpha: SourceAlpha::OneMinusSrcAlpha,
            blend_target: BlendTarget::FullColor,
        })
        .unwrap();
        assert!(text.contains("source_alpha = \"one_minus_src_alpha\""));
        assert!(text.contains("blend_target = \"full_color\""));
    }
}
