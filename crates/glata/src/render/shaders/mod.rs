//! Concrete shader programs

pub mod alpha_blended;
pub mod textured;

pub use alpha_blended::{fragment_source, AlphaBlendedTexturedShader, BlendTarget, SourceAlpha};
pub use textured::TexturedShader;

use serde::{Deserialize, Serialize};

use crate::render::shader::Shader;

/// Serializable choice of shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderKind {
    /// [`TexturedShader`]
    Textured,
    /// [`AlphaBlendedTexturedShader`] with its fade configuration
    AlphaBlended {
        /// Alpha term
        #[serde(default)]
        source_alpha: SourceAlpha,
        /// Scaled destination
        #[serde(default)]
        blend_target: BlendTarget,
    },
}

impl ShaderKind {
    /// Every kind, each fade configuration listed separately
    pub fn all() -> Vec<Self> {
        let mut kinds = vec![Self::Textured];
        for source_alpha in SourceAlpha::ALL {
            for blend_target in BlendTarget::ALL {
                kinds.push(Self::AlphaBlended { source_alpha, blend_target });
            }
        }
        kinds
    }

    /// Instantiate an uninitialized shader of this kind
    pub fn build(self, name: impl Into<String>) -> Box<dyn Shader> {
        match self {
            Self::Textured => Box::new(TexturedShader::with_name(name)),
            Self::AlphaBlended { source_alpha, blend_target } => {
                Box::new(AlphaBlendedTexturedShader::with_name(name, source_alpha, blend_target))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shader::ShaderState;

    #[test]
    fn test_all_kinds_build_distinct_sources() {
        let kinds = ShaderKind::all();
        assert_eq!(kinds.len(), 5);

        let mut fragments: Vec<String> = kinds
            .iter()
            .map(|kind| kind.build("probe").init_shaders().fragment)
            .collect();
        fragments.sort();
        fragments.dedup();
        assert_eq!(fragments.len(), 5);
    }

    #[test]
    fn test_build_keeps_name_and_starts_uninitialized() {
        let shader = ShaderKind::AlphaBlended {
            source_alpha: SourceAlpha::OneMinusSrcAlpha,
            blend_target: BlendTarget::FullColor,
        }
        .build("fade_out");
        assert_eq!(shader.name(), "fade_out");
        assert_eq!(shader.state(), ShaderState::Uninitialized);
        assert!(shader.init_shaders().fragment.contains("gl_FragColor *= 1.0 - u_Alpha;"));
    }
}
