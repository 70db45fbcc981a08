//! GLSL source bundles and the names shared between source and lookups

/// Uniform and attribute names used by the textured shaders
pub mod names {
    /// Combined model/view/projection matrix
    pub const U_MVP_MATRIX: &str = "u_MVPMatrix";
    /// Texture sampler
    pub const U_TEXTURE: &str = "u_Texture";
    /// Fade factor
    pub const U_ALPHA: &str = "u_Alpha";
    /// Per-vertex position
    pub const A_POSITION: &str = "a_Position";
    /// Per-vertex texture coordinate
    pub const A_TEX_COORDINATE: &str = "a_TexCoordinate";
}

/// Vertex and fragment text for one program, plus the attributes to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage GLSL
    pub vertex: String,
    /// Fragment stage GLSL
    pub fragment: String,
    /// Attribute names, bound to indices 0..n before linking
    pub attributes: Vec<&'static str>,
}

impl ShaderSource {
    /// Uniforms declared across both stages, vertex stage first, deduplicated
    pub fn declared_uniforms(&self) -> Vec<String> {
        let mut uniforms = declarations(&self.vertex, "uniform");
        for name in declarations(&self.fragment, "uniform") {
            if !uniforms.contains(&name) {
                uniforms.push(name);
            }
        }
        uniforms
    }

    /// Attributes declared in the vertex stage
    pub fn declared_attributes(&self) -> Vec<String> {
        declarations(&self.vertex, "attribute")
    }
}

/// Names declared with `keyword` (`uniform`, `attribute`, `varying`), in order
///
/// A declaration is `<keyword> <type> <name>;`. Good enough for the
/// single-declarator, comment-free GLSL this crate generates.
pub fn declarations(source: &str, keyword: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            let mut tokens = statement.split_whitespace();
            tokens.find(|token| *token == keyword)?;
            let _type_name = tokens.next()?;
            tokens.next().map(str::to_owned)
        })
        .collect()
}
