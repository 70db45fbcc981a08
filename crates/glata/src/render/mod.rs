//! # Rendering System
//!
//! Shader programs and the GL seam they talk through.
//!
//! ## Architecture
//!
//! - **gl**: the [`gl::GlBackend`] trait, handle types, and the explicit
//!   [`gl::BoundProgram`] binding that every uniform upload goes through
//! - **shader**: the shared shader lifecycle and per-draw parameters
//! - **shaders**: concrete programs (textured, alpha blended)
//! - **registry**: owns shader instances and applies the context-loss policy
//! - **camera**: view/projection source for [`shader::SceneParams`]
//!
//! All GL work happens on the thread owning the context. Nothing here is
//! `Send`-bound and nothing blocks beyond synchronous driver calls.

pub mod camera;
pub mod gl;
pub mod registry;
pub mod shader;
pub mod shaders;

pub use camera::Camera;
pub use registry::{ShaderKey, ShaderRegistry};

use thiserror::Error;

use gl::ShaderStage;

/// High-level rendering error types
///
/// Compile and link failures carry the driver's info log verbatim so it can
/// be surfaced to whoever wrote the shader text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A shader stage failed to compile
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Driver info log
        log: String,
    },

    /// The program failed to link
    #[error("Shader program link failed: {log}")]
    ShaderLink {
        /// Driver info log
        log: String,
    },

    /// The shader failed to build earlier and will not be retried
    #[error("Shader '{0}' failed to build and cannot be used")]
    ShaderFailed(String),

    /// The shader has no linked program with resolved handles
    #[error("Shader '{0}' is not initialized")]
    ShaderNotReady(String),

    /// A uniform upload was attempted through another program's binding
    #[error("Program {bound} is bound but shader '{shader}' owns program {expected}")]
    ProgramMismatch {
        /// Shader that attempted the upload
        shader: String,
        /// Program owned by that shader
        expected: u32,
        /// Program actually bound
        bound: u32,
    },

    /// No shader is registered under the key
    #[error("No shader registered under this key")]
    UnknownShader,

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
