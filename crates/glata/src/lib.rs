//! # Glata
//!
//! OpenGL ES shader programs for textured quads, with explicit GL state.
//!
//! ## Features
//!
//! - **Shader lifecycle**: compile, link, resolve handles, push per-draw parameters
//! - **Explicit binding**: uniform uploads only exist on a [`render::gl::BoundProgram`]
//! - **Fade effects**: alpha-blended variants generated from a closed configuration
//! - **GPU-free testing**: [`render::gl::RecordingBackend`] stands in for a driver
//!
//! ## Quick Start
//!
//! ```rust
//! use glata::prelude::*;
//!
//! let mut gl = RecordingBackend::new();
//! let mut shader = AlphaBlendedTexturedShader::new(SourceAlpha::SrcAlpha, BlendTarget::AlphaOnly);
//!
//! let model = ModelParams::default().with_alpha(0.5);
//! let scene = SceneParams::default();
//! shader.prepare_draw(&mut gl, &RendererParams::default(), &model, &scene)?;
//! # Ok::<(), glata::render::RenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for toolkit users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, NamedShader, ShaderSetConfig},
        foundation::math::{Mat4, Mat4Ext, Transform, Vec3},
        render::{
            gl::{BoundProgram, GlBackend, RecordingBackend},
            shader::{ModelParams, RendererParams, SceneParams, Shader, ShaderState, ShaderVars},
            shaders::{AlphaBlendedTexturedShader, BlendTarget, ShaderKind, SourceAlpha, TexturedShader},
            Camera, RenderError, RenderResult, ShaderKey, ShaderRegistry,
        },
    };

    #[cfg(feature = "glow")]
    pub use crate::render::gl::GlowBackend;
}
