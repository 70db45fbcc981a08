//! Per-draw parameters handed to shaders by the renderer

use crate::foundation::math::{Mat4, Transform};
use crate::render::Camera;

/// Frame-level renderer state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererParams {
    /// Viewport size in pixels
    pub viewport: (u32, u32),
    /// Seconds since the renderer started
    pub time: f32,
    /// Frame counter
    pub frame: u64,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self { viewport: (1, 1), time: 0.0, frame: 0 }
    }
}

/// Optional per-model values consumed by specific shaders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderVars {
    /// Fade factor; clamped to [0, 1] on upload
    pub alpha: f32,
}

/// Per-model draw state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelParams {
    /// Model-to-world transform
    pub transform: Transform,
    /// Shader-specific variables; `None` leaves those uniforms untouched
    pub shader_vars: Option<ShaderVars>,
}

impl ModelParams {
    /// Params for a model placed by `transform`
    pub fn new(transform: Transform) -> Self {
        Self { transform, shader_vars: None }
    }

    /// Attach an alpha value for fading shaders
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.shader_vars = Some(ShaderVars { alpha });
        self
    }

    /// Model matrix for this draw
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// Camera state shared by every model in a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    /// World-to-view matrix
    pub view: Mat4,
    /// View-to-clip matrix
    pub projection: Mat4,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self { view: Mat4::identity(), projection: Mat4::identity() }
    }
}

impl SceneParams {
    /// Scene params from explicit matrices
    pub const fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Snapshot a camera's matrices
    pub fn from_camera(camera: &Camera) -> Self {
        Self { view: camera.view_matrix(), projection: camera.projection_matrix() }
    }

    /// Combined model-view-projection matrix for `model`
    pub fn mvp(&self, model: &ModelParams) -> Mat4 {
        self.projection * self.view * model.model_matrix()
    }
}
