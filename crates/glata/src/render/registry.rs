//! Shader registry
//!
//! Owns shader instances for a renderer, keyed by slotmap handles. The
//! registry is where the context-loss policy is applied across every
//! program at once.

use slotmap::{new_key_type, SlotMap};

use crate::config::ShaderSetConfig;
use crate::render::gl::{BoundProgram, GlBackend};
use crate::render::shader::{ModelParams, RendererParams, SceneParams, Shader, ShaderState};
use crate::render::{RenderError, RenderResult};

new_key_type! {
    /// Handle to a shader owned by a [`ShaderRegistry`]
    pub struct ShaderKey;
}

/// Owns shaders and drives their lifecycle together
#[derive(Default)]
pub struct ShaderRegistry {
    shaders: SlotMap<ShaderKey, Box<dyn Shader>>,
}

impl ShaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every shader named in `config`, in order
    ///
    /// Nothing touches GL until [`Self::initialize_all`] or the first draw.
    pub fn from_config(config: &ShaderSetConfig) -> (Self, Vec<ShaderKey>) {
        let mut registry = Self::new();
        let keys = config
            .shaders
            .iter()
            .map(|entry| registry.insert(entry.shader.build(entry.name.clone())))
            .collect();
        (registry, keys)
    }

    /// Take ownership of a shader
    pub fn insert(&mut self, shader: Box<dyn Shader>) -> ShaderKey {
        log::debug!("Registering shader '{}'", shader.name());
        self.shaders.insert(shader)
    }

    /// Release the shader's program and hand the shader back
    pub fn remove(&mut self, key: ShaderKey, gl: &mut dyn GlBackend) -> Option<Box<dyn Shader>> {
        let mut shader = self.shaders.remove(key)?;
        shader.release(gl);
        Some(shader)
    }

    /// Look up a shader
    pub fn get(&self, key: ShaderKey) -> Option<&dyn Shader> {
        self.shaders.get(key).map(|shader| &**shader)
    }

    /// Find a shader by name
    pub fn find(&self, name: &str) -> Option<ShaderKey> {
        self.shaders.iter().find(|(_, shader)| shader.name() == name).map(|(key, _)| key)
    }

    /// Number of registered shaders
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Whether no shaders are registered
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Shaders in the given state
    pub fn count_in_state(&self, state: ShaderState) -> usize {
        self.shaders.values().filter(|shader| shader.state() == state).count()
    }

    /// Initialize every shader
    ///
    /// Attempts all of them even when some fail; returns the first error.
    pub fn initialize_all(&mut self, gl: &mut dyn GlBackend) -> RenderResult<()> {
        let mut first_error = None;
        for shader in self.shaders.values_mut() {
            if let Err(e) = shader.initialize(gl) {
                first_error.get_or_insert(e);
            }
        }
        log::info!(
            "Initialized {}/{} shaders",
            self.count_in_state(ShaderState::HandlesResolved),
            self.shaders.len()
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Initialize (if needed), bind and parameterize one shader
    pub fn prepare_draw<'a>(
        &mut self,
        key: ShaderKey,
        gl: &'a mut dyn GlBackend,
        renderer: &RendererParams,
        model: &ModelParams,
        scene: &SceneParams,
    ) -> RenderResult<BoundProgram<'a>> {
        let shader = self.shaders.get_mut(key).ok_or(RenderError::UnknownShader)?;
        shader.prepare_draw(gl, renderer, model, scene)
    }

    /// Apply the context-loss policy to every shader
    pub fn on_context_lost(&mut self) {
        log::info!("GL context lost; {} shaders will re-initialize", self.shaders.len());
        for shader in self.shaders.values_mut() {
            shader.on_context_lost();
        }
    }

    /// Delete every program; shaders stay registered
    pub fn release_all(&mut self, gl: &mut dyn GlBackend) {
        for shader in self.shaders.values_mut() {
            shader.release(gl);
        }
    }
}

impl std::fmt::Debug for ShaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.shaders.values().map(|shader| (shader.name(), shader.state())))
            .finish()
    }
}
