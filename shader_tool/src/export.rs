//! Source export and offline checks for a shader set

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glata::config::is_plain_name;
use glata::prelude::*;

/// Generated GLSL for one configured shader
#[derive(Debug, Clone)]
pub struct ExportedShader {
    /// Configured name
    pub name: String,
    /// Vertex stage text
    pub vertex: String,
    /// Fragment stage text
    pub fragment: String,
}

/// Generate the sources of every shader in `config`
pub fn generate(config: &ShaderSetConfig) -> Vec<ExportedShader> {
    config
        .shaders
        .iter()
        .map(|entry| {
            let source = entry.shader.build(entry.name.clone()).init_shaders();
            ExportedShader { name: entry.name.clone(), vertex: source.vertex, fragment: source.fragment }
        })
        .collect()
}

/// Write `<name>.vert` and `<name>.frag` per shader into `dir`
pub fn write_sources(shaders: &[ExportedShader], dir: &Path) -> Result<Vec<PathBuf>> {
    if let Some(shader) = shaders.iter().find(|shader| !is_plain_name(&shader.name)) {
        bail!("Shader name '{}' is not a plain file name", shader.name);
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut written = Vec::with_capacity(shaders.len() * 2);
    for shader in shaders {
        for (extension, text) in [("vert", &shader.vertex), ("frag", &shader.fragment)] {
            let path = dir.join(format!("{}.{extension}", shader.name));
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            log::debug!("Wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

/// Print every shader's sources to stdout
pub fn print_sources(shaders: &[ExportedShader]) {
    for shader in shaders {
        println!("// ---- {} (vertex) ----", shader.name);
        println!("{}", shader.vertex);
        println!("// ---- {} (fragment) ----", shader.name);
        println!("{}", shader.fragment);
    }
}

/// Outcome of checking one shader against the recording backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Configured name
    pub name: String,
    /// Declared uniforms the shader never looked up
    pub unqueried: Vec<String>,
    /// Looked-up uniforms or attributes the source never declares
    pub undeclared: Vec<String>,
}

impl CheckReport {
    /// Whether declarations and lookups agree
    pub fn is_clean(&self) -> bool {
        self.unqueried.is_empty() && self.undeclared.is_empty()
    }
}

/// Initialize and draw each shader once without a GPU, comparing the
/// names it looks up with the names its GLSL declares
pub fn check(config: &ShaderSetConfig) -> Result<Vec<CheckReport>> {
    let mut reports = Vec::with_capacity(config.shaders.len());
    for entry in &config.shaders {
        let mut gl = RecordingBackend::new();
        let mut shader = entry.shader.build(entry.name.clone());
        let source = shader.init_shaders();

        let model = ModelParams::default().with_alpha(0.5);
        let program = shader
            .prepare_draw(&mut gl, &RendererParams::default(), &model, &SceneParams::default())
            .with_context(|| format!("Shader '{}' failed to prepare a draw", entry.name))?
            .program();
        if gl.invalid_operations() > 0 {
            bail!("Shader '{}' uploaded uniforms with no program bound", entry.name);
        }

        let declared: BTreeSet<String> =
            source.declared_uniforms().into_iter().chain(source.declared_attributes()).collect();
        let queried: BTreeSet<String> = gl
            .queried_uniforms(program)
            .into_iter()
            .chain(gl.queried_attributes(program))
            .map(str::to_owned)
            .collect();

        reports.push(CheckReport {
            name: entry.name.clone(),
            unqueried: declared.difference(&queried).cloned().collect(),
            undeclared: queried.difference(&declared).cloned().collect(),
        });
    }
    Ok(reports)
}
