//! Configuration system
//!
//! Files are TOML (`.toml`) or RON (`.ron`), picked by extension.

use std::collections::HashSet;
use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::render::shaders::{BlendTarget, ShaderKind, SourceAlpha};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, Format::from_path(path)?)
    }

    /// Parse configuration text in the given format
    fn from_str_with_format(contents: &str, format: Format) -> Result<Self, ConfigError> {
        match format {
            Format::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render configuration text in the given format
    fn to_string_with_format(&self, format: Format) -> Result<String, ConfigError> {
        match format {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_string_with_format(Format::from_path(path)?)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML
    Toml,
    /// Rusty Object Notation
    Ron,
}

impl Format {
    /// Format for a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Well-formed but unusable contents
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A shader variant under a unique name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedShader {
    /// Name used for lookup and logs
    pub name: String,
    /// Which program to build
    pub shader: ShaderKind,
}

impl NamedShader {
    /// Pair a name with a kind
    pub fn new(name: impl Into<String>, shader: ShaderKind) -> Self {
        Self { name: name.into(), shader }
    }
}

/// The set of shaders a renderer should build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSetConfig {
    /// Shaders in build order
    #[serde(default)]
    pub shaders: Vec<NamedShader>,
}

impl Default for ShaderSetConfig {
    fn default() -> Self {
        Self {
            shaders: vec![
                NamedShader::new("textured", ShaderKind::Textured),
                NamedShader::new(
                    "fade",
                    ShaderKind::AlphaBlended {
                        source_alpha: SourceAlpha::SrcAlpha,
                        blend_target: BlendTarget::AlphaOnly,
                    },
                ),
            ],
        }
    }
}

/// Whether `name` is a single plain path component
///
/// Shader names become `<name>.vert` / `<name>.frag` file stems, so they may
/// not contain separators or refer to `.` / `..`.
pub fn is_plain_name(name: &str) -> bool {
    !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

impl ShaderSetConfig {
    /// Reject empty, duplicate or path-like names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.shaders {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Invalid("shader name is empty".to_owned()));
            }
            if !is_plain_name(&entry.name) {
                return Err(ConfigError::Invalid(format!(
                    "shader name '{}' must be a single file name component",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate shader name '{}'", entry.name)));
            }
        }
        Ok(())
    }
}

impl Config for ShaderSetConfig {}
