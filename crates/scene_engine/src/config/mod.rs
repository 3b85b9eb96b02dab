//! Configuration system
//!
//! Any serde type can be loaded from or saved to TOML or RON; the format is
//! chosen by file extension.

mod scene_config;

pub use scene_config::{CameraConfig, FrameConfig, ModelConfig, OrbitConfig, SceneConfig, SpotLightConfig};
pub use serde::{Deserialize, Serialize};

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("ron") => Ok(Format::Ron),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

fn parse<T: for<'de> Deserialize<'de>>(contents: &str, path: &Path) -> Result<T, ConfigError> {
    let parsed = match format_of(path)? {
        Format::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        Format::Ron => ron::from_str(contents).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        format_of(path)?;
        let contents = std::fs::read_to_string(path)?;
        parse(&contents, path)
    }

    /// Parse configuration text, using `path` only to pick the format
    fn load_from_str(contents: &str, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        parse(contents, path.as_ref())
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match format_of(path)? {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents).map_err(ConfigError::Io)
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
}
