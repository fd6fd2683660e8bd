use crate::config::schema::{GlobalConfig, HookSpec, RemateConfig, ValidationError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read config from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid config ({}): {}", path.display(), source),
                None => write!(f, "invalid config: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

/// The raw TOML document. Settings may live at the top level (a dedicated
/// `remate.toml`) or nested under `[tool.remate]` (a shared `pyproject.toml`);
/// the nested form wins when both are present.
#[derive(Debug, Deserialize, Default)]
struct RawDocument {
    #[serde(default)]
    tool: Option<ToolSection>,
    #[serde(default)]
    hooks: Option<IndexMap<String, HookSpec>>,
    #[serde(default)]
    config: Option<GlobalConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct ToolSection {
    #[serde(default)]
    remate: Option<RemateConfig>,
}

pub fn load_from_str(input: &str) -> Result<RemateConfig, ConfigError> {
    let raw: RawDocument = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;

    let config = match raw.tool.and_then(|tool| tool.remate) {
        Some(nested) => nested,
        None => RemateConfig {
            hooks: raw.hooks.unwrap_or_default(),
            config: raw.config.unwrap_or_default(),
        },
    };

    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RemateConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}
