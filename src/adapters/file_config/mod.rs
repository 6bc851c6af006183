// File config adapter - Pipeline settings from TOML or YAML files

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::errors::DomainError;
use crate::domain::model::PipelineSettings;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "stillcast.toml";

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from the file extension; TOML unless `.yaml`/`.yml`
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Settings file adapter
pub struct FileConfigAdapter;

impl FileConfigAdapter {
    /// Resolve which settings file to load, if any
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        }
    }

    /// Load settings from a file; keys missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<PipelineSettings, DomainError> {
        if !path.is_file() {
            return Err(DomainError::FileNotFound(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigParse(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let settings = Self::parse(&content, ConfigFormat::from_path(path))
            .map_err(|e| DomainError::ConfigParse(format!("{}: {}", path.display(), e)))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(settings)
    }

    /// Parse settings text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineSettings, String> {
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(PipelineSettings::default());
                }
                serde_yaml::from_str(content).map_err(|e| e.to_string())
            }
        }
    }
}
