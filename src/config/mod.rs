//! Configuration module for cle-assistant
//!
//! Holds the user's export preferences, the generator identity written into
//! every artifact, the notebook runner command and an optional catalog file.
//!
//! # Location
//!
//! The configuration is stored in the platform-appropriate config directory:
//! - **Linux**: `~/.config/cle-assistant/config.json`
//! - **macOS**: `~/Library/Application Support/cle-assistant/config.json`
//! - **Windows**: `%APPDATA%\cle-assistant\config.json`
//!
//! Every field has a default, so a partial file (or none at all) is valid.
//!
//! # Example
//!
//! ```ignore
//! use cle_assistant::config::AppConfig;
//!
//! let mut config = AppConfig::load_or_default();
//! config.export.show_results = false;
//! config.save_default()?;
//! ```

use crate::error::{AssistantError, Result};
use crate::pipeline::generator::GeneratorKind;
use crate::pipeline::step::NamingScheme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const APP_DIR: &str = "cle-assistant";

/// Config filename
pub const CONFIG_FILE: &str = "config.json";

/// Get the cle-assistant config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_DIR))
}

/// Default location of the config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|d| d.join(CONFIG_FILE))
}

/// What an export produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Emit a display call after every step
    pub show_results: bool,
    /// How step outputs are named
    pub naming: NamingScheme,
    /// Expand a leading `~` in output paths
    pub expand_home: bool,
    /// Target used when none is given
    pub default_target: GeneratorKind,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            show_results: true,
            naming: NamingScheme::Sequential,
            expand_home: false,
            default_target: GeneratorKind::Script,
        }
    }
}

/// Identity and library names written into generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub tool_name: String,
    pub version: String,
    /// Python package the generated code imports
    pub package: String,
    /// Alias the package is imported as
    pub module_alias: String,
    /// Link printed in the install hint
    pub docs_url: String,
    /// Name of the viewer object in host scripts
    pub viewer_variable: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            tool_name: "cle-assistant".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            package: "pyclesperanto_prototype".to_string(),
            module_alias: "cle".to_string(),
            docs_url: "https://clesperanto.net".to_string(),
            viewer_variable: "viewer".to_string(),
        }
    }
}

/// External notebook execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Program to launch
    pub command: String,
    /// Arguments placed before the notebook path
    pub args: Vec<String>,
    /// Run notebooks after writing them
    pub execute_notebooks: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            command: "jupyter".to_string(),
            args: ["nbconvert", "--to", "notebook", "--inplace", "--execute"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            execute_notebooks: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportSettings,
    pub generator: GeneratorSettings,
    pub runner: RunnerSettings,
    /// Operation catalog replacing the built-in one
    pub catalog: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            AssistantError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssistantError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AssistantError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            AssistantError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }

    /// Save to the default location, returning the path written
    pub fn save_default(&self) -> Result<PathBuf> {
        let path = default_config_path().ok_or_else(|| {
            AssistantError::Config("Could not determine config directory".to_string())
        })?;
        self.save(&path)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.export.show_results);
        assert!(!config.export.expand_home);
        assert_eq!(config.export.naming, NamingScheme::Sequential);
        assert_eq!(config.generator.module_alias, "cle");
        assert_eq!(config.runner.command, "jupyter");
        assert_eq!(config.runner.args.last().map(String::as_str), Some("--execute"));
        assert!(!config.runner.execute_notebooks);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.export.naming = NamingScheme::DisplayName;
        config.export.default_target = GeneratorKind::Notebook;
        config.catalog = Some(PathBuf::from("ops.toml"));
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let json = r#"{ "export": { "show_results": false, "naming": "display-name" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(!config.export.show_results);
        assert_eq!(config.export.naming, NamingScheme::DisplayName);
        assert_eq!(config.export.default_target, GeneratorKind::Script);
        assert_eq!(config.generator, GeneratorSettings::default());
    }

    #[test]
    fn test_load_invalid_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, AssistantError::Config(_)));
    }

    #[test]
    fn test_app_config_dir_name() {
        if let Some(dir) = app_config_dir() {
            assert!(dir.ends_with(APP_DIR));
        }
    }
}
