//! Configuration management for MDView
//!
//! Handles loading, saving, and validating application configuration.
//! Configuration is persisted as JSON in the platform configuration directory.

use crate::error::{ConfigError, ConfigResult};
use crate::state::{PresentationSettings, ThemeMode, MIN_FONT_SIZE_PT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "io.github.mdview";

/// Maximum file size to open (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default preview font size in points
pub const DEFAULT_FONT_SIZE_PT: u32 = 12;

/// Maximum number of recent files to remember
pub const MAX_RECENT_FILES: usize = 20;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration
    pub render: RenderConfig,

    /// File handling configuration
    pub files: FileConfig,
}

impl Config {
    /// Load configuration from the default location, or return defaults
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Check values that serde alone cannot enforce
    pub fn validate(&self) -> ConfigResult<()> {
        if self.render.font_size_pt < MIN_FONT_SIZE_PT {
            return Err(ConfigError::InvalidValue {
                key: "render.font_size_pt".to_string(),
                reason: format!("must be at least {}", MIN_FONT_SIZE_PT),
            });
        }
        if self.render.diagram_languages.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "render.diagram_languages".to_string(),
                reason: "at least one diagram language is required".to_string(),
            });
        }
        Ok(())
    }

    /// Initial presentation settings for a new session
    pub fn presentation(&self) -> PresentationSettings {
        PresentationSettings::new(self.render.theme, self.render.font_size_pt)
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path (for session data)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    fn config_file_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial theme
    pub theme: ThemeMode,

    /// Initial preview font size in points
    pub font_size_pt: u32,

    /// Fence languages rendered as diagrams
    pub diagram_languages: Vec<String>,

    /// Command used to rasterize Mermaid diagrams
    pub mermaid_command: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            diagram_languages: vec!["mermaid".to_string()],
            mermaid_command: "mmdc".to_string(),
        }
    }
}

/// File handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// File extensions listed in the document browser
    pub visible_extensions: Vec<String>,

    /// Show hidden files in the document browser
    pub show_hidden_files: bool,

    /// Directories to ignore when scanning
    pub ignored_directories: Vec<String>,

    /// Maximum file size to open (in bytes)
    pub max_file_size: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            visible_extensions: vec!["md".to_string(), "markdown".to_string()],
            show_hidden_files: false,
            ignored_directories: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "__pycache__".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
                "target".to_string(),
            ],
            max_file_size: MAX_FILE_SIZE,
        }
    }
}
