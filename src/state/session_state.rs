//! Session state for persistence
//!
//! Contains state that should be persisted across application restarts:
//! open files, the active file, presentation settings and recent files.

use super::ThemeMode;
use crate::config::{Config, DEFAULT_FONT_SIZE_PT, MAX_RECENT_FILES};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Session state that can be serialized and restored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    /// Open documents in tab order
    pub open_files: Vec<PathBuf>,

    /// Active document index in open_files
    pub active_file_index: Option<usize>,

    /// Preview theme
    pub theme: ThemeMode,

    /// Preview font size
    pub font_size_pt: u32,

    /// Last browsed directory
    pub last_directory: Option<PathBuf>,

    /// Recent files (limited list, most recent first)
    pub recent_files: Vec<RecentFile>,

    /// Snapshot version for migration
    pub version: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            open_files: Vec::new(),
            active_file_index: None,
            theme: ThemeMode::Light,
            font_size_pt: DEFAULT_FONT_SIZE_PT,
            last_directory: None,
            recent_files: Vec::new(),
            version: SNAPSHOT_VERSION,
        }
    }
}

impl SessionSnapshot {
    /// Load the snapshot from the default location
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::session_file_path()?)
    }

    /// Load a snapshot from a file, or return an empty one if it does not exist
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        let snapshot: SessionSnapshot =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "Session snapshot version {} differs from {}",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }

    /// Save the snapshot to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::session_file_path()?)
    }

    /// Save the snapshot to a file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    fn session_file_path() -> ConfigResult<PathBuf> {
        Config::data_dir().map(|p| p.join("session.json"))
    }

    /// The active file, if any
    pub fn active_file(&self) -> Option<&Path> {
        self.active_file_index
            .and_then(|i| self.open_files.get(i))
            .map(PathBuf::as_path)
    }
}

/// A recently opened file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentFile {
    /// File path
    pub path: PathBuf,

    /// When the file was last opened
    pub last_opened: chrono::DateTime<chrono::Utc>,
}

impl RecentFile {
    /// Get display name (filename)
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Get relative time since last opened
    pub fn relative_time(&self) -> String {
        let now = chrono::Utc::now();
        let duration = now.signed_duration_since(self.last_opened);

        if duration.num_days() > 0 {
            format!("{} days ago", duration.num_days())
        } else if duration.num_hours() > 0 {
            format!("{} hours ago", duration.num_hours())
        } else if duration.num_minutes() > 0 {
            format!("{} minutes ago", duration.num_minutes())
        } else {
            "Just now".to_string()
        }
    }
}

/// Most-recent-first list of opened documents
#[derive(Debug, Clone, Default)]
pub struct RecentFiles {
    entries: Vec<RecentFile>,
}

impl RecentFiles {
    pub fn new(entries: Vec<RecentFile>) -> Self {
        let mut recent = Self { entries };
        recent.entries.truncate(MAX_RECENT_FILES);
        recent
    }

    /// Record an opened file, moving it to the front
    pub fn touch(&mut self, path: &Path) {
        self.entries.retain(|r| r.path != path);
        self.entries.insert(
            0,
            RecentFile {
                path: path.to_path_buf(),
                last_opened: chrono::Utc::now(),
            },
        );
        self.entries.truncate(MAX_RECENT_FILES);
    }

    pub fn entries(&self) -> &[RecentFile] {
        &self.entries
    }
}
