//! Error types for MDView
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Document session errors
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Render pipeline errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when accessing file
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File is too large to open
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Diagram rendering errors, isolated to a single fenced block
#[derive(Error, Debug)]
pub enum DiagramError {
    /// Diagram block has no content
    #[error("Diagram source is empty")]
    EmptySource,

    /// The external diagram tool is not installed
    #[error("Diagram tool not found: {command}")]
    ToolNotFound { command: String },

    /// The external diagram tool could not be started
    #[error("Could not start diagram tool: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external diagram tool exited with an error
    #[error("Diagram tool failed ({status}): {stderr}")]
    ToolFailed { status: String, stderr: String },

    /// The tool succeeded but produced no image
    #[error("Diagram tool produced no output")]
    EmptyOutput,

    /// Temporary file handling failed
    #[error("Diagram I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Renderer-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Whole-document render failures, surfaced as a substitute error document
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document source could not be read
    #[error(transparent)]
    Source(#[from] FileError),

    /// A background render worker did not complete
    #[error("Render worker failed: {0}")]
    Worker(String),
}

/// Document session operation errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// No tab is open for the path
    #[error("No open tab for {path}")]
    TabNotFound { path: PathBuf },

    /// The operation is only allowed on the active tab
    #[error("{path} is not the active tab")]
    NotActiveTab { path: PathBuf },

    /// Split view requires two distinct documents
    #[error("Cannot compare {path} with itself")]
    SameDocument { path: PathBuf },

    /// Edit mode is not offered while split view is shown
    #[error("Edit mode is unavailable while split view is active")]
    SplitViewActive,

    /// Split view is only reachable from preview navigation
    #[error("Leave edit mode on {path} before comparing documents")]
    EditModeActive { path: PathBuf },

    /// The tab has no edit buffer
    #[error("{path} is not in edit mode")]
    NotEditing { path: PathBuf },

    /// Leaving edit mode would discard unsaved changes
    #[error("{path} has unsaved changes; save or cancel them first")]
    UnsavedEdits { path: PathBuf },

    /// Reading or writing the document failed
    #[error(transparent)]
    Storage(#[from] FileError),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for diagram rendering
pub type DiagramResult<T> = Result<T, DiagramError>;

impl FileError {
    /// Create a user-friendly error message suitable for display in dialogs
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::PermissionDenied { .. } => {
                "You don't have permission to access this file. Check file permissions.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to open. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::WriteError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl SessionError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Storage(err) => err.user_message(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::NotFound(PathBuf::from("/test/file.md"));
        assert!(err.to_string().contains("/test/file.md"));
    }

    #[test]
    fn test_file_error_user_message() {
        let err = FileError::PermissionDenied {
            path: PathBuf::from("/test/file.md"),
        };
        let msg = err.user_message();
        assert!(msg.contains("permission"));
    }

    #[test]
    fn test_app_error_from_file_error() {
        let file_err = FileError::NotFound(PathBuf::from("/test.md"));
        let app_err: AppError = file_err.into();
        assert!(matches!(app_err, AppError::FileIO(_)));
    }

    #[test]
    fn test_session_error_wraps_storage_message() {
        let err: SessionError = FileError::WriteError {
            path: PathBuf::from("/notes.md"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        }
        .into();
        assert!(err.user_message().contains("Could not save"));
    }

    #[test]
    fn test_diagram_error_display() {
        let err = DiagramError::ToolFailed {
            status: "exit status: 1".to_string(),
            stderr: "Parse error on line 2".to_string(),
        };
        assert!(err.to_string().contains("Parse error on line 2"));
    }
}
