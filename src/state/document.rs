//! Open documents and their source text

use crate::error::FileResult;
use crate::file_handler::Storage;
use std::path::{Path, PathBuf};

/// A document known to the session, identified by its path.
///
/// The source text is read lazily on first use and only replaced again
/// by an explicit save.
#[derive(Debug, Clone)]
pub struct Document {
    /// File path, also the document's identity
    pub path: PathBuf,

    /// Display name for tabs and titles
    pub display_name: String,

    raw_text: Option<String>,
}

impl Document {
    /// Create a document whose text has not been read yet
    pub fn new(path: PathBuf) -> Self {
        let display_name = display_name_for(&path);
        Self {
            path,
            display_name,
            raw_text: None,
        }
    }

    /// Create a document with already known text
    pub fn with_text(path: PathBuf, text: String) -> Self {
        let mut doc = Self::new(path);
        doc.raw_text = Some(text);
        doc
    }

    /// The source text, if it has been read
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// Whether the source text has been read
    pub fn is_loaded(&self) -> bool {
        self.raw_text.is_some()
    }

    /// Return the source text, reading it from storage on first use.
    ///
    /// A failed read leaves the document unloaded so a later call retries.
    pub fn load(&mut self, storage: &dyn Storage) -> FileResult<&str> {
        if self.raw_text.is_none() {
            let text = storage.read(&self.path)?;
            log::debug!("Loaded {} ({} bytes)", self.path.display(), text.len());
            self.raw_text = Some(text);
        }
        Ok(self.raw_text.as_deref().unwrap_or_default())
    }

    /// Replace the source text after a successful save
    pub fn replace_text(&mut self, text: String) {
        self.raw_text = Some(text);
    }
}

fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
