//! Side-by-side comparison of two documents

use crate::error::{SessionError, SessionResult};
use std::path::{Path, PathBuf};

/// Two distinct documents shown side by side.
///
/// Neither path needs to be open as a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitView {
    left: PathBuf,
    right: PathBuf,
}

impl SplitView {
    /// Pair two documents, rejecting a document compared with itself
    pub fn new(left: PathBuf, right: PathBuf) -> SessionResult<Self> {
        if left == right {
            return Err(SessionError::SameDocument { path: left });
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &Path {
        &self.left
    }

    pub fn right(&self) -> &Path {
        &self.right
    }

    /// Whether either side shows the path
    pub fn contains(&self, path: &Path) -> bool {
        self.left == path || self.right == path
    }
}
