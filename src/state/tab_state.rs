//! Tab bar state management
//!
//! Manages the ordered set of open tabs, the active tab, and each tab's
//! view mode.

use super::EditBuffer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a tab presents its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    /// Rendered HTML
    #[default]
    Preview,
    /// Raw text in an edit buffer
    Edit,
}

/// Per-tab view state. The edit buffer only exists while editing.
#[derive(Debug, Clone)]
pub enum TabView {
    Preview,
    Edit(EditBuffer),
}

impl TabView {
    pub fn mode(&self) -> ViewMode {
        match self {
            TabView::Preview => ViewMode::Preview,
            TabView::Edit(_) => ViewMode::Edit,
        }
    }
}

/// A single tab in the tab bar
#[derive(Debug, Clone)]
pub struct Tab {
    /// Path of the document this tab shows
    pub path: PathBuf,

    /// Display title for the tab
    pub title: String,

    /// Preview or edit state
    pub view: TabView,
}

impl Tab {
    /// Create a new tab in preview mode
    pub fn new(path: PathBuf, title: String) -> Self {
        Self {
            path,
            title,
            view: TabView::Preview,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    /// The edit buffer, if the tab is in edit mode
    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        match &self.view {
            TabView::Edit(buffer) => Some(buffer),
            TabView::Preview => None,
        }
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        match &mut self.view {
            TabView::Edit(buffer) => Some(buffer),
            TabView::Preview => None,
        }
    }

    /// Whether the tab holds edits that have not been saved
    pub fn has_unsaved_edits(&self) -> bool {
        self.edit_buffer().map_or(false, EditBuffer::is_modified)
    }

    /// Display title with a modification indicator
    pub fn display_title(&self) -> String {
        if self.has_unsaved_edits() {
            format!("• {}", self.title)
        } else {
            self.title.clone()
        }
    }
}

/// State of the tab bar
#[derive(Debug, Clone, Default)]
pub struct TabState {
    /// Ordered list of tabs (insertion order)
    pub tabs: Vec<Tab>,

    /// Index of the currently active tab
    pub active_index: Option<usize>,
}

impl TabState {
    /// Create a new empty tab state
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new tab and make it active
    pub fn add_tab(&mut self, path: PathBuf, title: String) {
        self.tabs.push(Tab::new(path, title));
        self.active_index = Some(self.tabs.len() - 1);
    }

    /// Remove a tab by path, returning it.
    ///
    /// If the removed tab was active, the tab now occupying its position
    /// becomes active (or the new last tab, or none).
    pub fn remove_tab(&mut self, path: &Path) -> Option<Tab> {
        let index = self.find_tab_index(path)?;
        let tab = self.tabs.remove(index);

        if self.tabs.is_empty() {
            self.active_index = None;
        } else if let Some(active) = self.active_index {
            if active == index {
                self.active_index = Some(active.min(self.tabs.len() - 1));
            } else if active > index {
                self.active_index = Some(active - 1);
            }
        }

        Some(tab)
    }

    /// Set the active tab by path
    pub fn set_active(&mut self, path: &Path) -> bool {
        match self.find_tab_index(path) {
            Some(index) => {
                self.active_index = Some(index);
                true
            }
            None => false,
        }
    }

    /// Set the active tab by index
    pub fn set_active_index(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active_index = Some(index);
        }
    }

    /// Get the active tab's path
    pub fn active_path(&self) -> Option<&Path> {
        self.active_tab().map(|tab| tab.path.as_path())
    }

    /// Get the active tab reference
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_index.and_then(|i| self.tabs.get(i))
    }

    /// Find tab index by path
    pub fn find_tab_index(&self, path: &Path) -> Option<usize> {
        self.tabs.iter().position(|t| t.path == path)
    }

    pub fn get(&self, path: &Path) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.path == path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.path == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.find_tab_index(path).is_some()
    }

    /// Move to the next tab
    pub fn next_tab(&mut self) {
        if let Some(active) = self.active_index {
            if !self.tabs.is_empty() {
                self.active_index = Some((active + 1) % self.tabs.len());
            }
        } else if !self.tabs.is_empty() {
            self.active_index = Some(0);
        }
    }

    /// Move to the previous tab
    pub fn prev_tab(&mut self) {
        if let Some(active) = self.active_index {
            if !self.tabs.is_empty() {
                self.active_index = Some(if active == 0 {
                    self.tabs.len() - 1
                } else {
                    active - 1
                });
            }
        } else if !self.tabs.is_empty() {
            self.active_index = Some(self.tabs.len() - 1);
        }
    }

    /// Get tab count
    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    /// Check if there are any tabs
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Get iterator over tabs
    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    /// Get all paths in tab order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.tabs.iter().map(|t| t.path.clone()).collect()
    }
}
