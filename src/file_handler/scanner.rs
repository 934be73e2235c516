//! Directory scanner for the document browser
//!
//! Produces the tree of eligible documents under a root:
//! - File type filtering by extension
//! - Hidden entries and ignored directories skipped
//! - Directories without any eligible document pruned

use crate::config::FileConfig;
use crate::error::{FileError, FileResult};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for directory scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (lowercase, without dot)
    pub include_extensions: HashSet<String>,

    /// Whether to show hidden entries (starting with .)
    pub show_hidden: bool,

    /// Directories to always ignore
    pub ignored_dirs: HashSet<String>,

    /// Maximum directory depth to descend
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&FileConfig::default())
    }
}

impl From<&FileConfig> for ScanConfig {
    fn from(files: &FileConfig) -> Self {
        Self {
            include_extensions: files
                .visible_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            show_hidden: files.show_hidden_files,
            ignored_dirs: files.ignored_directories.iter().cloned().collect(),
            max_depth: 32,
        }
    }
}

impl ScanConfig {
    /// Set whether to show hidden entries
    pub fn with_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self
    }

    /// Add an extension to include
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.include_extensions.insert(ext.into().to_lowercase());
        self
    }

    /// Add a directory to ignore
    pub fn with_ignored_dir(mut self, dir: impl Into<String>) -> Self {
        self.ignored_dirs.insert(dir.into());
        self
    }

    fn is_eligible_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.include_extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

/// A directory or document in the scanned tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: PathBuf,
    pub name: String,
    pub is_directory: bool,
    pub children: Vec<FileNode>,
}

impl FileNode {
    fn new(path: PathBuf, is_directory: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            path,
            name,
            is_directory,
            children: Vec::new(),
        }
    }

    fn collect_documents(&self, out: &mut Vec<PathBuf>) {
        for child in &self.children {
            if child.is_directory {
                child.collect_documents(out);
            } else {
                out.push(child.path.clone());
            }
        }
    }
}

/// Result of a directory scan
#[derive(Debug, Clone)]
pub struct FileTree {
    /// The scanned root directory
    pub root: FileNode,

    /// Number of eligible documents found
    pub document_count: usize,
}

impl FileTree {
    /// All documents in display order (directories first, then by name)
    pub fn documents(&self) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(self.document_count);
        self.root.collect_documents(&mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}

/// Scan a directory and return the tree of eligible documents
pub fn scan_directory(root: impl AsRef<Path>, config: &ScanConfig) -> FileResult<FileTree> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let start = std::time::Instant::now();
    let mut document_count = 0;

    // Open directories from the root down to the current entry's parent
    let mut stack = vec![FileNode::new(root.to_path_buf(), true)];

    let walker = WalkDir::new(root)
        .max_depth(config.max_depth)
        .follow_links(false)
        .sort_by(|a, b| {
            let a_is_dir = a.file_type().is_dir();
            let b_is_dir = b.file_type().is_dir();
            match (a_is_dir, b_is_dir) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.file_name().cmp(b.file_name()),
            }
        });

    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_include(e, config))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        close_directories(&mut stack, entry.depth());

        if entry.file_type().is_dir() {
            stack.push(FileNode::new(entry.path().to_path_buf(), true));
        } else if config.is_eligible_file(entry.path()) {
            document_count += 1;
            if let Some(parent) = stack.last_mut() {
                parent
                    .children
                    .push(FileNode::new(entry.path().to_path_buf(), false));
            }
        }
    }

    close_directories(&mut stack, 1);
    let root = stack
        .pop()
        .unwrap_or_else(|| FileNode::new(root.to_path_buf(), true));

    log::debug!(
        "Scanned {} in {} ms: {} documents",
        root.path.display(),
        start.elapsed().as_millis(),
        document_count
    );

    Ok(FileTree {
        root,
        document_count,
    })
}

/// Pop finished directories until the stack holds `depth` levels,
/// attaching each one to its parent only if it contains documents.
fn close_directories(stack: &mut Vec<FileNode>, depth: usize) {
    while stack.len() > depth.max(1) {
        let Some(node) = stack.pop() else { break };
        if node.children.is_empty() {
            continue;
        }
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

/// Check if an entry should be visited during traversal
fn should_include(entry: &DirEntry, config: &ScanConfig) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    if !config.show_hidden && name.starts_with('.') {
        return false;
    }
    if entry.file_type().is_dir() && config.ignored_dirs.contains(name) {
        return false;
    }
    true
}
