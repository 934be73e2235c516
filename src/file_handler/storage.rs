//! Document storage backends
//!
//! The session only reads and writes whole documents through [`Storage`];
//! paths are treated as opaque identities.

use super::io::{read_file_sync, write_file_atomic_sync};
use crate::config::MAX_FILE_SIZE;
use crate::error::{FileError, FileResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Reads and writes document text
pub trait Storage {
    fn read(&self, path: &Path) -> FileResult<String>;
    fn write(&self, path: &Path, text: &str) -> FileResult<()>;
}

impl<T: Storage + ?Sized> Storage for Rc<T> {
    fn read(&self, path: &Path) -> FileResult<String> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, text: &str) -> FileResult<()> {
        (**self).write(path, text)
    }
}

/// Filesystem storage with atomic saves
#[derive(Debug, Clone)]
pub struct FsStorage {
    max_file_size: u64,
}

impl FsStorage {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> FileResult<String> {
        read_file_sync(path, self.max_file_size)
    }

    fn write(&self, path: &Path, text: &str) -> FileResult<()> {
        write_file_atomic_sync(path, text)?;
        log::info!("Saved {} ({} bytes)", path.display(), text.len());
        Ok(())
    }
}

/// In-memory storage, used for tests and for embedding without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<HashMap<PathBuf, String>>,
    reads: RefCell<HashMap<PathBuf, usize>>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), text.into());
    }

    /// Current stored text of a document
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Number of reads performed for a document
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.reads.borrow().get(path.as_ref()).copied().unwrap_or(0)
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> FileResult<String> {
        *self.reads.borrow_mut().entry(path.to_path_buf()).or_insert(0) += 1;
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, text: &str) -> FileResult<()> {
        if self.fail_writes.get() {
            return Err(FileError::WriteError {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}
