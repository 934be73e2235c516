//! File handler module for MDView
//!
//! Handles all file system operations including:
//! - Reading and writing files with size limits
//! - Atomic save operations for data safety
//! - Storage backends used by the document session
//! - Directory scanning for the document browser

pub mod io;
pub mod scanner;
pub mod storage;

pub use io::*;
pub use scanner::*;
pub use storage::*;
