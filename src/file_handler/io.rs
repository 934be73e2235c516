//! File I/O operations with size limits and atomic writes
//!
//! Provides safe file reading and writing with:
//! - UTF-8 decoding (BOM stripped, invalid bytes replaced)
//! - Atomic writes to prevent data loss
//! - File size limits

use crate::error::{FileError, FileResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Map an I/O error on `path` to the matching file error
fn read_error(path: &Path, source: std::io::Error) -> FileError {
    match source.kind() {
        ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => FileError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => FileError::ReadError {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn check_size(path: &Path, size: u64, max_size: u64) -> FileResult<()> {
    if size > max_size {
        return Err(FileError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }
    Ok(())
}

/// Decode file bytes as UTF-8, dropping a BOM and replacing invalid sequences
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Read a text file synchronously
pub fn read_file_sync(path: impl AsRef<Path>, max_size: u64) -> FileResult<String> {
    let path = path.as_ref();

    let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
    if !metadata.is_file() {
        return Err(FileError::ReadError {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::Other, "not a regular file"),
        });
    }
    check_size(path, metadata.len(), max_size)?;

    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
    Ok(decode_text(&bytes))
}

/// Read a text file without blocking the async runtime
pub async fn read_file(path: impl AsRef<Path>, max_size: u64) -> FileResult<String> {
    let path = path.as_ref();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| read_error(path, e))?;
    check_size(path, metadata.len(), max_size)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
    Ok(decode_text(&bytes))
}

/// Write content to a file using atomic write
///
/// The content goes to a temporary sibling file which is then renamed over
/// the target, so the file is either fully written or unchanged.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let temp_path = temp_sibling(path);

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

/// Temporary file name in the same directory as `path`
fn temp_sibling(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    parent.join(format!(".{}.{}.tmp", filename, timestamp))
}
