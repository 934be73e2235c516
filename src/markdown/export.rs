//! Export of rendered documents to standalone HTML files

use crate::error::FileResult;
use crate::file_handler::write_file_atomic_sync;
use std::path::{Path, PathBuf};

/// Write a rendered HTML document to disk
pub fn export_html(html: &str, output_path: &Path) -> FileResult<()> {
    write_file_atomic_sync(output_path, html)?;
    log::info!("Exported {}", output_path.display());
    Ok(())
}

/// Generate suggested output path from input path
pub fn suggest_output_path(input_path: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut output = input_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    output.push(format!("{}.html", stem));
    output
}
