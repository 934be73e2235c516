//! Diagram blocks
//!
//! Finds fenced diagram blocks in Markdown source and rasterizes them
//! through a [`DiagramRenderer`]. The default renderer shells out to the
//! Mermaid CLI; any temporary files stay inside the renderer.

use crate::error::{DiagramError, DiagramResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use regex::Regex;
use std::io::ErrorKind;
use std::ops::Range;
use std::process::{Command, Stdio};

/// Converts diagram source text into image bytes
pub trait DiagramRenderer {
    fn render(&self, source: &str) -> DiagramResult<Vec<u8>>;
}

impl<F> DiagramRenderer for F
where
    F: Fn(&str) -> DiagramResult<Vec<u8>>,
{
    fn render(&self, source: &str) -> DiagramResult<Vec<u8>> {
        self(source)
    }
}

/// A fenced diagram block located in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock<'a> {
    /// Fence language, e.g. `mermaid`
    pub language: &'a str,
    /// Text between the fences
    pub source: &'a str,
    /// Byte range of the whole block including fences
    pub range: Range<usize>,
}

/// Recognizes fenced blocks for a set of diagram languages
#[derive(Debug, Clone)]
pub struct DiagramFence {
    pattern: Regex,
}

impl DiagramFence {
    /// Build a matcher for fences opened with one of `languages`
    pub fn new<S: AsRef<str>>(languages: &[S]) -> Result<Self, regex::Error> {
        let alternatives = languages
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let alternatives = if alternatives.is_empty() {
            // Matches nothing
            r"[^\s\S]".to_string()
        } else {
            alternatives
        };

        // Opening fence line, lazily matched body, closing fence line
        let pattern = Regex::new(&format!(
            r"(?ms)^[ \t]{{0,3}}```[ \t]*({})[ \t]*\r?\n(.*?)^[ \t]{{0,3}}```[ \t]*\r?$",
            alternatives
        ))?;
        Ok(Self { pattern })
    }

    /// All diagram blocks in source order
    pub fn find_blocks<'a>(&self, text: &'a str) -> Vec<DiagramBlock<'a>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(DiagramBlock {
                    language: caps.get(1)?.as_str(),
                    source: caps.get(2).map_or("", |m| m.as_str()),
                    range: whole.range(),
                })
            })
            .collect()
    }
}

/// Renders Mermaid diagrams with the `mmdc` command line tool.
///
/// No timeout is applied; a hanging tool blocks the calling render.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    command: String,
}

impl MermaidCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new("mmdc")
    }
}

impl DiagramRenderer for MermaidCli {
    fn render(&self, source: &str) -> DiagramResult<Vec<u8>> {
        if source.trim().is_empty() {
            return Err(DiagramError::EmptySource);
        }

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("diagram.mmd");
        let output = dir.path().join("diagram.png");
        std::fs::write(&input, source)?;

        log::debug!(
            "Running {} on {} bytes of diagram source",
            self.command,
            source.len()
        );

        let result = Command::new(&self.command)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            // Previews draw images on white in both themes
            .arg("-b")
            .arg("white")
            .stdin(Stdio::null())
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DiagramError::ToolNotFound {
                    command: self.command.clone(),
                })
            }
            Err(e) => {
                return Err(DiagramError::Spawn {
                    command: self.command.clone(),
                    source: e,
                })
            }
        };

        if !out.status.success() {
            return Err(DiagramError::ToolFailed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        let bytes = std::fs::read(&output)?;
        if bytes.is_empty() {
            return Err(DiagramError::EmptyOutput);
        }
        Ok(bytes)
    }
}

/// MIME type of image bytes, detected from magic bytes (PNG if unknown)
pub fn image_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return "image/webp";
    }
    let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
    if head.contains("<svg") || head.trim_start().starts_with("<?xml") {
        return "image/svg+xml";
    }
    "image/png"
}

/// Embed image bytes as a `data:` URI
pub fn data_uri(data: &[u8]) -> String {
    format!("data:{};base64,{}", image_mime_type(data), BASE64.encode(data))
}
