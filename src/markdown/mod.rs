//! Markdown module for MDView
//!
//! Turns Markdown source into finished preview documents:
//! - Diagram block detection and rendering
//! - Markdown to HTML conversion
//! - Themed document shell
//! - Export of rendered documents

pub mod converter;
pub mod diagram;
pub mod export;
pub mod pipeline;
pub mod theme;

pub use converter::{CommonMarkConverter, MarkupConverter};
pub use diagram::{data_uri, DiagramBlock, DiagramFence, DiagramRenderer, MermaidCli};
pub use export::{export_html, suggest_output_path};
pub use pipeline::{render_offloaded, RenderPipeline};
pub use theme::{wrap_document, Palette};
