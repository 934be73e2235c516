//! Render pipeline: Markdown source to a finished, styled HTML document
//!
//! Rendering happens in three ordered stages:
//! 1. Diagram blocks are rendered and replaced by placeholders
//! 2. The remaining Markdown is converted to an HTML fragment
//! 3. Placeholders are swapped for images (or error markers) and the
//!    fragment is wrapped in the themed document shell
//!
//! The pipeline holds no mutable state; equal inputs give equal output.

use super::converter::{CommonMarkConverter, MarkupConverter};
use super::diagram::{data_uri, DiagramFence, DiagramRenderer, MermaidCli};
use super::theme::wrap_document;
use crate::config::RenderConfig;
use crate::error::{ConfigError, ConfigResult, PipelineError};
use crate::state::PresentationSettings;
use crate::utils::text::escape_html;
use std::sync::Arc;

/// Orchestrates diagram substitution, conversion and styling
pub struct RenderPipeline {
    diagrams: Box<dyn DiagramRenderer + Send + Sync>,
    converter: Box<dyn MarkupConverter + Send + Sync>,
    fence: DiagramFence,
}

impl RenderPipeline {
    pub fn new(
        diagrams: impl DiagramRenderer + Send + Sync + 'static,
        converter: impl MarkupConverter + Send + Sync + 'static,
        fence: DiagramFence,
    ) -> Self {
        Self {
            diagrams: Box::new(diagrams),
            converter: Box::new(converter),
            fence,
        }
    }

    /// Pipeline with the Mermaid CLI and the CommonMark converter
    pub fn from_config(config: &RenderConfig) -> ConfigResult<Self> {
        let fence =
            DiagramFence::new(&config.diagram_languages).map_err(|e| ConfigError::InvalidValue {
                key: "render.diagram_languages".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(
            MermaidCli::new(config.mermaid_command.clone()),
            CommonMarkConverter::new(),
            fence,
        ))
    }

    /// Render Markdown source into a complete HTML document
    pub fn render(&self, raw_text: &str, settings: &PresentationSettings) -> String {
        let prefix = placeholder_prefix(raw_text);
        let (text, substitutions) = self.substitute_diagrams(raw_text, &prefix);

        let mut fragment = self.converter.convert(&text);
        for (index, html) in substitutions.iter().enumerate() {
            fragment = fragment.replace(&placeholder(&prefix, index), html);
        }

        wrap_document(&fragment, settings)
    }

    /// Synthetic document shown in place of a document that could not be rendered
    pub fn render_error(&self, error: &PipelineError, settings: &PresentationSettings) -> String {
        let body = format!(
            "<h1>Error</h1>\n<p>Failed to render file: {}</p>",
            escape_html(&error.to_string())
        );
        wrap_document(&body, settings)
    }

    /// Render a source that may have failed to load
    pub fn render_source(
        &self,
        source: Result<&str, PipelineError>,
        settings: &PresentationSettings,
    ) -> String {
        match source {
            Ok(text) => self.render(text, settings),
            Err(err) => {
                log::warn!("Rendering error document: {}", err);
                self.render_error(&err, settings)
            }
        }
    }

    /// Stage 1: replace each diagram block with a placeholder.
    ///
    /// Returns the rewritten text and, per placeholder, the HTML that
    /// replaces it after conversion. A failing block only affects itself.
    fn substitute_diagrams(&self, raw_text: &str, prefix: &str) -> (String, Vec<String>) {
        let blocks = self.fence.find_blocks(raw_text);
        if blocks.is_empty() {
            return (raw_text.to_string(), Vec::new());
        }

        let mut text = String::with_capacity(raw_text.len());
        let mut substitutions = Vec::with_capacity(blocks.len());
        let mut last = 0;

        for block in &blocks {
            text.push_str(&raw_text[last..block.range.start]);

            let html = match self.diagrams.render(block.source) {
                Ok(bytes) => format!(
                    "<p class=\"diagram\"><img src=\"{}\" alt=\"{} diagram\"></p>",
                    data_uri(&bytes),
                    escape_html(block.language)
                ),
                Err(err) => {
                    log::warn!("{} diagram failed to render: {}", block.language, err);
                    format!(
                        "<pre class=\"diagram-error\">Diagram rendering failed: {}</pre>",
                        escape_html(&err.to_string())
                    )
                }
            };

            // Blank lines keep the placeholder a standalone HTML block
            text.push_str("\n\n");
            text.push_str(&placeholder(prefix, substitutions.len()));
            text.push_str("\n\n");
            substitutions.push(html);

            last = block.range.end;
        }
        text.push_str(&raw_text[last..]);

        (text, substitutions)
    }
}

/// Placeholder prefix that does not occur anywhere in the source, so
/// text the author wrote is never mistaken for a substitution
fn placeholder_prefix(raw_text: &str) -> String {
    let mut prefix = "mdview-diagram-".to_string();
    let mut salt = 0u32;
    while raw_text.contains(&prefix) {
        salt += 1;
        prefix = format!("mdview-diagram-{}-", salt);
    }
    prefix
}

fn placeholder(prefix: &str, index: usize) -> String {
    format!("<!-- {}{} -->", prefix, index)
}

/// Render on a blocking worker thread and hand the document back.
///
/// Lets an async caller stay responsive while diagram tools run.
pub async fn render_offloaded(
    pipeline: Arc<RenderPipeline>,
    raw_text: String,
    settings: PresentationSettings,
) -> Result<String, PipelineError> {
    tokio::task::spawn_blocking(move || pipeline.render(&raw_text, &settings))
        .await
        .map_err(|e| PipelineError::Worker(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DiagramError, DiagramResult, FileError};
    use crate::state::ThemeMode;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    fn pipeline_with(
        renderer: impl Fn(&str) -> DiagramResult<Vec<u8>> + Send + Sync + 'static,
    ) -> RenderPipeline {
        RenderPipeline::new(
            renderer,
            CommonMarkConverter::new(),
            DiagramFence::new(&["mermaid"]).unwrap(),
        )
    }

    fn failing_pipeline() -> RenderPipeline {
        pipeline_with(|_: &str| -> DiagramResult<Vec<u8>> {
            Err(DiagramError::Failed("syntax error near -->".to_string()))
        })
    }

    #[test]
    fn test_plain_markdown() {
        let html = failing_pipeline().render("# Title\n\nBody *text*", &PresentationSettings::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_failed_diagram_keeps_surrounding_text() {
        let source = "Before the diagram.\n\n```mermaid\ngraph TD\n  A-->B\n```\n\nAfter the diagram.\n";
        let html = failing_pipeline().render(source, &PresentationSettings::default());

        assert!(html.contains("<p>Before the diagram.</p>"));
        assert!(html.contains("<p>After the diagram.</p>"));
        assert!(html.contains(
            "<pre class=\"diagram-error\">Diagram rendering failed: syntax error near --&gt;</pre>"
        ));
        assert!(!html.contains("mdview-diagram-"));
    }

    #[test]
    fn test_literal_placeholder_text_is_left_alone() {
        let source = "<!-- mdview-diagram-0 -->\n\n```mermaid\ngraph TD\n```\n";
        let html = failing_pipeline().render(source, &PresentationSettings::default());

        assert_eq!(html.matches("Diagram rendering failed").count(), 1);
        assert!(html.contains("<!-- mdview-diagram-0 -->"));
        assert!(!html.contains("mdview-diagram-1-"));
    }

    #[test]
    fn test_placeholder_prefix_avoids_source_text() {
        assert_eq!(placeholder_prefix("plain"), "mdview-diagram-");
        assert_eq!(placeholder_prefix("mdview-diagram-"), "mdview-diagram-1-");
        assert_eq!(
            placeholder_prefix("mdview-diagram- mdview-diagram-1-"),
            "mdview-diagram-2-"
        );
    }

    #[test]
    fn test_successful_diagram_becomes_data_uri() {
        let pipeline = pipeline_with(|_: &str| -> DiagramResult<Vec<u8>> { Ok(PNG.to_vec()) });
        let html = pipeline.render("```mermaid\ngraph TD\n```\n", &PresentationSettings::default());

        assert!(html.contains("<img src=\"data:image/png;base64,"));
        assert!(html.contains("alt=\"mermaid diagram\""));
        assert!(!html.contains("graph TD"));
    }

    #[test]
    fn test_each_block_rendered_once_in_order() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);
        let pipeline = pipeline_with(move |source: &str| -> DiagramResult<Vec<u8>> {
            seen.lock().unwrap().push(source.trim().to_string());
            if source.contains("bad") {
                Err(DiagramError::Failed("bad diagram".to_string()))
            } else {
                Ok(PNG.to_vec())
            }
        });

        let source = "```mermaid\none\n```\n\n```mermaid\nbad\n```\n\n```mermaid\nthree\n```\n";
        let html = pipeline.render(source, &PresentationSettings::default());

        assert_eq!(*calls.lock().unwrap(), vec!["one", "bad", "three"]);
        assert_eq!(html.matches("<img src=\"data:image/png").count(), 2);
        assert_eq!(html.matches("diagram-error\">").count(), 1);

        let first_img = html.find("<img").unwrap();
        let error = html.find("Diagram rendering failed").unwrap();
        let last_img = html.rfind("<img").unwrap();
        assert!(first_img < error && error < last_img);
    }

    #[test]
    fn test_no_diagrams_means_no_renderer_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pipeline = pipeline_with(move |_: &str| -> DiagramResult<Vec<u8>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(PNG.to_vec())
        });

        pipeline.render("```rust\nfn main() {}\n```\n", &PresentationSettings::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_settings_change_output() {
        let pipeline = failing_pipeline();
        let light = PresentationSettings::new(ThemeMode::Light, 12);
        let dark = light.with_theme(ThemeMode::Dark);

        let a = pipeline.render("text", &light);
        assert_eq!(a, pipeline.render("text", &light));
        assert_ne!(a, pipeline.render("text", &dark));
        assert_ne!(a, pipeline.render("text", &light.with_font_size(14)));
    }

    #[test]
    fn test_render_source_error_document() {
        let err = PipelineError::Source(FileError::NotFound(PathBuf::from("/gone.md")));
        let html = failing_pipeline().render_source(Err(err), &PresentationSettings::default());

        assert!(html.contains("<h1>Error</h1>"));
        assert!(html.contains("Failed to render file: File not found: /gone.md"));
    }

    #[test]
    fn test_from_config() {
        assert!(RenderPipeline::from_config(&RenderConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_render_offloaded_matches_direct_render() {
        let pipeline = Arc::new(failing_pipeline());
        let settings = PresentationSettings::default();

        let direct = pipeline.render("# Hi", &settings);
        let offloaded = render_offloaded(Arc::clone(&pipeline), "# Hi".to_string(), settings)
            .await
            .unwrap();
        assert_eq!(direct, offloaded);
    }
}
