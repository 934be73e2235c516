//! Markdown to HTML conversion

use pulldown_cmark::{html, Options, Parser};

/// Converts markup text into an HTML fragment
pub trait MarkupConverter {
    fn convert(&self, text: &str) -> String;
}

/// CommonMark converter with the GitHub-style extensions enabled
/// (tables, strikethrough, task lists, footnotes)
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkConverter {
    options: Options,
}

impl CommonMarkConverter {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        Self { options }
    }
}

impl Default for CommonMarkConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupConverter for CommonMarkConverter {
    fn convert(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.options);
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
