//! Preview styling
//!
//! Two fixed palettes and the HTML document shell. Every style value is a
//! pure function of the [`PresentationSettings`], so equal settings always
//! produce byte-identical documents.

use crate::state::{PresentationSettings, ThemeMode};

/// Font stack for body text
pub const FONT_FAMILY: &str = r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif, "Apple Color Emoji", "Segoe UI Emoji""#;

/// Font stack for inline and block code
pub const CODE_FONT_FAMILY: &str =
    r#""SFMono-Regular", Consolas, "Liberation Mono", Menlo, Courier, monospace"#;

/// Colours used by the preview stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub quote: &'static str,
    pub code_background: &'static str,
    pub link: &'static str,
    pub heading_rule: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        background: "#ffffff",
        text: "#24292e",
        border: "#dfe2e5",
        quote: "#6a737d",
        code_background: "#f6f8fa",
        link: "#0366d6",
        heading_rule: "#eaecef",
    };

    pub const DARK: Palette = Palette {
        background: "#0d1117",
        text: "#c9d1d9",
        border: "#30363d",
        quote: "#8b949e",
        code_background: "#161b22",
        link: "#58a6ff",
        heading_rule: "#21262d",
    };

    pub fn for_theme(theme: ThemeMode) -> &'static Palette {
        match theme {
            ThemeMode::Light => &Palette::LIGHT,
            ThemeMode::Dark => &Palette::DARK,
        }
    }
}

/// Build the stylesheet for the given settings
pub fn stylesheet(settings: &PresentationSettings) -> String {
    let p = Palette::for_theme(settings.theme);

    format!(
        r#"body {{
    font-family: {font};
    font-size: {size}pt;
    line-height: 1.6;
    color: {text};
    background-color: {bg};
    word-wrap: break-word;
}}
.container {{ max-width: 800px; margin: 0 auto; padding: 20px; }}
h1, h2, h3, h4, h5, h6 {{ margin-top: 24px; margin-bottom: 16px; font-weight: 600; line-height: 1.25; }}
h1 {{ font-size: 2em; border-bottom: 1px solid {rule}; padding-bottom: .3em; }}
h2 {{ font-size: 1.5em; border-bottom: 1px solid {rule}; padding-bottom: .3em; }}
h3 {{ font-size: 1.25em; }}
a {{ color: {link}; text-decoration: none; }}
a:hover {{ text-decoration: underline; }}
pre {{ background-color: {code_bg}; padding: 16px; overflow: auto; font-size: 85%; line-height: 1.45; border-radius: 6px; }}
code {{ font-family: {code_font}; font-size: 85%; }}
pre > code {{ font-size: 100%; }}
table {{ border-collapse: collapse; width: 100%; display: block; overflow: auto; }}
th, td {{ border: 1px solid {border}; padding: 6px 13px; }}
th {{ font-weight: 600; background-color: {code_bg}; }}
img {{ max-width: 100%; height: auto; background-color: #ffffff; }}
blockquote {{ color: {quote}; border-left: .25em solid {border}; padding: 0 1em; margin-left: 0; }}
.diagram-error {{ color: #cb2431; border: 1px solid #cb2431; white-space: pre-wrap; }}"#,
        font = FONT_FAMILY,
        size = settings.font_size_pt,
        text = p.text,
        bg = p.background,
        rule = p.heading_rule,
        link = p.link,
        code_bg = p.code_background,
        code_font = CODE_FONT_FAMILY,
        border = p.border,
        quote = p.quote,
    )
}

/// Wrap an HTML fragment in a complete, styled document
pub fn wrap_document(body_html: &str, settings: &PresentationSettings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="generator" content="MDView">
<style>
{}
</style>
</head>
<body>
<div class="container">
{}
</div>
</body>
</html>
"#,
        stylesheet(settings),
        body_html
    )
}
