//! Presentation settings shared by every rendered document

use serde::{Deserialize, Serialize};

/// Smallest font size the preview may be set to
pub const MIN_FONT_SIZE_PT: u32 = 6;

/// Preview colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    /// Light background, dark text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl ThemeMode {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }
}

/// Styling inputs of the render pipeline.
///
/// An immutable value: the session replaces it wholesale when the user
/// changes the theme or font size, and every render receives it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresentationSettings {
    pub theme: ThemeMode,
    pub font_size_pt: u32,
}

impl PresentationSettings {
    /// Create settings, clamping the font size to the minimum
    pub fn new(theme: ThemeMode, font_size_pt: u32) -> Self {
        Self {
            theme,
            font_size_pt: font_size_pt.max(MIN_FONT_SIZE_PT),
        }
    }

    pub fn with_theme(self, theme: ThemeMode) -> Self {
        Self { theme, ..self }
    }

    pub fn with_font_size(self, font_size_pt: u32) -> Self {
        Self::new(self.theme, font_size_pt)
    }
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self::new(ThemeMode::Light, crate::config::DEFAULT_FONT_SIZE_PT)
    }
}
