//! Rendering options and configuration.

use serde::{Deserialize, Serialize};

use super::{CleanupOptions, CleanupPreset};

/// Options for rendering an assembled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// How headings are written
    pub heading_style: HeadingStyle,

    /// Maximum heading level (1-6); deeper headings are clamped
    pub max_heading_level: u8,

    /// Width for wrapping paragraphs (0 = no wrap)
    pub line_width: usize,

    /// Write a `---` rule where a new page starts
    pub page_separators: bool,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the heading style.
    pub fn with_heading_style(mut self, style: HeadingStyle) -> Self {
        self.heading_style = style;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set line width for wrapping.
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    /// Enable or disable page separators.
    pub fn with_page_separators(mut self, separate: bool) -> Self {
        self.page_separators = separate;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            heading_style: HeadingStyle::Atx,
            max_heading_level: 6,
            line_width: 0,
            page_separators: false,
            escape_special_chars: true,
            cleanup: None,
        }
    }
}

/// Markdown heading syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// `#` prefixes for every level
    #[default]
    Atx,
    /// `===` / `---` underlines for levels 1 and 2, `#` prefixes below
    Setext,
}
