//! Block-level output types.

use serde::{Deserialize, Serialize};

use super::{BBox, RunId, Table};

/// Semantic role assigned to a font signature.
///
/// Variants are declared from most to least prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "role", content = "level", rename_all = "snake_case")]
pub enum FontRole {
    /// Document title
    Title,
    /// Section heading, 1 = most prominent
    Heading(u8),
    /// Running body text
    Body,
    /// Emphasised text at body size
    Emphasis,
    /// Captions, footnotes and other small print
    Caption,
}

impl FontRole {
    /// Whether the role produces a heading block.
    pub fn is_heading(&self) -> bool {
        matches!(self, FontRole::Title | FontRole::Heading(_))
    }

    /// Markdown heading depth: the title is `#`, `Heading(n)` is `n + 1`.
    pub fn markdown_level(&self) -> Option<u8> {
        match self {
            FontRole::Title => Some(1),
            FontRole::Heading(n) => Some(n.saturating_add(1).min(6)),
            _ => None,
        }
    }

    /// Roles that flow into paragraphs.
    pub fn is_running_text(&self) -> bool {
        matches!(self, FontRole::Body | FontRole::Emphasis)
    }
}

/// A piece of paragraph text with its inline emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineText {
    /// The text content
    pub text: String,
    /// Render with emphasis
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub emphasis: bool,
}

impl InlineText {
    /// Plain text span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    /// Emphasised text span.
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }
}

/// Content of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// A heading with its Markdown level
    Heading {
        /// Heading level (1-6)
        level: u8,
        /// Heading text
        text: String,
    },
    /// A paragraph of running text
    Paragraph {
        /// Inline spans
        spans: Vec<InlineText>,
    },
    /// A reconstructed table
    Table(Table),
    /// A caption or other small print
    Caption {
        /// Caption text
        text: String,
    },
}

/// A unit of the assembled document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block content
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Page the block starts on
    pub page_index: usize,
    /// Bounding box on that page
    pub bbox: BBox,
    /// Dominant font role of the block's lines
    pub role: FontRole,
    /// Median line height on the source page
    pub line_height: f32,
    /// Run ids per line, page-local to `page_index`
    pub lines: Vec<Vec<RunId>>,
    /// Leading paragraphs of later pages merged into this block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continued: Vec<Continuation>,
}

/// Lines of a paragraph carried over from a later page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    /// Page the lines sit on
    pub page_index: usize,
    /// Run ids per line, page-local to `page_index`
    pub lines: Vec<Vec<RunId>>,
}

impl Block {
    /// Plain text of the block.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::Heading { text, .. } | BlockKind::Caption { text } => text.clone(),
            BlockKind::Paragraph { spans } => spans
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(""),
            BlockKind::Table(table) => table.plain_text(),
        }
    }

    /// Check if the block carries no text.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            BlockKind::Table(table) => table.is_empty(),
            _ => self.plain_text().trim().is_empty(),
        }
    }

    /// Heading level, if the block is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading { level, .. } => Some(level),
            _ => None,
        }
    }

    /// Whether the block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph { .. })
    }

    /// All run ids on the starting page, in reading order.
    pub fn run_ids(&self) -> impl Iterator<Item = RunId> + '_ {
        self.lines.iter().flatten().copied()
    }

    /// Every `(page_index, run id)` of the block, continuations included.
    pub fn page_runs(&self) -> impl Iterator<Item = (usize, RunId)> + '_ {
        let own = self.run_ids().map(move |id| (self.page_index, id));
        let carried = self
            .continued
            .iter()
            .flat_map(|c| c.lines.iter().flatten().map(move |&id| (c.page_index, id)));
        own.chain(carried)
    }

    /// Last page the block extends onto.
    pub fn last_page(&self) -> usize {
        self.continued.last().map_or(self.page_index, |c| c.page_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering_follows_prominence() {
        assert!(FontRole::Title < FontRole::Heading(1));
        assert!(FontRole::Heading(1) < FontRole::Heading(2));
        assert!(FontRole::Heading(6) < FontRole::Body);
        assert!(FontRole::Body < FontRole::Caption);
    }

    #[test]
    fn test_markdown_level() {
        assert_eq!(FontRole::Title.markdown_level(), Some(1));
        assert_eq!(FontRole::Heading(1).markdown_level(), Some(2));
        assert_eq!(FontRole::Heading(9).markdown_level(), Some(6));
        assert_eq!(FontRole::Body.markdown_level(), None);
    }

    #[test]
    fn test_paragraph_plain_text() {
        let block = Block {
            kind: BlockKind::Paragraph {
                spans: vec![InlineText::plain("Hello "), InlineText::emphasized("world")],
            },
            page_index: 0,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            role: FontRole::Body,
            line_height: 10.0,
            lines: vec![vec![0, 1]],
            continued: Vec::new(),
        };
        assert_eq!(block.plain_text(), "Hello world");
        assert!(block.is_paragraph());
        assert_eq!(block.run_ids().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(block.last_page(), 0);
    }

    #[test]
    fn test_page_runs_include_continuations() {
        let block = Block {
            kind: BlockKind::Paragraph {
                spans: vec![InlineText::plain("split paragraph")],
            },
            page_index: 3,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            role: FontRole::Body,
            line_height: 10.0,
            lines: vec![vec![7]],
            continued: vec![Continuation {
                page_index: 4,
                lines: vec![vec![0, 1]],
            }],
        };
        assert_eq!(block.page_runs().collect::<Vec<_>>(), vec![(3, 7), (4, 0), (4, 1)]);
        assert_eq!(block.last_page(), 4);
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let block = Block {
            kind: BlockKind::Heading {
                level: 2,
                text: "Intro".into(),
            },
            page_index: 1,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            role: FontRole::Heading(1),
            line_height: 14.0,
            lines: vec![vec![3]],
            continued: Vec::new(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"heading\""));
        assert!(json.contains("\"level\":2"));
    }
}
