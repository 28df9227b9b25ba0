//! Document-level types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Block, BlockKind, FontRole};

/// An assembled document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Blocks in reading order across all pages
    pub blocks: Vec<Block>,

    /// One report per processed page, in page order
    pub pages: Vec<PageReport>,

    /// Role assigned to every font signature
    pub roles: Vec<RoleAssignment>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document produced no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks that are tables.
    pub fn tables(&self) -> impl Iterator<Item = &super::Table> {
        self.blocks.iter().filter_map(|b| match &b.kind {
            BlockKind::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Pages that failed to load or were cancelled.
    pub fn incomplete_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.pages
            .iter()
            .filter(|p| !matches!(p.status, PageStatus::Analyzed | PageStatus::Empty))
    }

    /// Whether every page was analyzed.
    pub fn is_complete(&self) -> bool {
        self.incomplete_pages().next().is_none()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Outcome of processing one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PageStatus {
    /// Page was analyzed and contributed its content
    Analyzed,
    /// Page loaded but held no usable geometry
    Empty,
    /// Geometry could not be loaded; an empty page was substituted
    Failed(String),
    /// Processing was cancelled before the page finished
    Cancelled,
}

/// Per-page processing summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    /// Zero-based page index
    pub page_index: usize,
    /// Processing outcome
    #[serde(flatten)]
    pub status: PageStatus,
    /// Runs supplied for the page
    pub run_count: usize,
    /// Runs excluded for being empty or zero-area
    pub dropped_runs: usize,
    /// Vector primitives supplied for the page
    pub primitive_count: usize,
    /// Column segments found by the clusterer
    pub column_count: usize,
    /// Table regions accepted on the page
    pub table_count: usize,
    /// Blocks emitted for the page before cross-page merging
    pub block_count: usize,
    /// First-pass blocks, kept when requested for inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_pass: Option<Vec<Block>>,
}

impl PageReport {
    /// A report with no content for the given status.
    pub fn with_status(page_index: usize, status: PageStatus) -> Self {
        Self {
            page_index,
            status,
            run_count: 0,
            dropped_runs: 0,
            primitive_count: 0,
            column_count: 0,
            table_count: 0,
            block_count: 0,
            first_pass: None,
        }
    }
}

/// A font signature together with its assigned role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Font identifier
    pub font_id: String,
    /// Font size in points (rounded to half points)
    pub size: f32,
    /// Bold flag
    pub bold: bool,
    /// Italic flag
    pub italic: bool,
    /// Non-whitespace characters set in this signature
    pub chars: usize,
    /// Assigned role
    pub role: FontRole,
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Total number of pages in the source
    pub page_count: usize,
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("subject", &self.subject),
            ("keywords", &self.keywords),
            ("creator", &self.creator),
            ("producer", &self.producer),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(format!("{}: \"{}\"", key, escape_yaml(value)));
            }
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }

        lines.push(format!("pages: {}", self.page_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
