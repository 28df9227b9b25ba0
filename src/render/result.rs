//! Rendering result with metadata and statistics.

use serde::{Deserialize, Serialize};

use crate::model::Metadata;

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content
    pub content: String,

    /// Document metadata (copied from the source document)
    pub metadata: Metadata,

    /// Rendering statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Counts of what was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages processed
    pub page_count: usize,

    /// Headings written
    pub heading_count: usize,

    /// Paragraphs written
    pub paragraph_count: usize,

    /// Tables written
    pub table_count: usize,

    /// Captions written
    pub caption_count: usize,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: usize,

    /// Character count (excluding whitespace)
    pub char_count: usize,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count();
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count();
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.table_count += other.table_count;
        self.caption_count += other.caption_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
