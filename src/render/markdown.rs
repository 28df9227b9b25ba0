//! Markdown rendering of assembled documents.

use crate::error::Result;
use crate::model::{Block, BlockKind, Document, InlineText, Table};

use super::{CleanupPipeline, ExtractionStats, HeadingStyle, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    MarkdownRenderer::new(options.clone()).render_with_stats(doc)
}

/// Markdown renderer.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        let content = self.render_internal(doc)?;
        self.stats.page_count = doc.page_count();
        self.stats.count_text(&content);
        Ok(RenderResult::new(content, doc.metadata.clone(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        let mut last_page: Option<usize> = None;
        for block in &doc.blocks {
            if self.options.page_separators && last_page.is_some_and(|p| block.page_index > p) {
                output.push_str("---\n\n");
            }
            self.render_block(&mut output, block);
            last_page = Some(block.last_page());
        }

        if let Some(cleanup) = &self.options.cleanup {
            output = CleanupPipeline::new(cleanup.clone())?.process(&output);
        }

        Ok(output.trim().to_string())
    }

    fn render_block(&mut self, output: &mut String, block: &Block) {
        if block.is_empty() {
            return;
        }
        match &block.kind {
            BlockKind::Heading { level, text } => {
                self.stats.heading_count += 1;
                self.render_heading(output, *level, text);
            }
            BlockKind::Paragraph { spans } => {
                self.stats.paragraph_count += 1;
                let mut text = self.render_spans(spans);
                if self.options.escape_special_chars {
                    text = escape_line_start(&text);
                }
                output.push_str(&wrap(&text, self.options.line_width));
                output.push_str("\n\n");
            }
            BlockKind::Table(table) => {
                self.stats.table_count += 1;
                self.render_table(output, table);
            }
            BlockKind::Caption { text } => {
                self.stats.caption_count += 1;
                let caption = format!("*{}*", self.escape(text.trim()));
                output.push_str(&wrap(&caption, self.options.line_width));
                output.push_str("\n\n");
            }
        }
    }

    fn render_heading(&self, output: &mut String, level: u8, text: &str) {
        let level = level.min(self.options.max_heading_level).max(1);
        let text = self.escape(text.trim());
        match self.options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let marker = if level == 1 { "=" } else { "-" };
                let width = text.chars().count().max(3);
                output.push_str(&text);
                output.push('\n');
                output.push_str(&marker.repeat(width));
            }
            _ => {
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                output.push_str(&text);
            }
        }
        output.push_str("\n\n");
    }

    /// Paragraph text with emphasis markers. Whitespace at the edges of an
    /// emphasised span is moved outside the markers.
    fn render_spans(&self, spans: &[InlineText]) -> String {
        let mut out = String::new();
        for span in spans {
            let text = self.escape(&span.text);
            if !span.emphasis {
                out.push_str(&text);
                continue;
            }
            let core = text.trim();
            if core.is_empty() {
                out.push_str(&text);
                continue;
            }
            let lead = &text[..text.len() - text.trim_start().len()];
            let trail = &text[text.trim_end().len()..];
            out.push_str(lead);
            out.push('*');
            out.push_str(core);
            out.push('*');
            out.push_str(trail);
        }
        out.trim().to_string()
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        let cells: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                (0..col_count)
                    .map(|c| {
                        let text = row.get(c).map_or("", |s| s.trim());
                        escape_cell(&self.escape(text))
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = (0..col_count)
            .map(|c| {
                cells
                    .iter()
                    .map(|row| row[c].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(3)
            })
            .collect();

        let header_rows = table.header_rows.min(cells.len());
        if header_rows == 0 {
            push_row(output, &vec![String::new(); col_count], &widths);
            push_separator(output, &widths);
        }
        for (i, row) in cells.iter().enumerate() {
            push_row(output, row, &widths);
            if header_rows > 0 && i + 1 == header_rows {
                push_separator(output, &widths);
            }
        }
        output.push('\n');
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    output.push('|');
    for (cell, &width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count().min(width);
        output.push(' ');
        output.push_str(cell);
        output.push_str(&" ".repeat(pad));
        output.push_str(" |");
    }
    output.push('\n');
}

fn push_separator(output: &mut String, widths: &[usize]) {
    output.push('|');
    for &width in widths {
        output.push(' ');
        output.push_str(&"-".repeat(width));
        output.push_str(" |");
    }
    output.push('\n');
}

/// Escape characters that would be read as inline Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '|') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Pipes and line breaks inside a table cell.
fn escape_cell(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '|' if !escaped => result.push_str("\\|"),
            '\n' | '\r' => result.push(' '),
            _ => result.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    result
}

/// Whether a word would open a block construct at the start of a line.
fn opens_block(word: &str) -> bool {
    if matches!(word, "-" | "+" | "*" | ">") || word.starts_with('#') || word.starts_with('>') {
        return true;
    }
    let digits = word.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && matches!(&word[digits..], "." | ")")
}

/// Keep paragraph text from being read as a heading, quote or list item.
fn escape_line_start(text: &str) -> String {
    let Some(first) = text.split_whitespace().next() else {
        return text.to_string();
    };
    if !opens_block(first) {
        return text.to_string();
    }
    let digits = first.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        format!("{}\\{}", &text[..digits], &text[digits..])
    } else {
        format!("\\{}", text)
    }
}

/// Greedy word wrap. Words that would open a block construct never start a
/// line.
fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));
    let mut line_len = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if line_len == 0 {
            out.push_str(word);
            line_len = len;
        } else if line_len + 1 + len > width && !opens_block(word) {
            out.push('\n');
            out.push_str(word);
            line_len = len;
        } else {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + len;
        }
    }
    out
}
