//! Document assembly.
//!
//! Pass 1 turns each column's lines into heading, paragraph and caption
//! blocks. Pass 2 builds a new sequence in which table runs are lifted out of
//! their blocks and replaced by one table block per region. Finally
//! [`merge_pages`] joins the per-page sequences.

mod merge;

pub use merge::merge_pages;

use std::collections::HashMap;

use regex::Regex;

use crate::analysis::cluster::{group_lines, is_spaceless_script_char, needs_space, Column};
use crate::analysis::{tolerance, GeometryIndex, RoleMap};
use crate::error::Result;
use crate::model::{BBox, Block, BlockKind, FontRole, InlineText, RunId, Table, TableRegion};

/// Caption labels: `Figure 2`, `Fig. 3`, `Table IV`, `Chart A:`...
const CAPTION_LABEL: &str =
    r"(?i)^(figure|fig\.|table|tab\.|image|chart|graph|diagram)\s*([0-9]+|[ivxlc]+|[a-z])\b";

/// Labels of captions that describe a table.
const TABLE_LABEL: &str = r"(?i)^(table|tab\.)";

/// Font size difference (points) below body size that counts as smaller.
const SMALLER_THAN_BODY: f32 = 0.5;

/// Blocks of one page.
#[derive(Debug, Clone, Default)]
pub struct PageAssembly {
    /// Linear structure before table promotion
    pub first_pass: Vec<Block>,
    /// Final blocks of the page
    pub blocks: Vec<Block>,
}

/// How a line groups with its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineClass {
    Heading(u8),
    Text,
    Caption,
}

/// A classified line.
#[derive(Debug, Clone)]
struct LineInfo {
    runs: Vec<RunId>,
    bbox: BBox,
    role: FontRole,
    class: LineClass,
}

/// Builds blocks from clustered lines and table regions.
#[derive(Debug, Clone)]
pub struct DocumentAssembler<'r> {
    roles: &'r RoleMap,
    caption_label: Regex,
    table_label: Regex,
}

impl<'r> DocumentAssembler<'r> {
    /// Create an assembler for a document's role map.
    pub fn new(roles: &'r RoleMap) -> Result<Self> {
        Ok(Self {
            roles,
            caption_label: Regex::new(CAPTION_LABEL)?,
            table_label: Regex::new(TABLE_LABEL)?,
        })
    }

    /// Run both passes for one page.
    pub fn assemble_page(
        &self,
        index: &GeometryIndex<'_>,
        columns: &[Column],
        tables: &[TableRegion],
    ) -> PageAssembly {
        let first_pass = self.first_pass(index, columns);
        let blocks = self.second_pass(index, &first_pass, tables);
        log::debug!(
            "DocumentAssembler: page {} {} blocks in pass 1, {} after tables",
            index.page().page_index,
            first_pass.len(),
            blocks.len()
        );
        PageAssembly { first_pass, blocks }
    }

    /// Pass 1: linear structure from columns, one block per run of
    /// similar lines.
    pub fn first_pass(&self, index: &GeometryIndex<'_>, columns: &[Column]) -> Vec<Block> {
        let mut blocks = Vec::new();
        for column in columns {
            let lines = column
                .lines
                .iter()
                .map(|line| self.classify(index, line.runs.clone()))
                .collect();
            blocks.extend(self.group_into_blocks(index, lines));
        }
        blocks
    }

    /// Pass 2: a new sequence with table regions promoted to table blocks.
    pub fn second_pass(
        &self,
        index: &GeometryIndex<'_>,
        first_pass: &[Block],
        tables: &[TableRegion],
    ) -> Vec<Block> {
        if tables.is_empty() {
            return first_pass.to_vec();
        }
        let owner: HashMap<RunId, usize> = tables
            .iter()
            .enumerate()
            .flat_map(|(t, region)| region.all_runs().map(move |id| (id, t)))
            .collect();
        // a heading enclosed by a table names its header row
        let mut header_row: Vec<Option<usize>> = vec![None; tables.len()];
        for block in first_pass.iter().filter(|b| matches!(b.kind, BlockKind::Heading { .. })) {
            let mut owners = block.run_ids().map(|id| owner.get(&id).copied());
            let Some(Some(t)) = owners.next() else {
                continue;
            };
            if !owners.all(|o| o == Some(t)) {
                continue;
            }
            if let Some(row) = block.run_ids().filter_map(|id| tables[t].row_of(id)).min() {
                header_row[t] = Some(header_row[t].map_or(row, |r| r.min(row)));
            }
        }

        let mut emitted = vec![false; tables.len()];
        let mut out = Vec::new();

        for block in first_pass {
            if !block.run_ids().any(|id| owner.contains_key(&id)) {
                out.push(block.clone());
                continue;
            }
            // enclosed headings and table text disappear into the table
            let mut pending: Vec<LineInfo> = Vec::new();
            for line in &block.lines {
                for &id in line {
                    if let Some(&t) = owner.get(&id) {
                        if !emitted[t] {
                            emitted[t] = true;
                            out.extend(self.group_into_blocks(index, std::mem::take(&mut pending)));
                            out.push(self.table_block(index, &tables[t], header_row[t]));
                        }
                    }
                }
                let free: Vec<RunId> = line
                    .iter()
                    .copied()
                    .filter(|id| !owner.contains_key(id))
                    .collect();
                if !free.is_empty() {
                    pending.push(self.classify(index, free));
                }
            }
            out.extend(self.group_into_blocks(index, pending));
        }

        for (t, region) in tables.iter().enumerate() {
            if !emitted[t] {
                out.push(self.table_block(index, region, header_row[t]));
            }
        }

        self.place_table_captions(&mut out);
        out
    }

    /// Classify a line by the role holding most of its characters.
    fn classify(&self, index: &GeometryIndex<'_>, runs: Vec<RunId>) -> LineInfo {
        let page_runs = index.runs();
        let mut volume: HashMap<FontRole, usize> = HashMap::new();
        for &id in &runs {
            let run = &page_runs[id];
            *volume.entry(self.roles.role_of(run)).or_default() += run.char_count().max(1);
        }
        let role = volume
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map_or(FontRole::Body, |(role, _)| role);

        let bbox = BBox::enclosing(runs.iter().map(|&id| &page_runs[id].bbox))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        let mut info = LineInfo {
            class: self.class_of(role),
            runs,
            bbox,
            role,
        };
        if !role.is_heading() && role != FontRole::Caption && self.is_labelled_caption(index, &info) {
            info.role = FontRole::Caption;
            info.class = LineClass::Caption;
        }
        info
    }

    fn class_of(&self, role: FontRole) -> LineClass {
        match role {
            FontRole::Title | FontRole::Heading(_) => LineClass::Heading(self.heading_level(role)),
            FontRole::Caption => LineClass::Caption,
            FontRole::Body | FontRole::Emphasis => LineClass::Text,
        }
    }

    /// Markdown level of a heading role. Without a title the first heading
    /// level is `#`.
    fn heading_level(&self, role: FontRole) -> u8 {
        match role {
            FontRole::Heading(n) if !self.roles.has_title() => n.clamp(1, 6),
            _ => role.markdown_level().unwrap_or(1),
        }
    }

    /// A label line that is italic or smaller than body text.
    fn is_labelled_caption(&self, index: &GeometryIndex<'_>, line: &LineInfo) -> bool {
        let runs = index.runs();
        let Some(&first) = line.runs.first() else {
            return false;
        };
        if !self.caption_label.is_match(runs[first].text.trim_start()) {
            return false;
        }
        let italic = line.runs.iter().all(|&id| runs[id].style.italic);
        let sizes: Vec<f32> = line.runs.iter().map(|&id| runs[id].size).collect();
        let mean = sizes.iter().sum::<f32>() / sizes.len() as f32;
        let smaller = self
            .roles
            .body_size()
            .is_some_and(|body| mean < body - SMALLER_THAN_BODY);
        italic || smaller
    }

    /// Split classified lines into blocks on class change, paragraph gaps
    /// and positive indentation.
    fn group_into_blocks(&self, index: &GeometryIndex<'_>, lines: Vec<LineInfo>) -> Vec<Block> {
        let stats = index.stats();
        let gap_limit = tolerance::paragraph_gap_threshold(stats.median_height);
        let indent_limit = tolerance::indent_threshold(stats.median_height);

        let mut blocks = Vec::new();
        let mut current: Vec<LineInfo> = Vec::new();
        for line in lines {
            if let Some(prev) = current.last() {
                let gap = line.bbox.y0 - prev.bbox.y1;
                let indent = line.bbox.x0 - prev.bbox.x0;
                let breaks = prev.class != line.class
                    || gap > gap_limit
                    || (line.class == LineClass::Text && indent > indent_limit);
                if breaks {
                    blocks.extend(self.build_block(index, std::mem::take(&mut current)));
                }
            }
            current.push(line);
        }
        blocks.extend(self.build_block(index, current));
        blocks
    }

    fn build_block(&self, index: &GeometryIndex<'_>, lines: Vec<LineInfo>) -> Option<Block> {
        let first = lines.first()?;
        let runs = index.runs();
        let class = first.class;

        let mut volume: HashMap<FontRole, usize> = HashMap::new();
        for line in &lines {
            *volume.entry(line.role).or_default() += line.runs.len();
        }
        let role = volume
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map_or(first.role, |(role, _)| role);

        let bbox = BBox::enclosing(lines.iter().map(|l| &l.bbox)).unwrap_or(first.bbox);
        let line_height = tolerance::median(lines.iter().map(|l| l.bbox.height()))
            .unwrap_or(index.stats().median_height);

        let mut spans: Vec<InlineText> = Vec::new();
        for line in &lines {
            let mut line_spans: Vec<InlineText> = Vec::new();
            let mut prev = None;
            for &id in &line.runs {
                let run = &runs[id];
                let emphasis = class == LineClass::Text && self.roles.role_of(run) == FontRole::Emphasis;
                let spaced = prev.is_some_and(|prev| needs_space(prev, run));
                match line_spans.last_mut() {
                    // the separator stays outside emphasised spans where possible
                    Some(last) if spaced && (!last.emphasis || emphasis) => last.text.push(' '),
                    _ if spaced => line_spans.push(InlineText::plain(" ")),
                    _ => {}
                }
                push_text(&mut line_spans, &run.text, emphasis);
                prev = Some(run);
            }
            join_lines(&mut spans, line_spans);
        }
        trim_spans(&mut spans);

        let text = || {
            spans
                .iter()
                .map(|s| s.text.as_str())
                .collect::<String>()
        };
        let kind = match class {
            LineClass::Heading(level) => BlockKind::Heading { level, text: text() },
            LineClass::Caption => BlockKind::Caption { text: text() },
            LineClass::Text => BlockKind::Paragraph { spans: spans.clone() },
        };

        Some(Block {
            kind,
            page_index: index.page().page_index,
            bbox,
            role,
            line_height,
            lines: lines.into_iter().map(|l| l.runs).collect(),
            continued: Vec::new(),
        })
    }

    /// A table block whose first row is the header. `header_row` moves an
    /// enclosed heading's row to the front.
    fn table_block(
        &self,
        index: &GeometryIndex<'_>,
        region: &TableRegion,
        header_row: Option<usize>,
    ) -> Block {
        let runs = index.runs();
        let median_height = index.stats().median_height;
        let cell_text = |cell| {
            group_lines(runs, region.runs_in(cell), median_height)
                .iter()
                .map(|line| line.text(runs).trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        };
        let mut rows: Vec<Vec<String>> = (0..region.row_count())
            .map(|r| (0..region.column_count()).map(|c| cell_text((r, c))).collect())
            .collect();
        let mut lines: Vec<Vec<RunId>> = (0..region.row_count())
            .map(|r| {
                (0..region.column_count())
                    .flat_map(|c| region.runs_in((r, c)).iter().copied())
                    .collect()
            })
            .collect();
        if let Some(r) = header_row.filter(|&r| r > 0 && r < rows.len()) {
            rows[..=r].rotate_right(1);
            lines[..=r].rotate_right(1);
        }

        Block {
            kind: BlockKind::Table(Table {
                region: region.clone(),
                rows,
                header_rows: 1,
            }),
            page_index: index.page().page_index,
            bbox: region.bbox,
            role: FontRole::Body,
            line_height: median_height,
            lines,
            continued: Vec::new(),
        }
    }

    /// A table caption printed above its table is moved below it.
    fn place_table_captions(&self, blocks: &mut [Block]) {
        let mut i = 0;
        while i + 1 < blocks.len() {
            let above_table = matches!(&blocks[i].kind, BlockKind::Caption { text } if self.table_label.is_match(text))
                && matches!(blocks[i + 1].kind, BlockKind::Table(_));
            if above_table {
                blocks.swap(i, i + 1);
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

/// Append text to the last span when the emphasis matches.
fn push_text(spans: &mut Vec<InlineText>, text: &str, emphasis: bool) {
    match spans.last_mut() {
        Some(last) if last.emphasis == emphasis => last.text.push_str(text),
        _ => spans.push(InlineText {
            text: text.to_string(),
            emphasis,
        }),
    }
}

/// Append a line's spans to a paragraph, joining words hyphenated across
/// the line break.
pub(crate) fn join_lines(spans: &mut Vec<InlineText>, line: Vec<InlineText>) {
    let mut line = line.into_iter();
    let Some(mut head) = line.next() else {
        return;
    };
    if let Some(last) = spans.last_mut() {
        let starts_lower = head.text.chars().next().is_some_and(char::is_lowercase);
        let trimmed = last.text.trim_end();
        let hyphenated = trimmed.ends_with('-')
            && trimmed
                .chars()
                .rev()
                .nth(1)
                .is_some_and(char::is_alphabetic);
        if hyphenated && starts_lower {
            let keep = trimmed.len() - 1;
            last.text.truncate(keep);
        } else {
            let spaceless = last.text.chars().last().is_some_and(is_spaceless_script_char)
                && head.text.chars().next().is_some_and(is_spaceless_script_char);
            let spaced = last.text.ends_with(char::is_whitespace) || head.text.starts_with(char::is_whitespace);
            if !spaceless && !spaced {
                last.text.push(' ');
            }
        }
        if last.emphasis == head.emphasis {
            last.text.push_str(&head.text);
            head.text.clear();
        }
    }
    if !head.text.is_empty() {
        spans.push(head);
    }
    for span in line {
        push_text(spans, &span.text, span.emphasis);
    }
}

fn trim_spans(spans: &mut Vec<InlineText>) {
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    spans.retain(|s| !s.text.is_empty());
}
