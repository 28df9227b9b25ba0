//! Column and line detection.
//!
//! Runs are first grouped into page-wide rows. Each row is split into
//! segments wherever the horizontal gap exceeds the column gap threshold,
//! and gutters are x-intervals that (almost) no segment covers. When the
//! first sweep finds none, a few wide segments (mastheads, footers) are set
//! aside and the sweep is repeated. Segments crossing a gutter are
//! full-width bands that split the page into sections; inside a section the
//! columns are read left to right.

use std::cmp::Ordering;

use crate::model::{BBox, RunId, TextRun};

use super::index::GeometryIndex;
use super::tolerance;

/// Segments wider than this share of the content width may span columns.
const WIDE_SEGMENT_RATIO: f32 = 0.5;

/// At most one segment in this many may be set aside as spanning.
const MAX_SPANNING_SHARE: usize = 4;

/// A text line: runs sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Run ids ordered by `x0`
    pub runs: Vec<RunId>,
    /// Union of the run boxes
    pub bbox: BBox,
}

impl Line {
    fn from_runs(runs: &[TextRun], mut ids: Vec<RunId>) -> Self {
        ids.sort_by(|&a, &b| {
            let (ra, rb) = (&runs[a].bbox, &runs[b].bbox);
            ra.x0
                .partial_cmp(&rb.x0)
                .unwrap_or(Ordering::Equal)
                .then(ra.y0.partial_cmp(&rb.y0).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });
        let bbox = BBox::enclosing(ids.iter().map(|&id| &runs[id].bbox))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Self { runs: ids, bbox }
    }

    /// Text of the line with inferred word spacing.
    pub fn text(&self, runs: &[TextRun]) -> String {
        line_text(self.runs.iter().map(|&id| &runs[id]))
    }
}

/// A vertical strip of lines read top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Position in reading order
    pub index: usize,
    /// Union of the line boxes
    pub bbox: BBox,
    /// Lines ordered top to bottom
    pub lines: Vec<Line>,
    /// Whether the column spans every column of its section
    pub full_width: bool,
}

impl Column {
    fn new(lines: Vec<Line>, full_width: bool) -> Self {
        let bbox = BBox::enclosing(lines.iter().map(|l| &l.bbox))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Self {
            index: 0,
            bbox,
            lines,
            full_width,
        }
    }

    /// All run ids in reading order.
    pub fn run_ids(&self) -> impl Iterator<Item = RunId> + '_ {
        self.lines.iter().flat_map(|l| l.runs.iter().copied())
    }
}

/// Optional full-width lines followed by the lines of each band.
type Section = (Option<Vec<Line>>, Vec<Vec<Line>>);

/// Groups a page's runs into columns and lines.
#[derive(Debug, Clone, Default)]
pub struct SpatialClusterer {
    column_gap_factor: Option<f32>,
}

impl SpatialClusterer {
    /// Create a clusterer with derived thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale the derived column gap threshold.
    pub fn with_column_gap_factor(mut self, factor: Option<f32>) -> Self {
        self.column_gap_factor = factor;
        self
    }

    /// Cluster the given runs of an indexed page into columns in reading
    /// order. Every run id appears in exactly one line of one column.
    pub fn cluster(&self, index: &GeometryIndex<'_>, ids: &[RunId]) -> Vec<Column> {
        if ids.is_empty() {
            return Vec::new();
        }
        let runs = index.runs();
        let stats = index.stats();
        let threshold = tolerance::column_gap_threshold(
            stats.median_gap,
            stats.median_height,
            self.column_gap_factor.unwrap_or(1.0),
        );

        // Step 1: page-wide rows, split into segments at wide gaps
        let rows = group_lines(runs, ids, stats.median_height);
        let segments: Vec<Line> = rows
            .iter()
            .flat_map(|row| split_at_gaps(runs, row, threshold))
            .collect();

        // Step 2: gutters between bands
        let mut gutters = find_gutters(&segments, threshold);
        if gutters.is_empty() {
            gutters = gutters_below_spanning(&segments, threshold);
        }
        if gutters.is_empty() {
            log::debug!(
                "SpatialClusterer: page {} single column, {} lines",
                index.page().page_index,
                rows.len()
            );
            return number(vec![Column::new(rows, true)]);
        }
        let bands = bands_between(&segments, &gutters);

        // Step 3: spanning segments cut the page into sections
        let slack = tolerance::baseline_tolerance(stats.median_height);
        let mut sections: Vec<Section> = vec![(None, vec![Vec::new(); bands.len()])];
        for segment in segments {
            let overlapping: Vec<(usize, f32)> = bands
                .iter()
                .enumerate()
                .map(|(i, &(lo, hi))| (i, segment.bbox.x1.min(hi) - segment.bbox.x0.max(lo)))
                .filter(|(_, overlap)| *overlap > slack)
                .collect();
            if overlapping.len() >= 2 {
                let extends_band = matches!(
                    sections.last(),
                    Some((Some(_), columns)) if columns.iter().all(Vec::is_empty)
                );
                match sections.last_mut() {
                    Some((Some(spanning), _)) if extends_band => spanning.push(segment),
                    _ => sections.push((Some(vec![segment]), vec![Vec::new(); bands.len()])),
                }
                continue;
            }
            let band = overlapping
                .iter()
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
                .map(|(i, _)| *i)
                .unwrap_or_else(|| nearest_band(&bands, segment.bbox.center_x()));
            if let Some((_, columns)) = sections.last_mut() {
                columns[band].push(segment);
            }
        }

        let mut columns = Vec::new();
        for (spanning, bands) in sections {
            if let Some(lines) = spanning {
                columns.push(Column::new(lines, true));
            }
            for lines in bands.into_iter().filter(|l| !l.is_empty()) {
                columns.push(Column::new(lines, false));
            }
        }

        log::debug!(
            "SpatialClusterer: page {} {} gutters, {} columns",
            index.page().page_index,
            gutters.len(),
            columns.len()
        );

        number(columns)
    }
}

fn number(mut columns: Vec<Column>) -> Vec<Column> {
    for (i, column) in columns.iter_mut().enumerate() {
        column.index = i;
    }
    columns
}

/// Group runs into lines ordered top to bottom.
///
/// A run joins the current line when it shares a line with the line's first
/// run; anchoring on the first run keeps slightly offset neighbouring lines
/// from chaining together.
pub fn group_lines(runs: &[TextRun], ids: &[RunId], median_height: f32) -> Vec<Line> {
    let mut sorted = ids.to_vec();
    sorted.sort_by(|&a, &b| {
        let (ra, rb) = (&runs[a].bbox, &runs[b].bbox);
        ra.center_y()
            .partial_cmp(&rb.center_y())
            .unwrap_or(Ordering::Equal)
            .then(ra.x0.partial_cmp(&rb.x0).unwrap_or(Ordering::Equal))
            .then(a.cmp(&b))
    });

    let mut lines = Vec::new();
    let mut current: Vec<RunId> = Vec::new();
    for id in sorted {
        if let Some(&anchor) = current.first() {
            if !tolerance::same_line(&runs[anchor].bbox, &runs[id].bbox, median_height) {
                lines.push(Line::from_runs(runs, std::mem::take(&mut current)));
            }
        }
        current.push(id);
    }
    if !current.is_empty() {
        lines.push(Line::from_runs(runs, current));
    }
    lines
}

fn split_at_gaps(runs: &[TextRun], row: &Line, threshold: f32) -> Vec<Line> {
    let mut segments = Vec::new();
    let mut current: Vec<RunId> = Vec::new();
    let mut right_edge = f32::NEG_INFINITY;
    for &id in &row.runs {
        let bbox = &runs[id].bbox;
        if !current.is_empty() && bbox.x0 - right_edge > threshold {
            segments.push(Line::from_runs(runs, std::mem::take(&mut current)));
        }
        right_edge = if current.is_empty() { bbox.x1 } else { right_edge.max(bbox.x1) };
        current.push(id);
    }
    if !current.is_empty() {
        segments.push(Line::from_runs(runs, current));
    }
    segments
}

/// Gutters found once the widest segments are left out of the sweep. Only
/// applies while those segments are a small minority of the page.
fn gutters_below_spanning(segments: &[Line], threshold: f32) -> Vec<(f32, f32)> {
    let min_x = segments.iter().map(|s| s.bbox.x0).fold(f32::INFINITY, f32::min);
    let max_x = segments.iter().map(|s| s.bbox.x1).fold(f32::NEG_INFINITY, f32::max);
    let wide = WIDE_SEGMENT_RATIO * (max_x - min_x);
    let narrow: Vec<Line> = segments
        .iter()
        .filter(|s| s.bbox.width() <= wide)
        .cloned()
        .collect();
    let spanning = segments.len() - narrow.len();
    if spanning == 0 || spanning * MAX_SPANNING_SHARE > segments.len() {
        return Vec::new();
    }
    find_gutters(&narrow, threshold)
}

/// X-intervals at least `threshold` wide that no more than a noise share of
/// segments cover, each leaving enough segments on both sides, with lines
/// on the left standing beside lines on the right.
fn find_gutters(segments: &[Line], threshold: f32) -> Vec<(f32, f32)> {
    if segments.len() < 4 {
        return Vec::new();
    }
    let noise = segments.len() / 20;
    let min_x = segments.iter().map(|s| s.bbox.x0).fold(f32::INFINITY, f32::min);

    let mut events: Vec<(f32, i32)> = segments
        .iter()
        .flat_map(|s| [(s.bbox.x0, 1), (s.bbox.x1, -1)])
        .collect();
    // closings before openings at the same x
    events.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));

    let mut candidates = Vec::new();
    let mut coverage = 0i32;
    let mut open: Option<f32> = None;
    for (x, delta) in events {
        coverage += delta;
        let sparse = coverage as usize <= noise;
        match (open, sparse) {
            (None, true) if x > min_x => open = Some(x),
            (Some(start), false) => {
                if x - start >= threshold {
                    candidates.push((start, x));
                }
                open = None;
            }
            _ => {}
        }
    }

    // each band must hold a reasonable share of the segments
    let min_share = (segments.len() / 10).max(2);
    let mut gutters: Vec<(f32, f32)> = Vec::new();
    for candidate in candidates {
        let left_edge = gutters.last().map_or(f32::NEG_INFINITY, |g| g.1);
        let left: Vec<&Line> = segments
            .iter()
            .filter(|s| s.bbox.center_x() > left_edge && s.bbox.center_x() < candidate.0)
            .collect();
        let right: Vec<&Line> = segments
            .iter()
            .filter(|s| s.bbox.center_x() > candidate.1)
            .collect();
        let beside = left
            .iter()
            .filter(|l| right.iter().any(|r| r.bbox.vertical_overlap(&l.bbox) > 0.0))
            .count();
        if left.len() >= min_share && right.len() >= min_share && beside >= min_share {
            gutters.push(candidate);
        }
    }
    gutters
}

fn bands_between(segments: &[Line], gutters: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let min_x = segments.iter().map(|s| s.bbox.x0).fold(f32::INFINITY, f32::min);
    let max_x = segments.iter().map(|s| s.bbox.x1).fold(f32::NEG_INFINITY, f32::max);
    let mut bands = Vec::with_capacity(gutters.len() + 1);
    let mut start = min_x;
    for &(lo, hi) in gutters {
        bands.push((start, lo));
        start = hi;
    }
    bands.push((start, max_x));
    bands
}

fn nearest_band(bands: &[(f32, f32)], x: f32) -> usize {
    bands
        .iter()
        .enumerate()
        .min_by(|a, b| {
            let da = (x - (a.1 .0 + a.1 .1) / 2.0).abs();
            let db = (x - (b.1 .0 + b.1 .1) / 2.0).abs();
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        })
        .map_or(0, |(i, _)| i)
}

/// Join runs into text with inferred word spacing.
pub fn line_text<'r>(runs: impl IntoIterator<Item = &'r TextRun>) -> String {
    let mut result = String::new();
    let mut prev: Option<&TextRun> = None;

    for run in runs {
        if let Some(prev) = prev {
            if needs_space(prev, run) && !result.ends_with(char::is_whitespace) {
                result.push(' ');
            }
        }
        result.push_str(&run.text);
        prev = Some(run);
    }

    result
}

/// Whether a space separates two adjacent runs of a line: the gap must
/// exceed a fifth of the average character width, neither run may already
/// carry the space, and two ideographic or kana characters are never
/// separated.
pub fn needs_space(prev: &TextRun, run: &TextRun) -> bool {
    let gap = run.bbox.x0 - prev.bbox.x1;
    let chars = run.text.chars().count();
    let avg_char_width = if chars > 0 && run.bbox.width() > 0.0 {
        run.bbox.width() / chars as f32
    } else {
        run.size * 0.5
    };
    let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
        && run.text.chars().next().is_some_and(is_spaceless_script_char);
    let has_space = prev.text.ends_with(char::is_whitespace) || run.text.starts_with(char::is_whitespace);
    gap > avg_char_width * 0.2 && !spaceless && !has_space
}

/// Scripts written without spaces between words (Chinese and Japanese).
/// Hangul is excluded: Korean separates words with spaces.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3000..=0x303F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageGeometry;

    fn make_run(text: &str, x: f32, y: f32, width: f32) -> TextRun {
        TextRun::new(text, BBox::new(x, y, x + width, y + 12.0), "Times-Roman", 12.0)
    }

    fn all_ids(page: &PageGeometry) -> Vec<RunId> {
        (0..page.runs.len()).collect()
    }

    fn texts(page: &PageGeometry, column: &Column) -> Vec<String> {
        column.lines.iter().map(|l| l.text(&page.runs)).collect()
    }

    /// Two columns of words with a gutter at x = 260..326.
    fn two_column_page(with_title: bool) -> PageGeometry {
        let mut page = PageGeometry::letter(0);
        if with_title {
            page.push_run(make_run("A", 150.0, 40.0, 10.0));
            page.push_run(make_run("centered", 163.0, 40.0, 80.0));
            page.push_run(make_run("title", 249.0, 40.0, 100.0));
        }
        for line in 0..10 {
            let y = 80.0 + line as f32 * 14.0;
            for (x, word) in [(72.0, "left"), (135.0, "column"), (200.0, "text")] {
                page.push_run(make_run(&format!("{}{}", word, line), x, y, 60.0));
            }
            for (x, word) in [(326.0, "right"), (389.0, "column"), (452.0, "text")] {
                page.push_run(make_run(&format!("{}{}", word, line), x, y, 60.0));
            }
        }
        page
    }

    #[test]
    fn test_single_column() {
        let mut page = PageGeometry::letter(0);
        for line in 0..5 {
            page.push_run(make_run("The quick brown fox", 72.0, 100.0 + line as f32 * 14.0, 400.0));
        }
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new().cluster(&index, index.by_y());
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].lines.len(), 5);
    }

    #[test]
    fn test_two_columns_read_left_then_right() {
        let page = two_column_page(false);
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new().cluster(&index, index.by_y());

        assert_eq!(columns.len(), 2);
        assert!(columns[0].bbox.x1 <= columns[1].bbox.x0);
        let left = texts(&page, &columns[0]);
        assert_eq!(left[0], "left0 column0 text0");
        assert_eq!(left[9], "left9 column9 text9");
        assert_eq!(texts(&page, &columns[1])[0], "right0 column0 text0");
    }

    #[test]
    fn test_full_width_band_precedes_columns() {
        let page = two_column_page(true);
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new().cluster(&index, index.by_y());

        assert_eq!(columns.len(), 3);
        assert!(columns[0].full_width);
        assert_eq!(texts(&page, &columns[0]), vec!["A centered title"]);
        assert!(!columns[1].full_width);
        assert!(columns[1].bbox.x0 < columns[2].bbox.x0);
    }

    #[test]
    fn test_masthead_and_footer_around_columns() {
        let mut page = two_column_page(false);
        page.push_run(make_run("The Quarterly Gazette masthead across the page", 72.0, 40.0, 440.0));
        page.push_run(make_run("Footer line printed under both columns", 72.0, 240.0, 440.0));
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new().cluster(&index, index.by_y());

        assert_eq!(columns.len(), 4);
        assert!(columns[0].full_width);
        assert_eq!(texts(&page, &columns[0]), vec!["The Quarterly Gazette masthead across the page"]);
        let left = texts(&page, &columns[1]);
        assert_eq!(left.len(), 10);
        assert_eq!(left[0], "left0 column0 text0");
        assert_eq!(left[9], "left9 column9 text9");
        let right = texts(&page, &columns[2]);
        assert_eq!(right[0], "right0 column0 text0");
        assert_eq!(right[9], "right9 column9 text9");
        assert!(columns[3].full_width);
        assert_eq!(texts(&page, &columns[3]), vec!["Footer line printed under both columns"]);
    }

    #[test]
    fn test_every_run_emitted_once() {
        let page = two_column_page(true);
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new().cluster(&index, index.by_y());
        let mut seen: Vec<RunId> = columns.iter().flat_map(|c| c.run_ids()).collect();
        seen.sort_unstable();
        assert_eq!(seen, all_ids(&page));
    }

    #[test]
    fn test_large_gap_factor_disables_columns() {
        let page = two_column_page(false);
        let index = GeometryIndex::build(&page);
        let columns = SpatialClusterer::new()
            .with_column_gap_factor(Some(10.0))
            .cluster(&index, index.by_y());
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn test_group_lines_orders_by_x() {
        let page = PageGeometry::letter(0)
            .with_run(make_run("world", 110.0, 100.0, 30.0))
            .with_run(make_run("Hello", 72.0, 101.0, 30.0))
            .with_run(make_run("Next", 72.0, 120.0, 30.0));
        let lines = group_lines(&page.runs, &all_ids(&page), 12.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].runs, vec![1, 0]);
        assert_eq!(lines[0].text(&page.runs), "Hello world");
    }

    #[test]
    fn test_line_text_spacing() {
        let adjoining = [make_run("Hel", 0.0, 0.0, 15.0), make_run("lo", 15.2, 0.0, 10.0)];
        assert_eq!(line_text(&adjoining), "Hello");

        let cjk = [make_run("日本", 0.0, 0.0, 24.0), make_run("語", 30.0, 0.0, 12.0)];
        assert_eq!(line_text(&cjk), "日本語");

        let hangul = [make_run("한국", 0.0, 0.0, 24.0), make_run("어", 30.0, 0.0, 12.0)];
        assert_eq!(line_text(&hangul), "한국 어");

        let spaced = [make_run("a ", 0.0, 0.0, 10.0), make_run("b", 20.0, 0.0, 5.0)];
        assert_eq!(line_text(&spaced), "a b");
    }

    #[test]
    fn test_empty_input() {
        let page = PageGeometry::letter(0);
        let index = GeometryIndex::build(&page);
        assert!(SpatialClusterer::new().cluster(&index, &[]).is_empty());
    }
}
