//! Spatial index over one page's runs and drawing primitives.
//!
//! The index is built once per page and only borrows the page: runs and
//! primitives are addressed by their position in the page vectors and never
//! copied or mutated.

use std::cmp::Ordering;

use crate::model::{BBox, DrawingPrimitive, PageGeometry, RunId, TextRun};

use super::tolerance::{self, FALLBACK_HEIGHT};

/// Page statistics every tolerance is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStats {
    /// Median run height
    pub median_height: f32,
    /// Median nominal font size
    pub median_size: f32,
    /// Median horizontal gap between neighbouring runs on a line
    pub median_gap: f32,
    /// Extent of all indexed runs (the page box when there are none)
    pub content: BBox,
}

/// Static interval tree over closed intervals `[lo, hi]`.
///
/// Intervals are kept sorted by `lo`; the implicit balanced tree over that
/// array stores, at each midpoint, the largest `hi` of its subtree.
#[derive(Debug, Clone, Default)]
struct IntervalTree {
    entries: Vec<(f32, f32, usize)>,
    max_hi: Vec<f32>,
}

impl IntervalTree {
    fn build(mut entries: Vec<(f32, f32, usize)>) -> Self {
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.2.cmp(&b.2)));
        let mut tree = Self {
            max_hi: vec![f32::NEG_INFINITY; entries.len()],
            entries,
        };
        tree.fill_max(0, tree.entries.len());
        tree
    }

    fn fill_max(&mut self, lo: usize, hi: usize) -> f32 {
        if lo >= hi {
            return f32::NEG_INFINITY;
        }
        let mid = (lo + hi) / 2;
        let left = self.fill_max(lo, mid);
        let right = self.fill_max(mid + 1, hi);
        let max = self.entries[mid].1.max(left).max(right);
        self.max_hi[mid] = max;
        max
    }

    /// Ids of all intervals intersecting `[lo, hi]`, ascending.
    fn query(&self, lo: f32, hi: f32) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect(0, self.entries.len(), lo, hi, &mut out);
        out.sort_unstable();
        out
    }

    fn collect(&self, start: usize, end: usize, lo: f32, hi: f32, out: &mut Vec<usize>) {
        if start >= end {
            return;
        }
        let mid = (start + end) / 2;
        if self.max_hi[mid] < lo {
            return;
        }
        self.collect(start, mid, lo, hi, out);
        let (entry_lo, entry_hi, id) = self.entries[mid];
        if entry_lo <= hi {
            if entry_hi >= lo {
                out.push(id);
            }
            self.collect(mid + 1, end, lo, hi, out);
        }
    }
}

/// Read-only spatial index of a page.
#[derive(Debug, Clone)]
pub struct GeometryIndex<'a> {
    page: &'a PageGeometry,
    by_y: Vec<RunId>,
    by_x: Vec<RunId>,
    dropped: Vec<RunId>,
    x_tree: IntervalTree,
    y_tree: IntervalTree,
    primitive_tree: IntervalTree,
    stats: PageStats,
}

impl<'a> GeometryIndex<'a> {
    /// Build the index. Runs with empty text or zero area are excluded and
    /// listed in [`dropped`](Self::dropped).
    pub fn build(page: &'a PageGeometry) -> Self {
        let (indexed, dropped): (Vec<RunId>, Vec<RunId>) =
            (0..page.runs.len()).partition(|&id| !page.runs[id].is_degenerate());

        let mut by_y = indexed.clone();
        by_y.sort_by(|&a, &b| reading_cmp(&page.runs[a].bbox, &page.runs[b].bbox).then(a.cmp(&b)));
        let mut by_x = indexed.clone();
        by_x.sort_by(|&a, &b| {
            let (ra, rb) = (&page.runs[a].bbox, &page.runs[b].bbox);
            ra.x0
                .partial_cmp(&rb.x0)
                .unwrap_or(Ordering::Equal)
                .then(ra.y0.partial_cmp(&rb.y0).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });

        let x_tree = IntervalTree::build(
            indexed
                .iter()
                .map(|&id| (page.runs[id].bbox.x0, page.runs[id].bbox.x1, id))
                .collect(),
        );
        let y_tree = IntervalTree::build(
            indexed
                .iter()
                .map(|&id| (page.runs[id].bbox.y0, page.runs[id].bbox.y1, id))
                .collect(),
        );
        let primitive_tree = IntervalTree::build(
            page.primitives
                .iter()
                .enumerate()
                .map(|(i, p)| (p.bbox.x0, p.bbox.x1, i))
                .collect(),
        );

        let mut index = Self {
            page,
            by_y,
            by_x,
            dropped,
            x_tree,
            y_tree,
            primitive_tree,
            stats: PageStats {
                median_height: FALLBACK_HEIGHT,
                median_size: FALLBACK_HEIGHT,
                median_gap: FALLBACK_HEIGHT * 0.25,
                content: page.page_box(),
            },
        };
        index.stats = index.compute_stats();

        log::debug!(
            "GeometryIndex: page {} indexed {} runs ({} dropped), {} primitives",
            page.page_index,
            index.by_y.len(),
            index.dropped.len(),
            page.primitives.len()
        );

        index
    }

    fn compute_stats(&self) -> PageStats {
        let runs = &self.page.runs;
        let median_height =
            tolerance::median(self.by_y.iter().map(|&id| runs[id].bbox.height())).unwrap_or(FALLBACK_HEIGHT);
        let median_size = tolerance::median(
            self.by_y
                .iter()
                .map(|&id| runs[id].size)
                .filter(|s| *s > 0.0),
        )
        .unwrap_or(median_height);

        let provisional = PageStats {
            median_height,
            median_size,
            median_gap: median_height * 0.25,
            content: self.stats.content,
        };

        // gutters and table gaps are far wider than word gaps; keep them out
        let gap_ceiling = 3.0 * median_height;
        let gaps = self.by_y.iter().filter_map(|&id| {
            let bbox = &runs[id].bbox;
            let next = self.nearest_right_with(bbox, &provisional)?;
            let gap = runs[next].bbox.x0 - bbox.x1;
            (gap > 0.0 && gap < gap_ceiling).then_some(gap)
        });
        let median_gap = tolerance::median(gaps).unwrap_or(median_height * 0.25);

        let content = BBox::enclosing(self.by_y.iter().map(|&id| &runs[id].bbox))
            .unwrap_or_else(|| self.page.page_box());

        PageStats {
            median_height,
            median_size,
            median_gap,
            content,
        }
    }

    /// The indexed page.
    pub fn page(&self) -> &'a PageGeometry {
        self.page
    }

    /// A run by id.
    pub fn run(&self, id: RunId) -> &'a TextRun {
        &self.page.runs[id]
    }

    /// All runs of the page, including dropped ones.
    pub fn runs(&self) -> &'a [TextRun] {
        &self.page.runs
    }

    /// All primitives of the page.
    pub fn primitives(&self) -> &'a [DrawingPrimitive] {
        &self.page.primitives
    }

    /// Indexed runs sorted top-to-bottom, then left-to-right.
    pub fn by_y(&self) -> &[RunId] {
        &self.by_y
    }

    /// Indexed runs sorted left-to-right, then top-to-bottom.
    pub fn by_x(&self) -> &[RunId] {
        &self.by_x
    }

    /// Runs excluded from the index.
    pub fn dropped(&self) -> &[RunId] {
        &self.dropped
    }

    /// Whether the page has nothing to analyze.
    pub fn is_empty(&self) -> bool {
        self.by_y.is_empty() && self.page.primitives.is_empty()
    }

    /// Page statistics.
    pub fn stats(&self) -> &PageStats {
        &self.stats
    }

    /// Runs whose box intersects `rect`, ascending by id.
    pub fn runs_in(&self, rect: &BBox) -> Vec<RunId> {
        self.x_tree
            .query(rect.x0, rect.x1)
            .into_iter()
            .filter(|&id| {
                let b = &self.page.runs[id].bbox;
                b.y0 <= rect.y1 && b.y1 >= rect.y0
            })
            .collect()
    }

    /// Runs whose box center lies inside `rect`, ascending by id.
    pub fn runs_centered_in(&self, rect: &BBox) -> Vec<RunId> {
        self.runs_in(rect)
            .into_iter()
            .filter(|&id| {
                let (x, y) = self.page.runs[id].bbox.center();
                rect.contains_point(x, y)
            })
            .collect()
    }

    /// Primitives whose box intersects `rect`, ascending by position.
    pub fn primitives_in(&self, rect: &BBox) -> Vec<usize> {
        self.primitive_tree
            .query(rect.x0, rect.x1)
            .into_iter()
            .filter(|&i| {
                let b = &self.page.primitives[i].bbox;
                b.y0 <= rect.y1 && b.y1 >= rect.y0
            })
            .collect()
    }

    /// Closest run below `bbox` that overlaps it horizontally.
    pub fn nearest_below(&self, bbox: &BBox) -> Option<RunId> {
        let slack = tolerance::baseline_tolerance(self.stats.median_height);
        self.x_tree
            .query(bbox.x0, bbox.x1)
            .into_iter()
            .filter(|&id| {
                let b = &self.page.runs[id].bbox;
                b.horizontal_overlap(bbox) > 0.0
                    && b.center_y() > bbox.center_y()
                    && b.y0 >= bbox.y1 - slack
            })
            .min_by(|&a, &b| {
                let (ra, rb) = (&self.page.runs[a].bbox, &self.page.runs[b].bbox);
                (ra.y0 - bbox.y1)
                    .partial_cmp(&(rb.y0 - bbox.y1))
                    .unwrap_or(Ordering::Equal)
                    .then(ra.x0.partial_cmp(&rb.x0).unwrap_or(Ordering::Equal))
                    .then(a.cmp(&b))
            })
    }

    /// Closest run to the right of `bbox` on the same line.
    pub fn nearest_right(&self, bbox: &BBox) -> Option<RunId> {
        self.nearest_right_with(bbox, &self.stats)
    }

    fn nearest_right_with(&self, bbox: &BBox, stats: &PageStats) -> Option<RunId> {
        let slack = tolerance::baseline_tolerance(stats.median_height);
        self.y_tree
            .query(bbox.y0, bbox.y1)
            .into_iter()
            .filter(|&id| {
                let b = &self.page.runs[id].bbox;
                b.center_x() > bbox.center_x()
                    && b.x0 >= bbox.x1 - slack
                    && tolerance::same_line(b, bbox, stats.median_height)
            })
            .min_by(|&a, &b| {
                let (ra, rb) = (&self.page.runs[a].bbox, &self.page.runs[b].bbox);
                ra.x0
                    .partial_cmp(&rb.x0)
                    .unwrap_or(Ordering::Equal)
                    .then(ra.y0.partial_cmp(&rb.y0).unwrap_or(Ordering::Equal))
                    .then(a.cmp(&b))
            })
    }
}

/// Raw reading order: top edge, then left edge.
pub fn reading_cmp(a: &BBox, b: &BBox) -> Ordering {
    a.y0.partial_cmp(&b.y0)
        .unwrap_or(Ordering::Equal)
        .then(a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal))
}
