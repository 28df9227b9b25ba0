//! Table region detection.
//!
//! Three signals are tried in priority order:
//! 1. Ruled grids: line primitives, thin rectangles and the edges of stroked
//!    rectangles, joined into connected components.
//! 2. Repeated background fills (zebra stripes) giving row boundaries.
//! 3. Positional regularity: consecutive lines sharing the same x-starts,
//!    searched within the columns found by the spatial clusterer.
//!
//! A lower-priority candidate overlapping an accepted region is discarded,
//! and a run is assigned to at most one cell on the page.

use std::collections::{BTreeMap, HashSet};

use crate::model::{BBox, DrawingPrimitive, PrimitiveKind, RunId, TableRegion, TableSource, TextRun};

use super::cluster::{group_lines, line_text, Column, Line};
use super::index::{reading_cmp, GeometryIndex, PageStats};
use super::tolerance;

/// Rectangles covering this share of the page are page frames, not tables.
const PAGE_FRAME_RATIO: f32 = 0.9;

/// Consecutive lines needed for an aligned-text table.
const MIN_ALIGNED_ROWS: usize = 3;

/// Shared x-starts needed for an aligned-text table.
const MIN_ALIGNED_STARTS: usize = 3;

/// Share of rows an x-start must appear in to become a column boundary.
const START_SUPPORT_RATIO: f32 = 0.5;

/// Segments with at least this many words read as running text.
const PROSE_WORDS: usize = 5;

/// Page-relative distances used by the detector.
#[derive(Debug, Clone, Copy)]
struct Tolerances {
    merge: f32,
    rule: f32,
    cell_gap: f32,
    row_gap: f32,
    median_height: f32,
}

impl Tolerances {
    fn of(stats: &PageStats) -> Self {
        Self {
            merge: tolerance::cell_merge_tolerance(stats.median_size),
            rule: tolerance::rule_thickness(stats.median_size),
            cell_gap: tolerance::cell_gap_threshold(stats.median_gap, stats.median_height),
            row_gap: tolerance::row_gap_limit(stats.median_height),
            median_height: stats.median_height,
        }
    }
}

/// An axis-aligned ruling segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rule {
    horizontal: bool,
    /// y for horizontal rules, x for vertical ones
    pos: f32,
    lo: f32,
    hi: f32,
}

impl Rule {
    fn horizontal(y: f32, x0: f32, x1: f32) -> Self {
        Self {
            horizontal: true,
            pos: y,
            lo: x0,
            hi: x1,
        }
    }

    fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self {
            horizontal: false,
            pos: x,
            lo: y0,
            hi: y1,
        }
    }

    /// Crossing or touching perpendicular rules, or collinear overlapping
    /// rules.
    fn touches(&self, other: &Rule, tol: f32) -> bool {
        if self.horizontal != other.horizontal {
            return other.pos >= self.lo - tol
                && other.pos <= self.hi + tol
                && self.pos >= other.lo - tol
                && self.pos <= other.hi + tol;
        }
        (self.pos - other.pos).abs() <= tol && self.lo <= other.hi + tol && other.lo <= self.hi + tol
    }

    /// Parallel rules with matching extents, apart but at most `reach` away.
    fn stacks_on(&self, other: &Rule, tol: f32, reach: f32) -> bool {
        let distance = (self.pos - other.pos).abs();
        self.horizontal == other.horizontal
            && distance > tol
            && distance <= reach
            && (self.lo - other.lo).abs() <= tol
            && (self.hi - other.hi).abs() <= tol
    }

    /// Whether a point on the other axis lies within the rule's extent.
    fn covers(&self, along: f32, tol: f32) -> bool {
        along >= self.lo - tol && along <= self.hi + tol
    }
}

/// Median distance between the distinct positions of a component's rules of
/// one orientation.
fn rule_pitch(rules: &[Rule], members: &[usize], horizontal: bool, tol: f32) -> Option<f32> {
    let positions = cluster_positions(
        members
            .iter()
            .map(|&k| rules[k])
            .filter(|r| r.horizontal == horizontal)
            .map(|r| r.pos)
            .collect(),
        tol,
    );
    tolerance::median(positions.windows(2).map(|w| w[1] - w[0]))
}

/// Ruling segments contributed by one primitive.
fn rules_of(primitive: &DrawingPrimitive, thickness: f32) -> Vec<Rule> {
    let b = &primitive.bbox;
    let thin_h = b.height() <= thickness;
    let thin_w = b.width() <= thickness;
    match (thin_h, thin_w) {
        (true, true) => Vec::new(),
        (true, false) => vec![Rule::horizontal(b.center_y(), b.x0, b.x1)],
        (false, true) => vec![Rule::vertical(b.center_x(), b.y0, b.y1)],
        (false, false) if primitive.kind == PrimitiveKind::Rect && !primitive.is_fill_only() => vec![
            Rule::horizontal(b.y0, b.x0, b.x1),
            Rule::horizontal(b.y1, b.x0, b.x1),
            Rule::vertical(b.x0, b.y0, b.y1),
            Rule::vertical(b.x1, b.y0, b.y1),
        ],
        _ => Vec::new(),
    }
}

/// Union-find over rule indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Candidate grid boundaries before runs are assigned.
type Grid = (Vec<f32>, Vec<f32>);

/// Reconstructs table regions on a page.
#[derive(Debug, Clone)]
pub struct TableReconstructor {
    min_rows: usize,
    min_cols: usize,
}

impl TableReconstructor {
    /// Create a reconstructor accepting grids of at least 2 × 2 cells.
    pub fn new() -> Self {
        Self {
            min_rows: 2,
            min_cols: 2,
        }
    }

    /// Set the minimum number of rows.
    pub fn with_min_rows(mut self, rows: usize) -> Self {
        self.min_rows = rows;
        self
    }

    /// Set the minimum number of columns.
    pub fn with_min_cols(mut self, cols: usize) -> Self {
        self.min_cols = cols;
        self
    }

    /// Detect all table regions of an indexed page, in reading order.
    ///
    /// `columns` is the clusterer output for the same page; aligned-text
    /// tables never reach across a column boundary.
    pub fn reconstruct(&self, index: &GeometryIndex<'_>, columns: &[Column]) -> Vec<TableRegion> {
        if index.by_y().is_empty() {
            return Vec::new();
        }
        let tol = Tolerances::of(index.stats());
        let mut accepted: Vec<TableRegion> = Vec::new();
        let mut claimed: HashSet<RunId> = HashSet::new();

        // Step 1: ruled grids
        for grid in self.ruled_grids(index, &tol) {
            self.accept(index, grid, TableSource::Ruled, &mut accepted, &mut claimed);
        }

        // Step 2: zebra stripes
        for grid in self.striped_grids(index, &tol) {
            self.accept(index, grid, TableSource::Striped, &mut accepted, &mut claimed);
        }

        // Step 3: aligned text among the runs not yet claimed
        for grid in self.aligned_grids(index, columns, &tol, &claimed) {
            self.accept(index, grid, TableSource::Aligned, &mut accepted, &mut claimed);
        }

        accepted.sort_by(|a, b| reading_cmp(&a.bbox, &b.bbox));

        log::debug!(
            "TableReconstructor: page {} accepted {} tables {:?}",
            index.page().page_index,
            accepted.len(),
            accepted
                .iter()
                .map(|t| (t.source, t.row_count(), t.column_count()))
                .collect::<Vec<_>>()
        );

        accepted
    }

    /// Assign runs to a candidate grid and keep it if it qualifies.
    fn accept(
        &self,
        index: &GeometryIndex<'_>,
        (rows, cols): Grid,
        source: TableSource,
        accepted: &mut Vec<TableRegion>,
        claimed: &mut HashSet<RunId>,
    ) -> bool {
        let mut region = TableRegion::new(rows, cols, source);
        if region.row_count() < self.min_rows || region.column_count() < self.min_cols {
            return false;
        }
        if accepted
            .iter()
            .any(|r| r.bbox.intersection_area(&region.bbox) > 0.0)
        {
            log::debug!("TableReconstructor: {:?} candidate overlaps an accepted table", source);
            return false;
        }

        let runs = index.runs();
        let mut ids: Vec<RunId> = index
            .runs_centered_in(&region.bbox)
            .into_iter()
            .filter(|id| !claimed.contains(id))
            .collect();
        ids.sort_by(|&a, &b| reading_cmp(&runs[a].bbox, &runs[b].bbox).then(a.cmp(&b)));
        for id in ids {
            let (x, y) = runs[id].bbox.center();
            if let Some(cell) = region.cell_at(x, y) {
                region.assign(cell, id);
            }
        }

        if region.filled_cell_count() < 2 {
            log::debug!("TableReconstructor: {:?} candidate holds no text", source);
            return false;
        }
        if is_list_pattern(runs, &region) {
            return false;
        }

        claimed.extend(region.all_runs());
        accepted.push(region);
        true
    }

    fn ruled_grids(&self, index: &GeometryIndex<'_>, tol: &Tolerances) -> Vec<Grid> {
        let page_area = index.page().page_box().area();
        let rules: Vec<Rule> = index
            .primitives()
            .iter()
            .filter(|p| page_area <= 0.0 || p.bbox.area() < PAGE_FRAME_RATIO * page_area)
            .flat_map(|p| rules_of(p, tol.rule))
            .collect();
        if rules.len() < 2 {
            return Vec::new();
        }

        let mut set = DisjointSet::new(rules.len());
        for i in 0..rules.len() {
            for j in (i + 1)..rules.len() {
                if rules[i].touches(&rules[j], tol.merge) {
                    set.union(i, j);
                }
            }
        }

        // borderless rows: parallel rules stack onto each other where the
        // grids they belong to allow it
        let roots: Vec<usize> = (0..rules.len()).map(|i| set.find(i)).collect();
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &root) in roots.iter().enumerate() {
            members.entry(root).or_default().push(i);
        }
        let reach = 4.0 * tol.row_gap;
        let empty: Vec<usize> = Vec::new();
        for i in 0..rules.len() {
            for j in (i + 1)..rules.len() {
                if roots[i] == roots[j] || !rules[i].stacks_on(&rules[j], tol.merge, reach) {
                    continue;
                }
                let a = members.get(&roots[i]).unwrap_or(&empty);
                let b = members.get(&roots[j]).unwrap_or(&empty);
                let pair = (&rules[i], &rules[j]);
                if may_stack(index, &rules, (a.as_slice(), b.as_slice()), pair, tol) {
                    set.union(i, j);
                }
            }
        }

        let mut components: BTreeMap<usize, Vec<Rule>> = BTreeMap::new();
        for (i, rule) in rules.iter().enumerate() {
            components.entry(set.find(i)).or_default().push(*rule);
        }

        let mut grids = Vec::new();
        for members in components.into_values() {
            let (horizontal, vertical): (Vec<Rule>, Vec<Rule>) =
                members.into_iter().partition(|r| r.horizontal);
            if horizontal.len() < 2 {
                continue;
            }
            let x0 = horizontal
                .iter()
                .map(|r| r.lo)
                .chain(vertical.iter().map(|r| r.pos))
                .fold(f32::INFINITY, f32::min);
            let x1 = horizontal
                .iter()
                .map(|r| r.hi)
                .chain(vertical.iter().map(|r| r.pos))
                .fold(f32::NEG_INFINITY, f32::max);
            let y0 = horizontal
                .iter()
                .map(|r| r.pos)
                .chain(vertical.iter().map(|r| r.lo))
                .fold(f32::INFINITY, f32::min);
            let y1 = horizontal
                .iter()
                .map(|r| r.pos)
                .chain(vertical.iter().map(|r| r.hi))
                .fold(f32::NEG_INFINITY, f32::max);

            let rows = cluster_positions(
                horizontal.iter().map(|r| r.pos).chain([y0, y1]).collect(),
                tol.merge,
            );
            let mut cols = cluster_positions(
                vertical.iter().map(|r| r.pos).chain([x0, x1]).collect(),
                tol.merge,
            );
            if cols.len() <= 2 {
                // no interior vertical rules
                cols = text_columns(index, &BBox::new(x0, y0, x1, y1), tol);
            }
            grids.push((rows, cols));
        }
        grids
    }

    fn striped_grids(&self, index: &GeometryIndex<'_>, tol: &Tolerances) -> Vec<Grid> {
        let page_area = index.page().page_box().area();
        let mut fills: Vec<BBox> = index
            .primitives()
            .iter()
            .filter(|p| {
                p.is_fill_only()
                    && p.fill_color.is_some_and(|c| !c.is_near_white())
                    && p.bbox.height() > tol.rule
                    && (page_area <= 0.0 || p.bbox.area() < PAGE_FRAME_RATIO * page_area)
            })
            .map(|p| p.bbox)
            .collect();
        fills.sort_by(reading_cmp);

        // stripes of one table share their x-range
        let mut groups: Vec<Vec<BBox>> = Vec::new();
        for fill in fills {
            match groups.iter_mut().find(|g| {
                (g[0].x0 - fill.x0).abs() <= tol.merge && (g[0].x1 - fill.x1).abs() <= tol.merge
            }) {
                Some(group) => group.push(fill),
                None => groups.push(vec![fill]),
            }
        }

        let mut grids = Vec::new();
        for group in groups.into_iter().filter(|g| g.len() >= 2) {
            // split where stripes are too far apart to belong to one table
            let mut runs_of_stripes: Vec<Vec<BBox>> = Vec::new();
            for stripe in group {
                match runs_of_stripes.last_mut() {
                    Some(current)
                        if current.last().is_some_and(|prev| {
                            stripe.y0 - prev.y1 <= 2.0 * prev.height().max(stripe.height()) + tol.merge
                        }) =>
                    {
                        current.push(stripe)
                    }
                    _ => runs_of_stripes.push(vec![stripe]),
                }
            }

            for stripes in runs_of_stripes.into_iter().filter(|s| s.len() >= 2) {
                let (x0, x1) = (stripes[0].x0, stripes[0].x1);
                let mut rows: Vec<f32> = stripes.iter().flat_map(|s| [s.y0, s.y1]).collect();
                let gap = tolerance::median(stripes.windows(2).map(|w| w[1].y0 - w[0].y1)).unwrap_or(0.0);
                let mut bottom = stripes.last().map_or(0.0, |s| s.y1);
                if gap > tol.merge {
                    // trailing unshaded row
                    let band = BBox::new(x0, bottom, x1, bottom + gap);
                    if !index.runs_centered_in(&band).is_empty() {
                        bottom += gap;
                        rows.push(bottom);
                    }
                }
                let bbox = BBox::new(x0, stripes[0].y0, x1, bottom);
                grids.push((cluster_positions(rows, tol.merge), text_columns(index, &bbox, tol)));
            }
        }
        grids
    }

    fn aligned_grids(
        &self,
        index: &GeometryIndex<'_>,
        columns: &[Column],
        tol: &Tolerances,
        claimed: &HashSet<RunId>,
    ) -> Vec<Grid> {
        let runs = index.runs();
        let mut grids = Vec::new();
        for scope in aligned_scopes(runs, columns, tol.cell_gap) {
            let ids: Vec<RunId> = scope.into_iter().filter(|id| !claimed.contains(id)).collect();
            let lines = group_lines(runs, &ids, tol.median_height);
            grids.extend(self.aligned_in(runs, &lines, tol));
        }
        grids
    }

    /// Blocks of consecutive lines sharing enough x-starts. Regions span
    /// only the given lines.
    fn aligned_in(&self, runs: &[TextRun], lines: &[Line], tol: &Tolerances) -> Vec<Grid> {
        let starts: Vec<Vec<f32>> = lines
            .iter()
            .map(|l| segment_starts(runs, l, tol.cell_gap))
            .collect();

        let need = MIN_ALIGNED_STARTS.max(self.min_cols);
        let min_rows = MIN_ALIGNED_ROWS.max(self.min_rows);
        let mut grids = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if starts[i].len() < need {
                i += 1;
                continue;
            }
            let mut shared = starts[i].clone();
            let mut j = i + 1;
            while j < lines.len() {
                if lines[j].bbox.y0 - lines[j - 1].bbox.y1 > tol.row_gap {
                    break;
                }
                let next = shared_with(&shared, &starts[j], tol.merge);
                if next.len() < need {
                    break;
                }
                shared = next;
                j += 1;
            }

            let block = &lines[i..j];
            if block.len() < min_rows || looks_like_prose(runs, block, tol.cell_gap) {
                i += 1;
                continue;
            }

            let x0 = block.iter().map(|l| l.bbox.x0).fold(f32::INFINITY, f32::min);
            let x1 = block.iter().map(|l| l.bbox.x1).fold(f32::NEG_INFINITY, f32::max);
            let mut rows = vec![block[0].bbox.y0];
            rows.extend(block.windows(2).map(|w| (w[0].bbox.y1 + w[1].bbox.y0) / 2.0));
            rows.push(block[block.len() - 1].bbox.y1);
            grids.push((rows, boundaries_from_starts(&shared, x0, x1, tol.merge)));
            i = j;
        }
        grids
    }
}

/// Whether two stacked rules of different components may join.
///
/// Components without perpendicular rules always may. Otherwise the gap
/// must not exceed the row pitch of any ruled side, and every text line in
/// the gap must be reached by one of their perpendicular rules.
fn may_stack(
    index: &GeometryIndex<'_>,
    rules: &[Rule],
    (a, b): (&[usize], &[usize]),
    (first, second): (&Rule, &Rule),
    tol: &Tolerances,
) -> bool {
    let axis = first.horizontal;
    let crossing: Vec<&Rule> = a
        .iter()
        .chain(b)
        .map(|&k| &rules[k])
        .filter(|r| r.horizontal != axis)
        .collect();
    if crossing.is_empty() {
        return true;
    }

    let gap = (first.pos - second.pos).abs();
    for side in [a, b] {
        if side.iter().all(|&k| rules[k].horizontal == axis) {
            continue;
        }
        match rule_pitch(rules, side, axis, tol.merge) {
            Some(pitch) if gap <= pitch + tol.merge => {}
            _ => return false,
        }
    }

    let (near, far) = (first.pos.min(second.pos), first.pos.max(second.pos));
    let (lo, hi) = (first.lo.min(second.lo), first.hi.max(second.hi));
    let band = if axis {
        BBox::new(lo, near, hi, far)
    } else {
        BBox::new(near, lo, far, hi)
    };
    let runs = index.runs();
    index.runs_centered_in(&band).into_iter().all(|id| {
        let (x, y) = runs[id].bbox.center();
        let along = if axis { y } else { x };
        crossing.iter().any(|r| r.covers(along, tol.merge))
    })
}

/// Run sets searched for aligned text, one per column. Neighbouring
/// columns of a section that hold short cells are searched together,
/// since the clusterer splits a table's own columns apart.
fn aligned_scopes(runs: &[TextRun], columns: &[Column], cell_gap: f32) -> Vec<Vec<RunId>> {
    let mut scopes: Vec<Vec<RunId>> = Vec::new();
    let mut joinable = false;
    for column in columns {
        let cells = !column.full_width && !looks_like_prose(runs, &column.lines, cell_gap);
        match scopes.last_mut() {
            Some(scope) if joinable && cells => scope.extend(column.run_ids()),
            _ => scopes.push(column.run_ids().collect()),
        }
        joinable = cells;
    }
    scopes
}

impl Default for TableReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Cluster sorted positions closer than `tol`; each cluster becomes its mean.
fn cluster_positions(mut values: Vec<f32>, tol: f32) -> Vec<f32> {
    values.retain(|v| v.is_finite());
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut clusters: Vec<Vec<f32>> = Vec::new();
    for v in values {
        match clusters.last_mut() {
            Some(c) if c.last().is_some_and(|last| v - last <= tol) => c.push(v),
            _ => clusters.push(vec![v]),
        }
    }
    clusters
        .iter()
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect()
}

/// Runs of a line grouped into cells at gaps wider than `cell_gap`.
fn segments(runs: &[TextRun], line: &Line, cell_gap: f32) -> Vec<Vec<RunId>> {
    let mut segments: Vec<Vec<RunId>> = Vec::new();
    let mut right_edge = f32::NEG_INFINITY;
    for &id in &line.runs {
        let bbox = &runs[id].bbox;
        match segments.last_mut() {
            Some(current) if bbox.x0 - right_edge <= cell_gap => current.push(id),
            _ => segments.push(vec![id]),
        }
        right_edge = right_edge.max(bbox.x1);
    }
    segments
}

fn segment_starts(runs: &[TextRun], line: &Line, cell_gap: f32) -> Vec<f32> {
    segments(runs, line, cell_gap)
        .iter()
        .filter_map(|s| s.first().map(|&id| runs[id].bbox.x0))
        .collect()
}

/// Starts of `current` that have a counterpart in `next`.
fn shared_with(current: &[f32], next: &[f32], tol: f32) -> Vec<f32> {
    current
        .iter()
        .copied()
        .filter(|s| next.iter().any(|n| (n - s).abs() <= tol))
        .collect()
}

/// X-starts supported by enough lines of a region, ascending.
fn shared_starts(runs: &[TextRun], lines: &[Line], tol: &Tolerances) -> Vec<f32> {
    let min_support = ((lines.len() as f32 * START_SUPPORT_RATIO).ceil() as usize).max(2);
    let mut starts: Vec<(f32, usize)> = lines
        .iter()
        .enumerate()
        .flat_map(|(row, line)| {
            segment_starts(runs, line, tol.cell_gap)
                .into_iter()
                .map(move |x| (x, row))
        })
        .collect();
    starts.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<Vec<(f32, usize)>> = Vec::new();
    for start in starts {
        match clusters.last_mut() {
            Some(c) if c.last().is_some_and(|last| start.0 - last.0 <= tol.merge) => c.push(start),
            _ => clusters.push(vec![start]),
        }
    }
    clusters
        .into_iter()
        .filter(|c| c.iter().map(|s| s.1).collect::<HashSet<_>>().len() >= min_support)
        .map(|c| c[0].0)
        .collect()
}

/// Column boundaries for the text inside a region.
fn text_columns(index: &GeometryIndex<'_>, bbox: &BBox, tol: &Tolerances) -> Vec<f32> {
    let runs = index.runs();
    let ids = index.runs_centered_in(bbox);
    let lines = group_lines(runs, &ids, tol.median_height);
    let starts = shared_starts(runs, &lines, tol);
    boundaries_from_starts(&starts, bbox.x0, bbox.x1, tol.merge)
}

/// Region edges plus a boundary just left of every start but the first.
fn boundaries_from_starts(starts: &[f32], x0: f32, x1: f32, tol: f32) -> Vec<f32> {
    let mut bounds = vec![x0];
    bounds.extend(
        starts
            .iter()
            .skip(1)
            .map(|s| s - tol)
            .filter(|&edge| edge > x0 + tol && edge < x1 - tol),
    );
    bounds.push(x1);
    bounds
}

/// Lines whose cells are mostly multi-word phrases are wrapped text columns.
fn looks_like_prose(runs: &[TextRun], lines: &[Line], cell_gap: f32) -> bool {
    let (mut total, mut wordy) = (0usize, 0usize);
    for line in lines {
        for segment in segments(runs, line, cell_gap) {
            total += 1;
            let text = line_text(segment.iter().map(|&id| &runs[id]));
            if text.split_whitespace().count() >= PROSE_WORDS {
                wordy += 1;
            }
        }
    }
    total > 0 && wordy * 4 >= total * 3
}

/// Whether the leftmost cell of most rows is a list marker.
///
/// Bullets never start table rows; numbered markers are only rejected for
/// two-column grids, since real tables often number their rows.
fn is_list_pattern(runs: &[TextRun], region: &TableRegion) -> bool {
    let rows = region.row_count();
    let cols = region.column_count();
    if cols < 2 || rows == 0 {
        return false;
    }

    let mut bullet_count = 0;
    let mut number_count = 0;
    for row in 0..rows {
        let first = (0..cols)
            .flat_map(|col| region.runs_in((row, col)).iter().copied())
            .min_by(|&a, &b| {
                runs[a]
                    .bbox
                    .x0
                    .partial_cmp(&runs[b].bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some(id) = first {
            let text = runs[id].text.trim();
            if is_bullet_marker(text) {
                bullet_count += 1;
            } else if is_number_marker(text) {
                number_count += 1;
            }
        }
    }

    let bullet_ratio = bullet_count as f32 / rows as f32;
    let total_ratio = (bullet_count + number_count) as f32 / rows as f32;
    log::debug!(
        "TableReconstructor: list markers bullets={}, numbers={}, rows={}",
        bullet_count,
        number_count,
        rows
    );

    bullet_ratio >= 0.5 || (cols == 2 && total_ratio >= 0.5)
}

/// Bullet-style list marker.
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※" | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Number-style list marker: `1.`, `12)`, `3`, `a.`, `B)`.
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (prefix, suffix) = cleaned.split_at(pos);
        if !prefix.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }
    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}
