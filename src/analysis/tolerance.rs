//! Page-relative thresholds.
//!
//! Every distance the analysis stages compare against is derived here from
//! page statistics rather than hard-coded in points. Two thresholds keep an
//! absolute floor: [`cell_merge_tolerance`] never drops below 1pt and
//! [`rule_thickness`] never below 3pt. Above those floors a scaled copy of a
//! document clusters identically.

use crate::model::BBox;

/// Run height assumed when a page has no measurable text.
pub const FALLBACK_HEIGHT: f32 = 10.0;

/// Cap height as a fraction of the nominal font size.
pub const CAP_HEIGHT_RATIO: f32 = 0.7;

/// Minimum vertical overlap, as a fraction of the shorter run, for two runs
/// to share a line.
pub const LINE_OVERLAP_RATIO: f32 = 0.5;

/// Median of a set of values. `None` for an empty set; NaNs are ignored.
pub fn median(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let mut values: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Maximum distance between vertical centers of two runs on the same line.
pub fn baseline_tolerance(median_height: f32) -> f32 {
    0.3 * median_height
}

/// Whether two boxes sit on the same text line.
///
/// They must overlap vertically by at least half of the shorter box, or have
/// centers within the baseline tolerance.
pub fn same_line(a: &BBox, b: &BBox, median_height: f32) -> bool {
    let shorter = a.height().min(b.height());
    if shorter > 0.0 && a.vertical_overlap(b) >= LINE_OVERLAP_RATIO * shorter {
        return true;
    }
    (a.center_y() - b.center_y()).abs() <= baseline_tolerance(median_height)
}

/// Smallest empty x-interval that separates two columns.
///
/// Inter-word gaps are a fraction of the median gap scale and line height;
/// a gutter is several of them. `factor` scales the result (1.0 = default).
pub fn column_gap_threshold(median_gap: f32, median_height: f32, factor: f32) -> f32 {
    factor * (3.0 * median_gap).max(1.5 * median_height)
}

/// Gap between adjacent runs on a line that separates two table cells.
pub fn cell_gap_threshold(median_gap: f32, median_height: f32) -> f32 {
    (2.0 * median_gap).max(0.8 * median_height)
}

/// Distance within which grid boundaries and x-starts are considered equal.
pub fn cell_merge_tolerance(median_size: f32) -> f32 {
    (0.3 * CAP_HEIGHT_RATIO * median_size).max(1.0)
}

/// Vertical whitespace between two lines that starts a new paragraph.
pub fn paragraph_gap_threshold(median_height: f32) -> f32 {
    0.6 * median_height
}

/// Positive indentation of a line that starts a new paragraph.
pub fn indent_threshold(median_height: f32) -> f32 {
    1.5 * median_height
}

/// Difference in column left/right edges still considered the same column
/// when continuing a paragraph onto the next page.
pub fn continuation_tolerance(median_height: f32) -> f32 {
    1.5 * median_height
}

/// Maximum thickness of a rectangle that acts as a ruling line.
pub fn rule_thickness(median_size: f32) -> f32 {
    (0.3 * median_size).max(3.0)
}

/// Largest vertical gap allowed between consecutive rows of an aligned table.
pub fn row_gap_limit(median_height: f32) -> f32 {
    2.5 * median_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(Vec::new()), None);
        assert_eq!(median([3.0]), Some(3.0));
        assert_eq!(median([5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median([f32::NAN, 2.0]), Some(2.0));
    }

    #[test]
    fn test_same_line_by_overlap() {
        let a = BBox::new(0.0, 100.0, 50.0, 112.0);
        let b = BBox::new(60.0, 104.0, 90.0, 116.0);
        assert!(same_line(&a, &b, 12.0));

        let below = BBox::new(0.0, 114.0, 50.0, 126.0);
        assert!(!same_line(&a, &below, 12.0));
    }

    #[test]
    fn test_same_line_by_baseline() {
        // superscript-sized run whose center is close to the line center
        let a = BBox::new(0.0, 100.0, 50.0, 112.0);
        let sup = BBox::new(50.0, 103.0, 55.0, 108.0);
        assert!(same_line(&a, &sup, 12.0));
    }

    #[test]
    fn test_column_gap_threshold_scenario() {
        // 40pt gutter between columns of 12pt text with ordinary word spacing
        let threshold = column_gap_threshold(3.0, 12.0, 1.0);
        assert!(threshold < 40.0);
        assert!(threshold > 3.0 * 3.0 - f32::EPSILON);
        assert_eq!(column_gap_threshold(3.0, 12.0, 2.0), 2.0 * threshold);
    }

    #[test]
    fn test_tolerances_scale_with_page() {
        let small = cell_merge_tolerance(10.0);
        let large = cell_merge_tolerance(20.0);
        assert!((large - 2.0 * small).abs() < 1e-4);
        assert_eq!(cell_merge_tolerance(1.0), 1.0);
        assert!(paragraph_gap_threshold(12.0) < 12.0);
        assert!(indent_threshold(10.0) > paragraph_gap_threshold(10.0));
        assert_eq!(rule_thickness(5.0), 3.0);
        assert!(cell_gap_threshold(1.0, 10.0) >= 8.0);
        assert_eq!(continuation_tolerance(10.0), 15.0);
        assert_eq!(row_gap_limit(10.0), 25.0);
        assert!((baseline_tolerance(10.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_absolute_floors() {
        assert_eq!(cell_merge_tolerance(2.0), 1.0);
        assert_eq!(rule_thickness(4.0), rule_thickness(8.0));
        // above the floor the rule thickness follows the text size
        assert!((rule_thickness(40.0) - 2.0 * rule_thickness(20.0)).abs() < 1e-4);
    }
}
