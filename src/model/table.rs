//! Table types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BBox, RunId};

/// `(row, column)` position of a cell.
pub type CellIndex = (usize, usize);

/// Which layout signal produced a table region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Rectangle and line rules forming a grid
    Ruled,
    /// Repeated background fills (zebra stripes, header bands)
    Striped,
    /// Text aligned on shared x-starts across consecutive lines
    Aligned,
}

/// A rectangular page area reconstructed as a grid of cells.
///
/// `rows` and `cols` are strictly increasing boundary coordinates, so a
/// region with `n` rows stores `n + 1` row boundaries. Every run in
/// `cells` has its bounding-box center inside exactly that cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    /// Area covered by the grid
    pub bbox: BBox,
    /// Row boundaries (top to bottom)
    pub rows: Vec<f32>,
    /// Column boundaries (left to right)
    pub cols: Vec<f32>,
    /// Runs per cell, in reading order
    #[serde(with = "cell_map")]
    pub cells: BTreeMap<CellIndex, Vec<RunId>>,
    /// Signal that produced the grid
    pub source: TableSource,
}

impl TableRegion {
    /// Create a region without any assigned runs.
    ///
    /// Boundaries are sorted and values closer than `f32::EPSILON` are
    /// collapsed, so the result always satisfies the increasing-boundary
    /// invariant.
    pub fn new(mut rows: Vec<f32>, mut cols: Vec<f32>, source: TableSource) -> Self {
        strictly_increasing(&mut rows);
        strictly_increasing(&mut cols);
        let bbox = match (rows.first(), rows.last(), cols.first(), cols.last()) {
            (Some(&top), Some(&bottom), Some(&left), Some(&right)) => {
                BBox::new(left, top, right, bottom)
            }
            _ => BBox::new(0.0, 0.0, 0.0, 0.0),
        };
        Self {
            bbox,
            rows,
            cols,
            cells: BTreeMap::new(),
            source,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.cols.len().saturating_sub(1)
    }

    /// The cell containing a point, using half-open `[lo, hi)` intervals
    /// except for the last row and column, which include their far edge.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<CellIndex> {
        Some((interval_of(&self.rows, y)?, interval_of(&self.cols, x)?))
    }

    /// Bounding box of a single cell.
    pub fn cell_bbox(&self, (row, col): CellIndex) -> Option<BBox> {
        let top = *self.rows.get(row)?;
        let bottom = *self.rows.get(row + 1)?;
        let left = *self.cols.get(col)?;
        let right = *self.cols.get(col + 1)?;
        Some(BBox::new(left, top, right, bottom))
    }

    /// Record a run as belonging to a cell.
    pub fn assign(&mut self, cell: CellIndex, run: RunId) {
        self.cells.entry(cell).or_default().push(run);
    }

    /// Runs assigned to a cell.
    pub fn runs_in(&self, cell: CellIndex) -> &[RunId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Row of the cell a run was assigned to.
    pub fn row_of(&self, run: RunId) -> Option<usize> {
        self.cells
            .iter()
            .find(|(_, runs)| runs.contains(&run))
            .map(|(&(row, _), _)| row)
    }

    /// All assigned runs.
    pub fn all_runs(&self) -> impl Iterator<Item = RunId> + '_ {
        self.cells.values().flatten().copied()
    }

    /// Number of cells holding at least one run.
    pub fn filled_cell_count(&self) -> usize {
        self.cells.values().filter(|runs| !runs.is_empty()).count()
    }
}

fn strictly_increasing(values: &mut Vec<f32>) {
    values.retain(|v| v.is_finite());
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup_by(|b, a| (*b - *a).abs() <= f32::EPSILON);
}

fn interval_of(bounds: &[f32], v: f32) -> Option<usize> {
    if bounds.len() < 2 {
        return None;
    }
    let last = bounds.len() - 1;
    if v < bounds[0] || v > bounds[last] {
        return None;
    }
    // first boundary strictly greater than v
    let upper = bounds.partition_point(|&b| b <= v);
    Some(upper.saturating_sub(1).min(last - 1))
}

/// Tuple keys are not valid JSON object keys; serialize the map as a list.
mod cell_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{CellIndex, RunId};

    #[derive(Serialize, Deserialize)]
    struct Entry {
        row: usize,
        col: usize,
        runs: Vec<RunId>,
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<CellIndex, Vec<RunId>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = map
            .iter()
            .map(|(&(row, col), runs)| Entry {
                row,
                col,
                runs: runs.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<CellIndex, Vec<RunId>>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.row, e.col), e.runs))
            .collect())
    }
}

/// A reconstructed table ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Grid geometry and run assignment
    pub region: TableRegion,
    /// Cell text, `rows[row][col]`
    pub rows: Vec<Vec<String>>,
    /// Number of header rows (0 = no header)
    pub header_rows: usize,
}

impl Table {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain text, one tab-separated line per row.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_new_sorts_boundaries() {
        let region = TableRegion::new(
            vec![30.0, 10.0, 20.0, 20.0],
            vec![100.0, 0.0, 50.0],
            TableSource::Ruled,
        );
        assert_eq!(region.rows, vec![10.0, 20.0, 30.0]);
        assert_eq!(region.cols, vec![0.0, 50.0, 100.0]);
        assert_eq!(region.row_count(), 2);
        assert_eq!(region.column_count(), 2);
        assert_eq!(region.bbox, BBox::new(0.0, 10.0, 100.0, 30.0));
    }

    #[test]
    fn test_cell_at_half_open() {
        let region = TableRegion::new(vec![0.0, 10.0, 20.0], vec![0.0, 50.0, 100.0], TableSource::Ruled);
        assert_eq!(region.cell_at(25.0, 5.0), Some((0, 0)));
        assert_eq!(region.cell_at(50.0, 10.0), Some((1, 1)));
        assert_eq!(region.cell_at(100.0, 20.0), Some((1, 1)));
        assert_eq!(region.cell_at(101.0, 5.0), None);
        assert_eq!(region.cell_at(10.0, -1.0), None);
    }

    #[test]
    fn test_cell_bbox() {
        let region = TableRegion::new(vec![0.0, 10.0, 20.0], vec![0.0, 50.0, 100.0], TableSource::Aligned);
        assert_eq!(region.cell_bbox((1, 0)), Some(BBox::new(0.0, 10.0, 50.0, 20.0)));
        assert_eq!(region.cell_bbox((2, 0)), None);
    }

    #[test]
    fn test_region_json_round_trip() {
        let mut region = TableRegion::new(vec![0.0, 10.0, 20.0], vec![0.0, 50.0, 100.0], TableSource::Striped);
        region.assign((0, 1), 4);
        region.assign((1, 0), 7);
        let json = serde_json::to_string(&region).unwrap();
        let back: TableRegion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, region);
    }

    #[test]
    fn test_table_plain_text() {
        let region = TableRegion::new(vec![0.0, 10.0, 20.0], vec![0.0, 50.0, 100.0], TableSource::Ruled);
        let table = Table {
            region,
            rows: vec![
                vec!["Name".into(), "Age".into()],
                vec!["Alice".into(), "30".into()],
            ],
            header_rows: 1,
        };
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30");
        assert_eq!(table.column_count(), 2);
    }
}
