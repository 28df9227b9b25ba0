//! Input boundary: where page geometry comes from.
//!
//! Parsing PDF bytes is left to whichever PDF library the caller already
//! uses. That library only has to implement [`GeometrySource`], or dump its
//! output into the JSON schema read by [`GeometryDocument`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Metadata, PageGeometry};

/// Supplies per-page geometry to the pipeline.
///
/// Implementations are shared across worker threads, so `page` must be
/// callable concurrently.
pub trait GeometrySource: Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Geometry of one page (zero-based).
    ///
    /// An `Err` only affects this page: the pipeline substitutes an empty
    /// page and records the failure.
    fn page(&self, index: usize) -> Result<PageGeometry>;

    /// Document metadata.
    fn metadata(&self) -> Metadata {
        Metadata::default()
    }
}

/// In-memory geometry for a whole document, serializable as JSON.
///
/// ```json
/// {
///   "metadata": { "title": "Report" },
///   "pages": [
///     { "page_index": 0, "width": 612, "height": 792,
///       "runs": [ { "text": "Hello", "font_id": "Helvetica", "size": 10,
///                   "bbox": { "x0": 72, "y0": 72, "x1": 98, "y1": 82 } } ],
///       "primitives": [] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryDocument {
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<PageGeometry>,
}

impl GeometryDocument {
    /// Create a document from pages.
    pub fn new(pages: Vec<PageGeometry>) -> Self {
        Self {
            metadata: Metadata::default(),
            pages,
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Parse a JSON geometry dump.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON geometry dump from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a JSON geometry dump from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Serialize back to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl GeometrySource for GeometryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        let page = self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))?;
        if page.page_index != index {
            return Err(Error::geometry(
                index,
                format!("page declares index {}", page.page_index),
            ));
        }
        page.clone().normalized()
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        metadata.page_count = self.pages.len();
        metadata
    }
}

impl GeometrySource for [PageGeometry] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        let page = self
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.len()))?;
        page.clone().normalized()
    }
}

impl GeometrySource for Vec<PageGeometry> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        self.as_slice().page(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Origin, TextRun};
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "metadata": { "title": "Sample" },
        "pages": [
            { "page_index": 0, "width": 612, "height": 792, "origin": "bottom_left",
              "runs": [ { "text": "Hello", "font_id": "Helvetica-Bold", "size": 10,
                          "bbox": { "x0": 72, "y0": 700, "x1": 98, "y1": 710 } } ] }
        ]
    }"#;

    #[test]
    fn test_from_json_normalizes_pages() {
        let doc = GeometryDocument::from_json(SAMPLE).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.metadata().title.as_deref(), Some("Sample"));
        assert_eq!(doc.metadata().page_count, 1);

        let page = doc.page(0).unwrap();
        assert_eq!(page.origin, Origin::TopLeft);
        assert_eq!(page.runs[0].bbox, BBox::new(72.0, 82.0, 98.0, 92.0));
        // style defaults when omitted from the dump
        assert!(!page.runs[0].style.bold);
    }

    #[test]
    fn test_out_of_range_page() {
        let doc = GeometryDocument::new(vec![PageGeometry::letter(0)]);
        assert!(matches!(doc.page(3), Err(Error::PageOutOfRange(3, 1))));
    }

    #[test]
    fn test_mismatched_page_index_is_geometry_error() {
        let doc = GeometryDocument::new(vec![PageGeometry::letter(5)]);
        assert!(matches!(doc.page(0), Err(Error::Geometry { page: 0, .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            GeometryDocument::from_json("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let doc = GeometryDocument::from_path(file.path()).unwrap();
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn test_vec_source() {
        let pages = vec![PageGeometry::letter(0).with_run(TextRun::new(
            "x",
            BBox::new(0.0, 0.0, 5.0, 10.0),
            "F1",
            10.0,
        ))];
        assert_eq!(pages.page_count(), 1);
        assert_eq!(pages.page(0).unwrap().runs.len(), 1);
    }
}
