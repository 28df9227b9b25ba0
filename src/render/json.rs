//! JSON export of the block sequence.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document, blocks and page reports included, to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, BlockKind, FontRole, Metadata, PageReport, PageStatus};

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.metadata = Metadata::with_title("Test");
        doc.blocks.push(Block {
            kind: BlockKind::Caption {
                text: "Figure 1".into(),
            },
            page_index: 0,
            bbox: BBox::new(72.0, 500.0, 200.0, 508.0),
            role: FontRole::Caption,
            line_height: 8.0,
            lines: vec![vec![4]],
            continued: Vec::new(),
        });
        doc.pages.push(PageReport::with_status(0, PageStatus::Analyzed));
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Test\""));
        assert!(json.contains("\"type\": \"caption\""));
        assert!(json.contains("\"status\": \"analyzed\""));
    }

    #[test]
    fn test_to_json_compact_round_trips() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.blocks, sample().blocks);
    }
}
