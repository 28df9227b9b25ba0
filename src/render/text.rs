//! Plain text rendering.

use crate::error::Result;
use crate::model::Document;

use super::{CleanupPipeline, RenderOptions};

/// Convert a document to plain text: blocks separated by blank lines,
/// table rows as tab-separated lines.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut output = doc.plain_text();

    if let Some(ref cleanup_options) = options.cleanup {
        output = CleanupPipeline::new(cleanup_options.clone())?.process(&output);
    }

    Ok(output.trim().to_string())
}
