//! Rendering of assembled documents to Markdown, plain text and JSON.

mod cleanup;
mod json;
mod markdown;
mod options;
mod result;
mod text;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::{HeadingStyle, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
pub use text::to_text;
