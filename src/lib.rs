//! # pagemark
//!
//! Layout-aware conversion of PDF page geometry into structured Markdown.
//!
//! A PDF library supplies positioned text runs and vector drawing primitives
//! per page. pagemark recovers the document's structure from geometry and
//! typography alone: columns and reading order, a title/heading/body/caption
//! hierarchy from font signatures, and tables from ruling lines, shaded
//! stripes or aligned text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagemark::{convert_file, render};
//!
//! fn main() -> pagemark::Result<()> {
//!     // Geometry dumped as JSON by any PDF library
//!     let doc = convert_file("report.geometry.json")?;
//!
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`analysis::index`]: per-page spatial index and statistics
//! - [`analysis::typography`]: document-wide font roles
//! - [`analysis::cluster`]: columns and lines in reading order
//! - [`analysis::table`]: table regions
//! - [`assemble`]: heading, paragraph, table and caption blocks
//! - [`pipeline`]: parallel scheduling, cancellation and progress
//! - [`render`]: Markdown, plain text and JSON

pub mod analysis;
pub mod assemble;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    BBox, Block, BlockKind, Document, DrawingPrimitive, FontRole, FontStyle, InlineText, Metadata,
    PageGeometry, PageReport, PageStatus, Table, TableRegion, TextRun,
};
pub use pipeline::{CancellationToken, ConversionEvent, ConvertOptions, Converter, PageSelection};
pub use render::{CleanupOptions, CleanupPreset, HeadingStyle, JsonFormat, RenderOptions};
pub use source::{GeometryDocument, GeometrySource};

use std::path::Path;

/// Convert a geometry source with default options.
///
/// # Example
///
/// ```
/// use pagemark::{convert, BBox, PageGeometry, TextRun};
///
/// let mut page = PageGeometry::letter(0);
/// page.push_run(TextRun::new("Hello", BBox::new(72.0, 72.0, 97.0, 82.0), "Helvetica", 10.0));
/// let doc = convert(&vec![page]).unwrap();
/// assert_eq!(doc.plain_text(), "Hello");
/// ```
pub fn convert<S: GeometrySource + ?Sized>(source: &S) -> Result<Document> {
    Converter::new(ConvertOptions::default()).convert(source)
}

/// Convert a geometry source with custom options.
pub fn convert_with_options<S: GeometrySource + ?Sized>(
    source: &S,
    options: ConvertOptions,
) -> Result<Document> {
    Converter::new(options).convert(source)
}

/// Convert a geometry JSON file.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let source = GeometryDocument::from_path(path)?;
    convert(&source)
}

/// Convert a geometry source straight to Markdown.
///
/// # Example
///
/// ```no_run
/// use pagemark::{convert_to_markdown, GeometryDocument, ConvertOptions, RenderOptions};
///
/// let source = GeometryDocument::from_path("report.geometry.json")?;
/// let markdown = convert_to_markdown(
///     &source,
///     ConvertOptions::new().with_heading_level_cap(3),
///     &RenderOptions::new().with_frontmatter(true),
/// )?;
/// # Ok::<(), pagemark::Error>(())
/// ```
pub fn convert_to_markdown<S: GeometrySource + ?Sized>(
    source: &S,
    options: ConvertOptions,
    render_options: &RenderOptions,
) -> Result<String> {
    let doc = Converter::new(options).convert(source)?;
    render::to_markdown(&doc, render_options)
}

/// Run the analysis and return the structure without rendering: blocks,
/// font role assignments and per-page reports with pass-1 blocks.
pub fn analyze_structure<S: GeometrySource + ?Sized>(source: &S) -> Result<Document> {
    Converter::new(ConvertOptions::new().with_first_pass(true)).convert(source)
}

/// Builder for converting geometry and rendering the result.
///
/// # Example
///
/// ```no_run
/// use pagemark::{Pagemark, CleanupPreset};
///
/// let markdown = Pagemark::new()
///     .with_frontmatter()
///     .with_cleanup(CleanupPreset::Standard)
///     .sequential()
///     .convert_file("report.geometry.json")?
///     .to_markdown()?;
/// # Ok::<(), pagemark::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagemark {
    convert_options: ConvertOptions,
    render_options: RenderOptions,
}

impl Pagemark {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.convert_options = options;
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.convert_options = self.convert_options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.convert_options = self.convert_options.with_pages(pages);
        self
    }

    /// Disable table reconstruction.
    pub fn without_tables(mut self) -> Self {
        self.convert_options = self.convert_options.with_tables(false);
        self
    }

    /// Enable frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Convert a geometry source.
    pub fn convert<S: GeometrySource + ?Sized>(self, source: &S) -> Result<PagemarkResult> {
        let document = Converter::new(self.convert_options).convert(source)?;
        Ok(PagemarkResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Convert a geometry JSON file.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> Result<PagemarkResult> {
        let source = GeometryDocument::from_path(path)?;
        self.convert(&source)
    }
}

/// A converted document together with the render options to use.
#[derive(Debug, Clone)]
pub struct PagemarkResult {
    /// The converted document
    pub document: Document,
    render_options: RenderOptions,
}

impl PagemarkResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
