//! Page geometry: positioned text runs and vector drawing primitives.

use serde::{Deserialize, Serialize};

use super::{BBox, Color};
use crate::error::{Error, Result};

/// Page-local index of a [`TextRun`].
pub type RunId = usize;

/// Typographic style flags of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FontStyle {
    /// Bold, black or heavy weight
    pub bold: bool,
    /// Italic or oblique
    pub italic: bool,
    /// Condensed or narrow width
    pub condensed: bool,
}

impl FontStyle {
    /// Infer style flags from a font name such as `"Helvetica-BoldOblique"`.
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self {
            bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
            italic: lower.contains("italic") || lower.contains("oblique"),
            condensed: lower.contains("condensed") || lower.contains("narrow"),
        }
    }
}

/// A positioned fragment of text sharing one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Bounding box on the page
    pub bbox: BBox,
    /// Font identifier (usually the PostScript name)
    pub font_id: String,
    /// Font size in points
    pub size: f32,
    /// Style flags
    #[serde(default)]
    pub style: FontStyle,
    /// Fill color of the glyphs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Zero-based page index
    #[serde(default)]
    pub page_index: usize,
}

impl TextRun {
    /// Create a run; style flags are inferred from the font name.
    pub fn new(text: impl Into<String>, bbox: BBox, font_id: impl Into<String>, size: f32) -> Self {
        let font_id = font_id.into();
        Self {
            text: text.into(),
            bbox,
            style: FontStyle::from_font_name(&font_id),
            font_id,
            size,
            color: None,
            page_index: 0,
        }
    }

    /// Set the style flags.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Mark the run bold.
    pub fn bold(mut self) -> Self {
        self.style.bold = true;
        self
    }

    /// Mark the run italic.
    pub fn italic(mut self) -> Self {
        self.style.italic = true;
        self
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Number of characters, ignoring whitespace.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// A run without visible text or without area is excluded from layout.
    pub fn is_degenerate(&self) -> bool {
        self.bbox.is_degenerate() || self.text.trim().is_empty()
    }
}

/// Kind of vector primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// A filled and/or stroked rectangle
    Rect,
    /// A straight stroked segment
    Line,
}

/// A vector drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingPrimitive {
    /// Rectangle or line
    pub kind: PrimitiveKind,
    /// Bounding box (a line's box may have zero width or height)
    pub bbox: BBox,
    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    /// Stroke color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    /// Stroke width in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    /// Zero-based page index
    #[serde(default)]
    pub page_index: usize,
}

impl DrawingPrimitive {
    /// A stroked rectangle.
    pub fn rect(bbox: BBox) -> Self {
        Self {
            kind: PrimitiveKind::Rect,
            bbox,
            fill_color: None,
            stroke_color: Some(Color::rgb(0, 0, 0)),
            stroke_width: Some(1.0),
            page_index: 0,
        }
    }

    /// A filled rectangle without stroke.
    pub fn filled_rect(bbox: BBox, fill: Color) -> Self {
        Self {
            kind: PrimitiveKind::Rect,
            bbox,
            fill_color: Some(fill),
            stroke_color: None,
            stroke_width: None,
            page_index: 0,
        }
    }

    /// A stroked line segment.
    pub fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            kind: PrimitiveKind::Line,
            bbox: BBox::new(x0, y0, x1, y1),
            fill_color: None,
            stroke_color: Some(Color::rgb(0, 0, 0)),
            stroke_width: Some(1.0),
            page_index: 0,
        }
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// A fill-only rectangle (no visible stroke, or stroke matching the fill).
    pub fn is_fill_only(&self) -> bool {
        self.kind == PrimitiveKind::Rect
            && self.fill_color.is_some()
            && (self.stroke_color.is_none() || self.stroke_color == self.fill_color)
    }
}

/// Origin of the page coordinate system used by a geometry producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// `y` grows downward from the top edge
    #[default]
    TopLeft,
    /// `y` grows upward from the bottom edge (raw PDF user space)
    BottomLeft,
}

/// All geometry of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Zero-based page index
    pub page_index: usize,
    /// Page width in points
    #[serde(default)]
    pub width: f32,
    /// Page height in points
    #[serde(default)]
    pub height: f32,
    /// Coordinate origin of the boxes below
    #[serde(default)]
    pub origin: Origin,
    /// Text runs in producer order
    #[serde(default)]
    pub runs: Vec<TextRun>,
    /// Vector primitives in producer order
    #[serde(default)]
    pub primitives: Vec<DrawingPrimitive>,
}

impl PageGeometry {
    /// Create an empty page.
    pub fn new(page_index: usize, width: f32, height: f32) -> Self {
        Self {
            page_index,
            width,
            height,
            ..Default::default()
        }
    }

    /// Create an empty US Letter page.
    pub fn letter(page_index: usize) -> Self {
        Self::new(page_index, 612.0, 792.0)
    }

    /// Add a run, stamping it with this page's index.
    pub fn push_run(&mut self, run: TextRun) {
        self.runs.push(run.on_page(self.page_index));
    }

    /// Add a primitive, stamping it with this page's index.
    pub fn push_primitive(&mut self, primitive: DrawingPrimitive) {
        self.primitives.push(primitive.on_page(self.page_index));
    }

    /// Builder form of [`push_run`](Self::push_run).
    pub fn with_run(mut self, run: TextRun) -> Self {
        self.push_run(run);
        self
    }

    /// Builder form of [`push_primitive`](Self::push_primitive).
    pub fn with_primitive(mut self, primitive: DrawingPrimitive) -> Self {
        self.push_primitive(primitive);
        self
    }

    /// Whether the page has neither runs nor primitives.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.primitives.is_empty()
    }

    /// Page box, falling back to the content extent when no size was given.
    pub fn page_box(&self) -> BBox {
        if self.width > 0.0 && self.height > 0.0 {
            return BBox::new(0.0, 0.0, self.width, self.height);
        }
        let content = BBox::enclosing(
            self.runs
                .iter()
                .map(|r| &r.bbox)
                .chain(self.primitives.iter().map(|p| &p.bbox)),
        );
        content.map_or(BBox::new(0.0, 0.0, 0.0, 0.0), |c| {
            BBox::new(0.0, 0.0, c.x1.max(0.0), c.y1.max(0.0))
        })
    }

    /// Check the page for values no layout decision can be made from.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0 {
            return Err(Error::geometry(self.page_index, "invalid page size"));
        }
        for (i, run) in self.runs.iter().enumerate() {
            if !run.bbox.is_finite() {
                return Err(Error::geometry(
                    self.page_index,
                    format!("run {} has a non-finite bounding box", i),
                ));
            }
            if !run.size.is_finite() || run.size < 0.0 {
                return Err(Error::geometry(
                    self.page_index,
                    format!("run {} has an invalid font size", i),
                ));
            }
        }
        for (i, primitive) in self.primitives.iter().enumerate() {
            if !primitive.bbox.is_finite() {
                return Err(Error::geometry(
                    self.page_index,
                    format!("primitive {} has a non-finite bounding box", i),
                ));
            }
        }
        Ok(())
    }

    /// Validate the page and convert it to top-left coordinates with
    /// well-ordered boxes and consistent page indices.
    pub fn normalized(mut self) -> Result<Self> {
        self.validate()?;
        let flip = self.origin == Origin::BottomLeft;
        if flip && self.height <= 0.0 {
            return Err(Error::geometry(
                self.page_index,
                "bottom-left origin requires a page height",
            ));
        }
        let height = self.height;
        let page_index = self.page_index;
        for run in &mut self.runs {
            let b = BBox::new(run.bbox.x0, run.bbox.y0, run.bbox.x1, run.bbox.y1);
            run.bbox = if flip { b.flip_vertical(height) } else { b };
            run.page_index = page_index;
        }
        for primitive in &mut self.primitives {
            let b = BBox::new(
                primitive.bbox.x0,
                primitive.bbox.y0,
                primitive.bbox.x1,
                primitive.bbox.y1,
            );
            primitive.bbox = if flip { b.flip_vertical(height) } else { b };
            primitive.page_index = page_index;
        }
        self.origin = Origin::TopLeft;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_from_name() {
        let style = FontStyle::from_font_name("Helvetica-BoldOblique");
        assert!(style.bold);
        assert!(style.italic);
        assert!(!style.condensed);

        let style = FontStyle::from_font_name("ArialNarrow");
        assert!(style.condensed);
        assert!(!style.bold);
    }

    #[test]
    fn test_degenerate_run() {
        let run = TextRun::new("   ", BBox::new(0.0, 0.0, 10.0, 10.0), "F1", 10.0);
        assert!(run.is_degenerate());
        let run = TextRun::new("x", BBox::new(0.0, 0.0, 0.0, 10.0), "F1", 10.0);
        assert!(run.is_degenerate());
        let run = TextRun::new("x", BBox::new(0.0, 0.0, 5.0, 10.0), "F1", 10.0);
        assert!(!run.is_degenerate());
    }

    #[test]
    fn test_normalized_flips_bottom_left() {
        let mut page = PageGeometry::new(2, 600.0, 800.0);
        page.origin = Origin::BottomLeft;
        page.runs.push(TextRun::new(
            "Top",
            BBox::new(10.0, 780.0, 40.0, 790.0),
            "F1",
            10.0,
        ));

        let page = page.normalized().unwrap();
        assert_eq!(page.origin, Origin::TopLeft);
        assert_eq!(page.runs[0].bbox, BBox::new(10.0, 10.0, 40.0, 20.0));
        assert_eq!(page.runs[0].page_index, 2);
    }

    #[test]
    fn test_validate_rejects_nan() {
        let page = PageGeometry::letter(0).with_run(TextRun::new(
            "bad",
            BBox {
                x0: f32::NAN,
                y0: 0.0,
                x1: 1.0,
                y1: 1.0,
            },
            "F1",
            10.0,
        ));
        assert!(matches!(page.validate(), Err(Error::Geometry { page: 0, .. })));
    }

    #[test]
    fn test_page_box_falls_back_to_content() {
        let page = PageGeometry::new(0, 0.0, 0.0).with_run(TextRun::new(
            "x",
            BBox::new(10.0, 10.0, 300.0, 400.0),
            "F1",
            10.0,
        ));
        assert_eq!(page.page_box(), BBox::new(0.0, 0.0, 300.0, 400.0));
    }

    #[test]
    fn test_fill_only() {
        let fill = DrawingPrimitive::filled_rect(BBox::new(0.0, 0.0, 10.0, 10.0), Color::rgb(230, 230, 230));
        assert!(fill.is_fill_only());
        assert!(!DrawingPrimitive::rect(BBox::new(0.0, 0.0, 10.0, 10.0)).is_fill_only());
    }
}
