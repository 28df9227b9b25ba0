//! Axis-aligned boxes and colors.
//!
//! All coordinates are in PDF points with a top-left origin: `y` grows
//! toward the bottom of the page.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a box, swapping edges given in the wrong order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Create a box from an origin and a size.
    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Center point as `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        (self.center_x(), self.center_y())
    }

    /// A box with zero width or zero height carries no layout information.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= f32::EPSILON || self.height() <= f32::EPSILON
    }

    /// All four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Length of the shared x-range (0 when disjoint).
    pub fn horizontal_overlap(&self, other: &BBox) -> f32 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }

    /// Length of the shared y-range (0 when disjoint).
    pub fn vertical_overlap(&self, other: &BBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Whether the boxes share any area or touch.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Area of the intersection.
    pub fn intersection_area(&self, other: &BBox) -> f32 {
        self.horizontal_overlap(other) * self.vertical_overlap(other)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> BBox {
        BBox {
            x0: self.x0 - margin,
            y0: self.y0 - margin,
            x1: self.x1 + margin,
            y1: self.y1 + margin,
        }
    }

    /// Whether a point lies inside the box (edges included).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Whether `other` lies inside this box, allowing `tolerance` on every edge.
    pub fn contains(&self, other: &BBox, tolerance: f32) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }

    /// Union of a sequence of boxes.
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Mirror the box vertically inside a page of the given height.
    pub fn flip_vertical(&self, page_height: f32) -> BBox {
        BBox::new(self.x0, page_height - self.y1, self.x1, page_height - self.y0)
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Color {
    /// Create a color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Whether the color is white or nearly so.
    pub fn is_near_white(&self) -> bool {
        self.r >= 250 && self.g >= 250 && self.b >= 250
    }
}
