//! Data model shared by the analysis stages and the renderers.
//!
//! Input types ([`PageGeometry`], [`TextRun`], [`DrawingPrimitive`]) describe
//! what a PDF library reports for a page. Output types ([`Block`],
//! [`Document`]) describe the assembled, format-agnostic document.

mod block;
mod document;
mod geometry;
mod run;
mod table;

pub use block::{Block, BlockKind, Continuation, FontRole, InlineText};
pub use document::{Document, Metadata, PageReport, PageStatus, RoleAssignment};
pub use geometry::{BBox, Color};
pub use run::{DrawingPrimitive, FontStyle, Origin, PageGeometry, PrimitiveKind, RunId, TextRun};
pub use table::{CellIndex, Table, TableRegion, TableSource};
