//! Geometric analysis stages.
//!
//! - [`index`]: per-page spatial index and page statistics
//! - [`tolerance`]: thresholds derived from page statistics
//! - [`typography`]: document-wide font roles
//! - [`cluster`]: columns, lines and reading order
//! - [`table`]: table regions

pub mod cluster;
pub mod index;
pub mod table;
pub mod tolerance;
pub mod typography;

pub use cluster::{Column, Line, SpatialClusterer};
pub use index::{GeometryIndex, PageStats};
pub use table::TableReconstructor;
pub use typography::{FontSignature, RoleMap, SignatureAccumulator, TypographyProfiler};
