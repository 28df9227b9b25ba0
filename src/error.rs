//! Error types for the pagemark library.
//!
//! Only invalid configuration and a document without any usable page data
//! abort a conversion. A page whose geometry cannot be loaded produces
//! [`Error::Geometry`], which the pipeline records in the page report and
//! replaces with an empty page.

use std::io;
use thiserror::Error;

/// Result type alias for pagemark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting page geometry.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading geometry dumps or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The geometry dump is not valid JSON for the expected schema.
    #[error("Invalid geometry JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A conversion option is out of range.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The source has no pages, or none of its pages could be loaded.
    #[error("Document contains no page data")]
    NoPageData,

    /// Geometry for one page is malformed or could not be produced.
    #[error("Malformed geometry on page {page}: {reason}")]
    Geometry {
        /// Zero-based page index
        page: usize,
        /// What was wrong with the page
        reason: String,
    },

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The dedicated worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build a geometry error for a page.
    pub fn geometry(page: usize, reason: impl Into<String>) -> Self {
        Error::Geometry {
            page,
            reason: reason.into(),
        }
    }

    /// Whether the pipeline recovers from this error by substituting an empty page.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Error::Geometry { .. } | Error::PageOutOfRange(..))
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Render(format!("cleanup pattern: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoPageData;
        assert_eq!(err.to_string(), "Document contains no page data");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::geometry(3, "non-finite coordinate");
        assert_eq!(
            err.to_string(),
            "Malformed geometry on page 3: non-finite coordinate"
        );
    }

    #[test]
    fn test_page_local_errors() {
        assert!(Error::geometry(0, "x").is_page_local());
        assert!(Error::PageOutOfRange(4, 2).is_page_local());
        assert!(!Error::NoPageData.is_page_local());
        assert!(!Error::Configuration("cap".into()).is_page_local());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
