//! Conversion options and configuration.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for converting page geometry into blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Deepest heading level the profiler assigns (1-6). A document with a
    /// title gets at most 5, as the title is rendered at level 1.
    pub heading_level_cap: u8,

    /// Scale of the derived column gap threshold (`None` = 1.0)
    pub column_gap_factor: Option<f32>,

    /// Minimum rows for a table region
    pub table_min_rows: usize,

    /// Minimum columns for a table region
    pub table_min_cols: usize,

    /// Join paragraphs split across a page break
    pub merge_cross_page_paragraphs: bool,

    /// Whether to reconstruct tables at all
    pub detect_tables: bool,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Worker threads for a dedicated pool (`None` = global pool)
    pub threads: Option<usize>,

    /// Which pages to convert
    pub pages: PageSelection,

    /// Keep each page's pass-1 blocks in its report
    pub retain_first_pass: bool,
}

impl ConvertOptions {
    /// Create new convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading level cap.
    pub fn with_heading_level_cap(mut self, cap: u8) -> Self {
        self.heading_level_cap = cap;
        self
    }

    /// Scale the column gap threshold.
    pub fn with_column_gap_factor(mut self, factor: f32) -> Self {
        self.column_gap_factor = Some(factor);
        self
    }

    /// Set the minimum table size.
    pub fn with_table_minimum(mut self, rows: usize, cols: usize) -> Self {
        self.table_min_rows = rows;
        self.table_min_cols = cols;
        self
    }

    /// Enable or disable cross-page paragraph merging.
    pub fn with_paragraph_merging(mut self, merge: bool) -> Self {
        self.merge_cross_page_paragraphs = merge;
        self
    }

    /// Enable or disable table reconstruction.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Run on a dedicated pool with this many threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Keep pass-1 blocks in the page reports.
    pub fn with_first_pass(mut self, retain: bool) -> Self {
        self.retain_first_pass = retain;
        self
    }

    /// Check every option, failing before any page is processed.
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.heading_level_cap) {
            return Err(Error::Configuration(format!(
                "heading_level_cap must be between 1 and 6, got {}",
                self.heading_level_cap
            )));
        }
        if let Some(factor) = self.column_gap_factor {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(Error::Configuration(format!(
                    "column_gap_factor must be positive and finite, got {}",
                    factor
                )));
            }
        }
        if self.table_min_rows < 2 || self.table_min_cols < 2 {
            return Err(Error::Configuration(format!(
                "table minimum must be at least 2x2, got {}x{}",
                self.table_min_rows, self.table_min_cols
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::Configuration("threads must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            heading_level_cap: 6,
            column_gap_factor: None,
            table_min_rows: 2,
            table_min_cols: 2,
            merge_cross_page_paragraphs: true,
            detect_tables: true,
            parallel: true,
            threads: None,
            pages: PageSelection::All,
            retain_first_pass: false,
        }
    }
}

/// Page selection (1-indexed page numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// A range of pages (inclusive)
    Range(RangeInclusive<usize>),
    /// Specific pages, sorted and deduplicated
    Pages(Vec<usize>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }

    /// Zero-based indices of the selected pages of a document.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        (0..page_count).filter(|&i| self.includes(i + 1)).collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());
        let number = |part: &str| -> Result<usize> {
            match part.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };
        let range = |part: &str| -> Result<Option<(usize, usize)>> {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (number(start)?, number(end)?);
                    if start > end {
                        return Err(invalid());
                    }
                    Ok(Some((start, end)))
                }
                None => Ok(None),
            }
        };

        if !s.contains(',') {
            if let Some((start, end)) = range(s)? {
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match range(part)? {
                Some((start, end)) => pages.extend(start..=end),
                None => pages.push(number(part)?),
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => write!(f, "all"),
            PageSelection::Range(range) => write!(f, "{}-{}", range.start(), range.end()),
            PageSelection::Pages(pages) => {
                let parts: Vec<String> = pages.iter().map(usize::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

impl TryFrom<String> for PageSelection {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        PageSelection::parse(&value)
    }
}

impl From<PageSelection> for String {
    fn from(selection: PageSelection) -> Self {
        selection.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_heading_level_cap(3)
            .with_column_gap_factor(1.5)
            .with_paragraph_merging(false)
            .sequential()
            .with_first_pass(true);

        assert_eq!(options.heading_level_cap, 3);
        assert_eq!(options.column_gap_factor, Some(1.5));
        assert!(!options.merge_cross_page_paragraphs);
        assert!(!options.parallel);
        assert!(options.retain_first_pass);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.heading_level_cap, 6);
        assert_eq!(options.column_gap_factor, None);
        assert_eq!((options.table_min_rows, options.table_min_cols), (2, 2));
        assert!(options.merge_cross_page_paragraphs);
        assert!(options.detect_tables);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            ConvertOptions::new().with_heading_level_cap(0),
            ConvertOptions::new().with_heading_level_cap(7),
            ConvertOptions::new().with_column_gap_factor(0.0),
            ConvertOptions::new().with_column_gap_factor(f32::NAN),
            ConvertOptions::new().with_table_minimum(1, 2),
            ConvertOptions::new().with_threads(0),
        ];
        for options in bad {
            assert!(
                matches!(options.validate(), Err(Error::Configuration(_))),
                "{:?} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_options_from_json() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{ "heading_level_cap": 4, "pages": "2-3" }"#).unwrap();
        assert_eq!(options.heading_level_cap, 4);
        assert_eq!(options.pages, PageSelection::Range(2..=3));
        assert!(options.detect_tables);

        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"pages\":\"2-3\""));
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
        assert_eq!(pages.indices(4), vec![0, 2]);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("1-10").unwrap(), PageSelection::Range(1..=10));
        assert_eq!(
            PageSelection::parse("7-8,1,3,5-7").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7, 8])
        );
        assert!(matches!(
            PageSelection::parse("3-1"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("x").is_err());
    }
}
