//! Conversion pipeline.
//!
//! Three phases:
//!
//! 1. Load every selected page and accumulate font signatures (parallel
//!    map, then reduce).
//! 2. Resolve the role map once and share it read-only while each page is
//!    indexed, clustered, scanned for tables and assembled (parallel).
//! 3. Merge the page sequences in page order (sequential).

mod options;
mod progress;

pub use options::{ConvertOptions, PageSelection};
pub use progress::{CancellationToken, ConversionEvent};

use std::sync::Arc;

use crossbeam_channel::Sender;
use rayon::prelude::*;

use crate::analysis::{
    GeometryIndex, RoleMap, SignatureAccumulator, SpatialClusterer, TableReconstructor,
    TypographyProfiler,
};
use crate::assemble::{merge_pages, DocumentAssembler};
use crate::error::{Error, Result};
use crate::model::{Block, Document, PageGeometry, PageReport, PageStatus};
use crate::source::GeometrySource;

use progress::EventSink;

/// A loaded page, or the empty page standing in for it.
#[derive(Debug)]
struct LoadedPage {
    geometry: PageGeometry,
    status: Option<PageStatus>,
}

/// Result of analyzing one page.
#[derive(Debug)]
struct PageOutcome {
    report: PageReport,
    blocks: Vec<Block>,
}

/// Converts a geometry source into a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
    cancel: CancellationToken,
    events: EventSink,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Share a cancellation token with the caller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Send progress events to a channel.
    pub fn with_events(mut self, sender: Sender<ConversionEvent>) -> Self {
        self.events = EventSink::new(Some(sender));
        self
    }

    /// The options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Token that cancels this converter's runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Convert every selected page of a source.
    ///
    /// Fails with [`Error::Configuration`] for invalid options and with
    /// [`Error::NoPageData`] when the source has no pages or none of them
    /// could be loaded. Other page failures are recorded in the page
    /// reports.
    pub fn convert<S: GeometrySource + ?Sized>(&self, source: &S) -> Result<Document> {
        self.options.validate()?;

        let page_count = source.page_count();
        if page_count == 0 {
            return Err(Error::NoPageData);
        }
        let selected = self.options.pages.indices(page_count);
        if selected.is_empty() {
            return Err(Error::InvalidPageRange(format!(
                "{} selects none of {} pages",
                self.options.pages, page_count
            )));
        }

        match self.options.threads {
            Some(threads) if self.options.parallel => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| self.run(source, &selected))
            }
            _ => self.run(source, &selected),
        }
    }

    fn run<S: GeometrySource + ?Sized>(&self, source: &S, selected: &[usize]) -> Result<Document> {
        log::debug!("Converter: {} of {} pages selected", selected.len(), source.page_count());
        self.events.emit(ConversionEvent::Started {
            pages: selected.len(),
        });

        // Step 1: load pages and observe fonts
        let loaded: Vec<LoadedPage> = self.map_pages(selected, |&index| self.load(source, index));
        let failed = loaded
            .iter()
            .filter(|p| matches!(p.status, Some(PageStatus::Failed(_))))
            .count();
        if failed == loaded.len() {
            return Err(Error::NoPageData);
        }

        let accumulator = if self.options.parallel {
            loaded
                .par_iter()
                .map(|p| SignatureAccumulator::from_page(&p.geometry))
                .reduce(SignatureAccumulator::new, SignatureAccumulator::merge)
        } else {
            loaded
                .iter()
                .map(|p| SignatureAccumulator::from_page(&p.geometry))
                .fold(SignatureAccumulator::new(), SignatureAccumulator::merge)
        };

        // Step 2: document-wide roles
        let roles: Arc<RoleMap> = Arc::new(
            TypographyProfiler::new()
                .with_heading_level_cap(self.options.heading_level_cap)
                .profile(&accumulator),
        );
        log::debug!("Converter: {} font signatures resolved", roles.len());
        self.events.emit(ConversionEvent::RolesResolved {
            signatures: roles.len(),
        });

        // Step 3: per-page layout analysis
        let assembler = DocumentAssembler::new(&roles)?;
        let outcomes: Vec<PageOutcome> =
            self.map_pages(&loaded, |page| self.analyze(&assembler, page));

        // Step 4: ordered merge
        let mut reports = Vec::with_capacity(outcomes.len());
        let mut sequences = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            reports.push(outcome.report);
            sequences.push(outcome.blocks);
        }
        let blocks = merge_pages(sequences, self.options.merge_cross_page_paragraphs);

        let cancelled = reports
            .iter()
            .filter(|r| r.status == PageStatus::Cancelled)
            .count();
        if cancelled > 0 {
            log::debug!("Converter: {} pages cancelled", cancelled);
        }
        self.events.emit(ConversionEvent::Finished {
            blocks: blocks.len(),
            cancelled,
        });

        Ok(Document {
            metadata: source.metadata(),
            blocks,
            pages: reports,
            roles: roles.assignments().to_vec(),
        })
    }

    fn map_pages<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.options.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    fn load<S: GeometrySource + ?Sized>(&self, source: &S, index: usize) -> LoadedPage {
        if self.cancel.is_cancelled() {
            return LoadedPage {
                geometry: empty_page(index),
                status: Some(PageStatus::Cancelled),
            };
        }
        match source.page(index) {
            Ok(geometry) => {
                self.events.emit(ConversionEvent::PageLoaded { page_index: index });
                LoadedPage {
                    geometry,
                    status: None,
                }
            }
            Err(err) => {
                log::warn!("Page {}: {}; continuing with an empty page", index, err);
                self.events.emit(ConversionEvent::PageFailed {
                    page_index: index,
                    reason: err.to_string(),
                });
                LoadedPage {
                    geometry: empty_page(index),
                    status: Some(PageStatus::Failed(err.to_string())),
                }
            }
        }
    }

    fn analyze(&self, assembler: &DocumentAssembler<'_>, page: &LoadedPage) -> PageOutcome {
        let page_index = page.geometry.page_index;
        let status = match &page.status {
            Some(status) => Some(status.clone()),
            None if self.cancel.is_cancelled() => Some(PageStatus::Cancelled),
            None => None,
        };
        if let Some(status) = status {
            return PageOutcome {
                report: PageReport::with_status(page_index, status),
                blocks: Vec::new(),
            };
        }

        let geometry = &page.geometry;
        let index = GeometryIndex::build(geometry);

        let columns = SpatialClusterer::new()
            .with_column_gap_factor(self.options.column_gap_factor)
            .cluster(&index, index.by_y());

        let tables = if self.options.detect_tables {
            TableReconstructor::new()
                .with_min_rows(self.options.table_min_rows)
                .with_min_cols(self.options.table_min_cols)
                .reconstruct(&index, &columns)
        } else {
            Vec::new()
        };

        let assembly = assembler.assemble_page(&index, &columns, &tables);
        log::debug!(
            "Converter: page {} has {} columns, {} tables, {} blocks",
            page_index,
            columns.len(),
            tables.len(),
            assembly.blocks.len()
        );
        self.events.emit(ConversionEvent::PageAssembled {
            page_index,
            blocks: assembly.blocks.len(),
        });

        let status = if index.is_empty() {
            PageStatus::Empty
        } else {
            PageStatus::Analyzed
        };
        let report = PageReport {
            run_count: geometry.runs.len(),
            dropped_runs: index.dropped().len(),
            primitive_count: geometry.primitives.len(),
            column_count: columns.len(),
            table_count: tables.len(),
            block_count: assembly.blocks.len(),
            first_pass: self.options.retain_first_pass.then_some(assembly.first_pass),
            ..PageReport::with_status(page_index, status)
        };

        PageOutcome {
            report,
            blocks: assembly.blocks,
        }
    }
}

/// Empty stand-in for a page that could not be loaded.
fn empty_page(index: usize) -> PageGeometry {
    PageGeometry::letter(index)
}
