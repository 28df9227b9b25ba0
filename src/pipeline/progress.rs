//! Progress events and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

/// Events emitted while a document is converted.
///
/// Page events of one phase may arrive in any order when pages are
/// processed in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    /// Conversion started for this many selected pages
    Started {
        /// Pages that will be processed
        pages: usize,
    },
    /// A page's geometry was loaded and its fonts observed
    PageLoaded {
        /// Zero-based page index
        page_index: usize,
    },
    /// A page could not be loaded and was replaced by an empty page
    PageFailed {
        /// Zero-based page index
        page_index: usize,
        /// Error description
        reason: String,
    },
    /// The document-wide role map is ready
    RolesResolved {
        /// Distinct font signatures observed
        signatures: usize,
    },
    /// A page finished layout analysis
    PageAssembled {
        /// Zero-based page index
        page_index: usize,
        /// Blocks produced for the page
        blocks: usize,
    },
    /// Pages were merged into the final block sequence
    Finished {
        /// Blocks in the document
        blocks: usize,
        /// Pages that were cancelled
        cancelled: usize,
    },
}

/// Sends events to an optional listener. A disconnected receiver is ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<Sender<ConversionEvent>>);

impl EventSink {
    pub(crate) fn new(sender: Option<Sender<ConversionEvent>>) -> Self {
        Self(sender)
    }

    pub(crate) fn emit(&self, event: ConversionEvent) {
        if let Some(sender) = &self.0 {
            if sender.send(event).is_err() {
                log::trace!("progress receiver dropped");
            }
        }
    }
}

/// Shared flag that stops a conversion between pages.
///
/// Clones share the same flag. Pages not yet analyzed when the flag is set
/// contribute no blocks and are reported as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_sink_delivers_and_tolerates_dropped_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let sink = EventSink::new(Some(tx));
        sink.emit(ConversionEvent::Started { pages: 2 });
        assert_eq!(rx.recv().unwrap(), ConversionEvent::Started { pages: 2 });

        drop(rx);
        sink.emit(ConversionEvent::Finished {
            blocks: 0,
            cancelled: 0,
        });
        EventSink::default().emit(ConversionEvent::Started { pages: 0 });
    }
}
