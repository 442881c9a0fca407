//! Progress-callback trait for run observability.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to receive
//! events as the orchestrator moves documents through the pipeline: state
//! transitions, per-document progress, and token counts at each stage.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a channel, a terminal progress bar, or a log
//! stream without the library knowing anything about how the host
//! application communicates. All methods have default no-op bodies so
//! implementations only override what they care about.

use crate::output::RunState;
use std::sync::Arc;

/// Called by the orchestrator as a run progresses.
///
/// Documents are processed sequentially, so events for one run arrive in
/// order; implementations still must be `Send + Sync` because the run
/// itself executes inside an async task.
pub trait RunProgressCallback: Send + Sync {
    /// Called once, before the first document is submitted.
    ///
    /// # Arguments
    /// * `total_documents` — number of documents in this run
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called on every state-machine transition.
    fn on_state_change(&self, state: RunState) {
        let _ = state;
    }

    /// Called just before a document's completion call is sent.
    ///
    /// # Arguments
    /// * `index`  — 0-based position in the supplied document order
    /// * `name`   — document name
    /// * `tokens` — the document's prompt-inclusive token count
    fn on_document_start(&self, index: usize, name: &str, tokens: usize) {
        let _ = (index, name, tokens);
    }

    /// Called when a document's summary came back.
    ///
    /// # Arguments
    /// * `tokens` — token count of the completion output
    fn on_document_complete(&self, index: usize, name: &str, tokens: usize) {
        let _ = (index, name, tokens);
    }

    /// Called when a document's completion call failed; the run continues.
    fn on_document_error(&self, index: usize, name: &str, error: String) {
        let _ = (index, name, error);
    }

    /// Called once before the merge pass is submitted.
    ///
    /// # Arguments
    /// * `documents` — number of per-document summaries being merged
    /// * `tokens`    — token count of the concatenated merge article
    fn on_merge_start(&self, documents: usize, tokens: usize) {
        let _ = (documents, tokens);
    }

    /// Called once after the run reaches a terminal state.
    fn on_run_complete(&self, summarized: usize, failed: usize) {
        let _ = (summarized, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type RunProgress = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        states: Mutex<Vec<RunState>>,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_state_change(&self, state: RunState) {
            self.states.lock().unwrap().push(state);
        }
        fn on_document_start(&self, _index: usize, _name: &str, _tokens: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_complete(&self, _index: usize, _name: &str, _tokens: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_error(&self, _index: usize, _name: &str, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_state_change(RunState::Merging);
        cb.on_document_start(0, "a.pdf", 100);
        cb.on_document_complete(0, "a.pdf", 40);
        cb.on_document_error(1, "b.pdf", "timeout".to_string());
        cb.on_merge_start(1, 40);
        cb.on_run_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            states: Mutex::new(Vec::new()),
        };

        tracker.on_state_change(RunState::PerDocumentSummarizing);
        tracker.on_document_start(0, "a.pdf", 100);
        tracker.on_document_complete(0, "a.pdf", 50);
        tracker.on_document_start(1, "b.pdf", 200);
        tracker.on_document_error(1, "b.pdf", "HTTP 500".to_string());
        tracker.on_state_change(RunState::Merging);
        tracker.on_state_change(RunState::Done);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(
            *tracker.states.lock().unwrap(),
            vec![
                RunState::PerDocumentSummarizing,
                RunState::Merging,
                RunState::Done
            ]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: RunProgress = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_document_start(0, "a.pdf", 512);
    }
}
