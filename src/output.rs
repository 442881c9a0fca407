//! Result types produced by the summarization pipeline.
//!
//! Everything here derives `Serialize`/`Deserialize` so a whole run can be
//! dumped as JSON (the CLI's `--json` flag) or fed back into tooling.

use crate::error::DocumentError;
use crate::pipeline::extract::extract_final_summary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One ingested PDF, reduced to plain text plus derived metadata.
///
/// Immutable after creation. `tokens` is counted over the rendered prompt
/// combined with the content, so it reflects the size of the eventual
/// submission rather than the raw text alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source file name, carried through to section headers in the merge pass.
    pub name: String,
    /// Token count of the full prompt this document will be submitted as.
    pub tokens: usize,
    /// Page count of the source PDF. Always ≥ 1.
    pub pages: usize,
    /// Token density, `tokens / pages`.
    pub tokens_per_page: usize,
    /// Heuristic chunk-count hint, `tokens / 8000 + 1`. Informational only;
    /// the document is submitted in a single shot regardless.
    pub repeat_estimate: usize,
    /// Extracted page text, concatenated in page order.
    pub content: String,
}

/// Raw output of one completion call, tagged with its origin.
///
/// `content` is whatever the model produced — expected to be a minified
/// JSON list of summary records, but treated as untrusted text until it
/// reaches the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Name of the document this came from; empty for the merge pass.
    pub source_name: String,
    /// Token count of `content`.
    pub tokens: usize,
    /// Raw model output.
    pub content: String,
}

/// The orchestrator's observable state.
///
/// `Idle → PerDocumentSummarizing → Merging → Done`, with `Failed`
/// reachable from any non-idle state. A run over an empty document set
/// stays `Idle` — no run, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    PerDocumentSummarizing,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::PerDocumentSummarizing => "summarizing",
            RunState::Merging => "merging",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Per-document result: either a summary or the recorded error.
///
/// Outcomes preserve the order documents were supplied in, so the merge
/// pass and any report stay aligned with the caller's input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub name: String,
    /// Present on success.
    pub summary: Option<CompletionResult>,
    /// Present on failure.
    pub error: Option<DocumentError>,
    /// Wall-clock time spent on this document's completion call.
    pub duration_ms: u64,
}

impl DocumentOutcome {
    pub(crate) fn success(result: CompletionResult, duration_ms: u64) -> Self {
        Self {
            name: result.source_name.clone(),
            summary: Some(result),
            error: None,
            duration_ms,
        }
    }

    pub(crate) fn failure(error: DocumentError, duration_ms: u64) -> Self {
        Self {
            name: error.document_name().to_string(),
            summary: None,
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_some()
    }
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_documents: usize,
    pub summarized_documents: usize,
    pub failed_documents: usize,
    /// Sum of `Document::tokens` over the supplied documents.
    pub document_tokens: usize,
    /// Sum of per-document completion output tokens.
    pub summary_tokens: usize,
    /// Token count of the concatenated merge article.
    pub merged_tokens: usize,
    /// Token count of the final completion output.
    pub final_tokens: usize,
    pub per_document_ms: u64,
    pub merge_ms: u64,
    pub total_ms: u64,
}

/// Everything a finished (or failed-partway) run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// Per-document results in input order.
    pub outcomes: Vec<DocumentOutcome>,
    /// The concatenated cross-document article submitted to the merge pass.
    /// Empty when no merge happened.
    pub merged_article: String,
    /// The merge pass result; `None` only for an empty run.
    pub final_summary: Option<CompletionResult>,
    pub state: RunState,
    pub stats: RunStats,
}

impl RunOutput {
    /// The outcome of a run over zero documents: nothing was attempted.
    pub(crate) fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
            merged_article: String::new(),
            final_summary: None,
            state: RunState::Idle,
            stats: RunStats::default(),
        }
    }

    /// The full densification trail of the final summary: every
    /// `denser_summary` the merge pass produced, one per line, in order.
    /// Empty when the run produced nothing or the output had no summaries.
    pub fn final_trail(&self) -> String {
        self.final_summary
            .as_ref()
            .map(|r| extract_final_summary(&r.content))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_run_output() {
        let out = RunOutput::empty();
        assert_eq!(out.state, RunState::Idle);
        assert!(out.outcomes.is_empty());
        assert!(out.final_summary.is_none());
        assert_eq!(out.final_trail(), "");
    }

    #[test]
    fn final_trail_extracts_all_iterations() {
        let mut out = RunOutput::empty();
        out.final_summary = Some(CompletionResult {
            source_name: String::new(),
            tokens: 12,
            content: r#"[{"missing_entities":"a","denser_summary":"First."},{"missing_entities":"b","denser_summary":"First and second."}]"#.into(),
        });
        assert_eq!(out.final_trail(), "First.\nFirst and second.\n");
    }

    #[test]
    fn outcome_constructors() {
        let ok = DocumentOutcome::success(
            CompletionResult {
                source_name: "a.pdf".into(),
                tokens: 3,
                content: "[]".into(),
            },
            17,
        );
        assert!(ok.is_success());
        assert_eq!(ok.name, "a.pdf");

        let err = DocumentOutcome::failure(
            DocumentError::EmptyDocument {
                name: "b.pdf".into(),
            },
            0,
        );
        assert!(!err.is_success());
        assert_eq!(err.name, "b.pdf");
    }

    #[test]
    fn run_state_display() {
        assert_eq!(RunState::Merging.to_string(), "merging");
        assert_eq!(RunState::default(), RunState::Idle);
    }
}
