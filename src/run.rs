//! The summarization orchestrator: per-document pass, then a merge pass.
//!
//! ## Two phases, one barrier
//!
//! Phase 1 submits each document for densification independently, in the
//! order supplied. A failed document is recorded and the run moves on —
//! one unreachable endpoint response should not cost the caller the other
//! nine summaries. Phase 2 is the only synchronisation point: it
//! concatenates every successful phase-1 output into a single
//! cross-document article and submits that for one more densification
//! pass. A phase-2 failure is fatal; there is no partial merge.
//!
//! Documents are processed sequentially. Parallel dispatch would be a pure
//! performance optimisation (nothing orders the documents against each
//! other before the merge), but sequential keeps the backend call order
//! observable and the state machine trivial.
//!
//! State transitions (`Idle → PerDocumentSummarizing → Merging → Done`,
//! `Failed` terminal) are reported through the configured
//! [`RunProgressCallback`](crate::progress::RunProgressCallback) along
//! with per-document progress and token counts at every stage.

use crate::config::SummaryConfig;
use crate::error::{DocumentError, RunError};
use crate::output::{Document, DocumentOutcome, RunOutput, RunState, RunStats};
use crate::pipeline::completion::{summarize_article, CompletionBackend, HttpBackend};
use crate::pipeline::ingest::ingest_file;
use crate::pipeline::tokenize::count_tokens;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Summarize a set of ingested documents.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunOutput)` on success, even if some documents failed (check
/// `output.stats.failed_documents`). An empty document set returns an
/// empty `Idle` output without touching the backend — no run, not an
/// error.
///
/// # Errors
/// Returns `Err(RunError)` only for fatal conditions:
/// - No usable backend could be constructed from the config
/// - Every document's completion call failed (nothing to merge)
/// - The merge pass itself failed
pub async fn summarize_documents(
    documents: Vec<Document>,
    config: &SummaryConfig,
) -> Result<RunOutput, RunError> {
    let total_start = Instant::now();

    if documents.is_empty() {
        info!("no documents supplied; nothing to summarize");
        return Ok(RunOutput::empty());
    }

    let backend = resolve_backend(config)?;
    let cb = config.progress_callback.clone();

    info!("starting summarization run over {} documents", documents.len());
    if let Some(ref cb) = cb {
        cb.on_run_start(documents.len());
        cb.on_state_change(RunState::PerDocumentSummarizing);
    }

    // ── Phase 1: per-document summarization ─────────────────────────────
    let phase_start = Instant::now();
    let mut outcomes: Vec<DocumentOutcome> = Vec::with_capacity(documents.len());

    for (index, document) in documents.iter().enumerate() {
        if let Some(ref cb) = cb {
            cb.on_document_start(index, &document.name, document.tokens);
        }

        let start = Instant::now();
        let outcome = match summarize_article(&backend, config, &document.name, &document.content)
            .await
        {
            Ok(result) => {
                if let Some(ref cb) = cb {
                    cb.on_document_complete(index, &document.name, result.tokens);
                }
                DocumentOutcome::success(result, start.elapsed().as_millis() as u64)
            }
            Err(e) => {
                warn!("document '{}' failed: {}", document.name, e);
                if let Some(ref cb) = cb {
                    cb.on_document_error(index, &document.name, e.to_string());
                }
                DocumentOutcome::failure(
                    DocumentError::Completion {
                        name: document.name.clone(),
                        source: e,
                    },
                    start.elapsed().as_millis() as u64,
                )
            }
        };
        outcomes.push(outcome);
    }
    let per_document_ms = phase_start.elapsed().as_millis() as u64;

    let summarized = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - summarized;

    if summarized == 0 {
        let first_error = outcomes
            .iter()
            .find_map(|o| o.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        if let Some(ref cb) = cb {
            cb.on_state_change(RunState::Failed);
            cb.on_run_complete(0, failed);
        }
        return Err(RunError::AllDocumentsFailed {
            total: outcomes.len(),
            first_error,
        });
    }

    // ── Phase 2: merge pass ─────────────────────────────────────────────
    if let Some(ref cb) = cb {
        cb.on_state_change(RunState::Merging);
    }

    let merged_article = assemble_merge_article(&outcomes);
    let merged_tokens = count_tokens(&merged_article);
    info!(
        "merging {} summaries ({} tokens)",
        summarized, merged_tokens
    );
    if let Some(ref cb) = cb {
        cb.on_merge_start(summarized, merged_tokens);
    }

    let merge_start = Instant::now();
    let final_summary = match summarize_article(&backend, config, "", &merged_article).await {
        Ok(result) => result,
        Err(e) => {
            warn!("merge pass failed: {}", e);
            if let Some(ref cb) = cb {
                cb.on_state_change(RunState::Failed);
                cb.on_run_complete(summarized, failed);
            }
            return Err(RunError::MergeFailed { source: e });
        }
    };
    let merge_ms = merge_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = cb {
        cb.on_state_change(RunState::Done);
        cb.on_run_complete(summarized, failed);
    }

    let stats = RunStats {
        total_documents: documents.len(),
        summarized_documents: summarized,
        failed_documents: failed,
        document_tokens: documents.iter().map(|d| d.tokens).sum(),
        summary_tokens: outcomes
            .iter()
            .filter_map(|o| o.summary.as_ref())
            .map(|r| r.tokens)
            .sum(),
        merged_tokens,
        final_tokens: final_summary.tokens,
        per_document_ms,
        merge_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "run complete: {}/{} documents, {}ms total",
        summarized, documents.len(), stats.total_ms
    );

    Ok(RunOutput {
        outcomes,
        merged_article,
        final_summary: Some(final_summary),
        state: RunState::Done,
        stats,
    })
}

/// Ingest local PDF paths and summarize the result.
///
/// Files that fail ingestion (unreadable, oversized, not a PDF, empty) are
/// recorded as failed outcomes and skipped; the run proceeds over the rest.
/// If nothing ingests, the result is an `Idle` output whose outcomes carry
/// the per-file errors — the backend is never touched.
pub async fn summarize_files<P: AsRef<Path>>(
    paths: &[P],
    config: &SummaryConfig,
) -> Result<RunOutput, RunError> {
    let mut documents = Vec::new();
    let mut slots: Vec<Option<DocumentOutcome>> = Vec::with_capacity(paths.len());

    for path in paths {
        match ingest_file(path.as_ref(), config) {
            Ok(doc) => {
                documents.push(doc);
                slots.push(None);
            }
            Err(e) => {
                warn!("skipping '{}': {}", e.document_name(), e);
                slots.push(Some(DocumentOutcome::failure(e, 0)));
            }
        }
    }
    let skipped = slots.iter().filter(|s| s.is_some()).count();

    let mut output = summarize_documents(documents, config).await?;

    // Splice the ingest failures back into input order.
    let mut run_outcomes = output.outcomes.into_iter();
    output.outcomes = slots
        .into_iter()
        .map(|slot| match slot {
            Some(failure) => failure,
            None => run_outcomes
                .next()
                .unwrap_or_else(|| unreachable!("one run outcome per ingested document")),
        })
        .collect();

    output.stats.total_documents += skipped;
    output.stats.failed_documents += skipped;

    Ok(output)
}

/// Resolve the completion backend, most-specific first: a pre-built
/// backend from the config, else an [`HttpBackend`] over the configured
/// endpoint coordinates.
fn resolve_backend(config: &SummaryConfig) -> Result<Arc<dyn CompletionBackend>, RunError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    if config.completion_url.trim().is_empty() {
        return Err(RunError::InvalidConfig(
            "completion_url is required when no backend is provided".into(),
        ));
    }
    let backend = HttpBackend::from_config(config)
        .map_err(|e| RunError::Internal(format!("failed to build HTTP client: {e}")))?;
    Ok(Arc::new(backend))
}

/// Concatenate successful per-document outputs into the merge article:
/// a `## <name>` section header followed by the raw content, blank-line
/// separated, in original document order.
fn assemble_merge_article(outcomes: &[DocumentOutcome]) -> String {
    let mut article = String::new();
    for outcome in outcomes {
        if let Some(ref result) = outcome.summary {
            article.push_str("## ");
            article.push_str(&outcome.name);
            article.push('\n');
            article.push_str(&result.content);
            article.push_str("\n\n");
        }
    }
    article
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CompletionResult;

    fn ok_outcome(name: &str, content: &str) -> DocumentOutcome {
        DocumentOutcome::success(
            CompletionResult {
                source_name: name.to_string(),
                tokens: 1,
                content: content.to_string(),
            },
            0,
        )
    }

    #[test]
    fn merge_article_format() {
        let outcomes = vec![ok_outcome("a.pdf", "<resultA>"), ok_outcome("b.pdf", "<resultB>")];
        assert_eq!(
            assemble_merge_article(&outcomes),
            "## a.pdf\n<resultA>\n\n## b.pdf\n<resultB>\n\n"
        );
    }

    #[test]
    fn merge_article_skips_failures() {
        let outcomes = vec![
            ok_outcome("a.pdf", "<resultA>"),
            DocumentOutcome::failure(
                DocumentError::EmptyDocument {
                    name: "b.pdf".into(),
                },
                0,
            ),
            ok_outcome("c.pdf", "<resultC>"),
        ];
        assert_eq!(
            assemble_merge_article(&outcomes),
            "## a.pdf\n<resultA>\n\n## c.pdf\n<resultC>\n\n"
        );
    }

    #[test]
    fn resolve_backend_requires_url() {
        let config = SummaryConfig::default();
        let err = match resolve_backend(&config) {
            Err(e) => e,
            Ok(_) => panic!("expected resolve_backend to fail"),
        };
        assert!(matches!(err, RunError::InvalidConfig(_)));
    }
}
