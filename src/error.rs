//! Error types for the densum library.
//!
//! Three layers reflect three distinct failure modes:
//!
//! * [`TransportError`] — a single completion call against the remote
//!   endpoint failed (network, timeout, non-success status, undecodable
//!   body). Produced by the completion client; whether it is fatal depends
//!   on the phase it occurs in.
//!
//! * [`DocumentError`] — **Non-fatal**: one input file failed (too large,
//!   unreadable, not a PDF, its summarization call errored) but the other
//!   documents are fine. Stored inside [`crate::output::DocumentOutcome`]
//!   so callers can inspect partial success rather than losing the whole
//!   run to one bad file.
//!
//! * [`RunError`] — **Fatal**: the run cannot produce a final summary at
//!   all (bad configuration, the merge pass errored, every document
//!   failed). Returned as `Err(RunError)` from the top-level run functions.
//!
//! The separation follows the propagation policy of the pipeline: a
//! per-document transport error is recorded and the run continues; the same
//! transport error during the merge pass is terminal, because there is
//! nothing left to merge with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure of one completion call against the remote endpoint.
///
/// The completion client makes exactly one attempt per call; retry policy
/// is deliberately left to an injectable wrapper around
/// [`crate::pipeline::completion::CompletionBackend`].
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint answered with a non-success status code.
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection-level failure (DNS, TLS, refused, reset).
    #[error("network error calling the completion endpoint: {0}")]
    Network(String),

    /// The call exceeded the configured timeout.
    #[error("completion call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The 200 body was not a JSON-encoded text payload.
    #[error("could not decode completion response: {0}")]
    Decode(String),
}

/// A non-fatal error for a single input document.
///
/// Stored alongside [`crate::output::DocumentOutcome`] when a document
/// fails. The overall run continues unless ALL documents fail.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum DocumentError {
    /// Upload exceeds the configured size limit; rejected before parsing.
    #[error("'{name}' is {size} bytes, above the {limit}-byte upload limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    /// The byte stream is not a parseable PDF.
    #[error("'{name}' is not a readable PDF: {detail}")]
    ParseFailed { name: String, detail: String },

    /// The PDF parsed but contains zero pages.
    #[error("'{name}' contains no pages")]
    EmptyDocument { name: String },

    /// The file could not be read from disk.
    #[error("could not read '{name}': {detail}")]
    Io { name: String, detail: String },

    /// The per-document summarization call failed.
    #[error("summarization failed for '{name}': {source}")]
    Completion {
        name: String,
        #[source]
        source: TransportError,
    },
}

impl DocumentError {
    /// Name of the document this error belongs to.
    pub fn document_name(&self) -> &str {
        match self {
            DocumentError::TooLarge { name, .. }
            | DocumentError::ParseFailed { name, .. }
            | DocumentError::EmptyDocument { name }
            | DocumentError::Io { name, .. }
            | DocumentError::Completion { name, .. } => name,
        }
    }
}

/// All fatal errors returned by the densum library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RunError {
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The merge pass errored; the run has no final summary.
    #[error("merge pass failed: {source}")]
    MergeFailed {
        #[source]
        source: TransportError,
    },

    /// Every per-document call failed; there is nothing to merge.
    #[error("all {total} documents failed to summarize; first error: {first_error}")]
    AllDocumentsFailed { total: usize, first_error: String },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
