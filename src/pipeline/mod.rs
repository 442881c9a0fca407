//! Pipeline stages for PDF summarization.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (a different PDF backend, a mocked completion endpoint)
//! without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! ingest ──▶ prompt ──▶ completion ──▶ extract
//! (lopdf)    (template)  (endpoint)    (records)
//! ```
//!
//! 1. [`ingest`]     — parse PDF bytes into a [`crate::output::Document`]
//!    with token/page metadata
//! 2. [`tokenize`]   — token counting over a fixed cl100k_base encoding
//! 3. [`completion`] — build the delimited message and drive the remote
//!    endpoint; the only stage with network I/O
//! 4. [`extract`]    — pull the densification records back out of the
//!    untrusted model output
//!
//! Prompt construction itself lives in [`crate::prompts`] so it can change
//! without touching transport or error-handling logic here.

pub mod completion;
pub mod extract;
pub mod ingest;
pub mod tokenize;
