//! # densum
//!
//! Entity-dense summaries of PDF documents via chain-of-density prompting.
//!
//! ## Why this crate?
//!
//! A single-pass "summarize this" prompt produces summaries that are fluent
//! but thin — they mention the topic and skip the facts. Chain-of-density
//! prompting instead asks the model to draft a vague summary, then
//! repeatedly identify concrete entities it missed and rewrite the summary
//! at the *same length* to include them. Density rises with every
//! iteration; nothing already captured may be dropped. This crate runs that
//! protocol over each uploaded PDF, then merges every per-document result
//! into one cross-document summary with a second densification pass.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs
//!  │
//!  ├─ 1. Ingest   extract page text via lopdf, derive token metadata
//!  ├─ 2. Prompt   render the densification template per document
//!  ├─ 3. Complete one endpoint call per document (failures recorded)
//!  ├─ 4. Merge    concatenate summaries, densify once more
//!  └─ 5. Extract  pull the denser_summary trail from the model output
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use densum::{summarize_files, SummaryConfig, WordBudget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummaryConfig::builder()
//!         .word_budget(WordBudget::W512)
//!         .content_category("Research Paper")
//!         .completion_url("https://api.example.com/chat/completions")
//!         .agent_id("my-agent")
//!         .api_key(std::env::var("DENSUM_API_KEY")?)
//!         .build()?;
//!
//!     let output = summarize_files(&["paper.pdf", "appendix.pdf"], &config).await?;
//!     println!("{}", output.final_trail());
//!     eprintln!(
//!         "{} of {} documents summarized, {} final tokens",
//!         output.stats.summarized_documents,
//!         output.stats.total_documents,
//!         output.stats.final_tokens
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `densum` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! densum = { version = "0.1", default-features = false }
//! ```
//!
//! ## Error model
//!
//! Per-document failures (bad file, one failed endpoint call) are recorded
//! in the output and the run continues; only configuration problems, a
//! failed merge pass, or a fully-failed document set abort a run. See
//! [`error`] for the taxonomy.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder, WordBudget, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{DocumentError, RunError, TransportError};
pub use output::{CompletionResult, Document, DocumentOutcome, RunOutput, RunState, RunStats};
pub use pipeline::completion::{CompletionBackend, HttpBackend};
pub use pipeline::extract::{extract_final_summary, extract_records, ExtractionMode, SummaryRecord};
pub use pipeline::ingest::{ingest, ingest_file};
pub use pipeline::tokenize::count_tokens;
pub use progress::{NoopProgressCallback, RunProgress, RunProgressCallback};
pub use prompts::build_prompt;
pub use run::{summarize_documents, summarize_files};
pub use stream::{word_stream, words};
