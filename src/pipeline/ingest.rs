//! Document ingestion: PDF bytes → [`Document`] record.
//!
//! ## Why tokenize the whole prompt?
//!
//! The `tokens` field on a [`Document`] is counted over the rendered
//! densification prompt *combined with* the extracted text, not the raw
//! text alone. The number callers see is therefore the size of the request
//! that will actually be submitted, which is what matters when judging
//! whether a document fits a model's context window.
//!
//! The size ceiling is enforced before any parsing so an oversized upload
//! never reaches the PDF layer.

use crate::config::SummaryConfig;
use crate::error::DocumentError;
use crate::output::Document;
use crate::pipeline::tokenize::count_tokens;
use crate::prompts::build_prompt;
use std::path::Path;
use tracing::{debug, warn};

/// Heuristic chunking denominator: one "repeat" per 8 000 prompt tokens.
const TOKENS_PER_REPEAT: usize = 8000;

/// Ingest a PDF from raw bytes.
///
/// Extracts page text in page order, derives token/page metadata, and
/// returns an immutable [`Document`]. The `repeat_estimate` is a hint for
/// presentation layers only — the document is submitted single-shot.
///
/// # Errors
/// - [`DocumentError::TooLarge`] when `bytes` exceeds the configured limit
///   (checked before parsing)
/// - [`DocumentError::ParseFailed`] when the bytes are not a readable PDF
/// - [`DocumentError::EmptyDocument`] when the PDF has zero pages; this
///   guard also keeps the per-page token density from dividing by zero
pub fn ingest(name: &str, bytes: &[u8], config: &SummaryConfig) -> Result<Document, DocumentError> {
    if bytes.len() as u64 > config.max_upload_bytes {
        return Err(DocumentError::TooLarge {
            name: name.to_string(),
            size: bytes.len() as u64,
            limit: config.max_upload_bytes,
        });
    }

    let pdf = lopdf::Document::load_mem(bytes).map_err(|e| DocumentError::ParseFailed {
        name: name.to_string(),
        detail: e.to_string(),
    })?;

    if pdf.is_encrypted() {
        return Err(DocumentError::ParseFailed {
            name: name.to_string(),
            detail: "document is encrypted".to_string(),
        });
    }

    let pages = pdf.get_pages();
    if pages.is_empty() {
        return Err(DocumentError::EmptyDocument {
            name: name.to_string(),
        });
    }

    // BTreeMap keys come back ascending, i.e. in page order.
    let mut content = String::new();
    for &page_num in pages.keys() {
        match pdf.extract_text(&[page_num]) {
            Ok(text) => content.push_str(&text),
            // A single undecodable page (exotic font encoding, inline image
            // junk) should not sink the document; its text is simply absent.
            Err(e) => warn!("'{}' page {}: text extraction failed: {}", name, page_num, e),
        }
    }

    let page_count = pages.len();
    let tokens = count_tokens(&build_prompt(config, name, &content));
    debug!(
        "ingested '{}': {} pages, {} prompt tokens",
        name, page_count, tokens
    );

    Ok(Document {
        name: name.to_string(),
        tokens,
        pages: page_count,
        tokens_per_page: tokens / page_count,
        repeat_estimate: tokens / TOKENS_PER_REPEAT + 1,
        content,
    })
}

/// Ingest a PDF from a local path; the document name is the file name.
pub fn ingest_file(path: &Path, config: &SummaryConfig) -> Result<Document, DocumentError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = std::fs::read(path).map_err(|e| DocumentError::Io {
        name: name.clone(),
        detail: e.to_string(),
    })?;

    ingest(&name, &bytes, config)
}
