//! Summary extraction: pull densification records out of model output.
//!
//! ## Why two parsing modes?
//!
//! The prompt demands a minified JSON list, and models usually comply —
//! but "usually" is not a contract. Output arrives wrapped in markdown
//! fences, prefixed with commentary, or with a truncated final record.
//! Strict decoding alone would turn those near-misses into empty results;
//! pattern-matching alone would silently accept garbage forever.
//!
//! So: attempt strict structured decoding first, fall back to a permissive
//! field scan only on failure, and report which mode succeeded so
//! observability can show how often the model actually honours the format.
//!
//! A payload with no recognisable records is "nothing to show", not a
//! failure — extraction returns empty, never errors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One densification step as the model reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// ";"-delimited entities this step added.
    #[serde(default)]
    pub missing_entities: String,
    /// The rewritten summary covering everything so far.
    pub denser_summary: String,
}

/// Which parsing path produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// The output decoded as a well-formed JSON list of records.
    Strict,
    /// Strict decoding failed; fields were recovered by pattern scan.
    Permissive,
}

/// Parse completion output into densification records.
///
/// Strict-first: decode the (fence-stripped) text as a JSON list of
/// records. On any failure, fall back to scanning for `denser_summary`
/// fields — the permissive path recovers summaries from almost-JSON but
/// cannot recover the entity lists, which come back empty.
pub fn extract_records(raw: &str) -> (Vec<SummaryRecord>, ExtractionMode) {
    if let Some(records) = strict_parse(raw) {
        debug!("extraction: strict decode, {} records", records.len());
        return (records, ExtractionMode::Strict);
    }

    let records = permissive_scan(raw);
    debug!("extraction: permissive scan, {} records", records.len());
    (records, ExtractionMode::Permissive)
}

/// Extract the full densification trail for display.
///
/// Every `denser_summary` in order of appearance, one per line — the whole
/// trail, not just the densest record. Surfacing how the summary tightened
/// step by step is deliberate; callers wanting only-the-last semantics can
/// take the final [`extract_records`] entry instead.
///
/// Returns an empty string when no summary field is found.
pub fn extract_final_summary(raw: &str) -> String {
    let (records, _) = extract_records(raw);
    let mut out = String::new();
    for record in &records {
        out.push_str(&record.denser_summary);
        out.push('\n');
    }
    out
}

/// Strict decode: trim, strip an optional markdown fence, parse as a JSON
/// list of records.
fn strict_parse(raw: &str) -> Option<Vec<SummaryRecord>> {
    let cleaned = strip_fences(raw.trim());
    serde_json::from_str::<Vec<SummaryRecord>>(cleaned).ok()
}

/// Remove a wrapping ```/```json fence, if present.
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.rfind("```") {
        Some(end) => rest[..end].trim(),
        None => text,
    }
}

static RE_DENSER_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    // A JSON string value after the field name, honouring escapes.
    Regex::new(r#""denser_summary"\s*:\s*"((?:\\.|[^"\\])*)""#).unwrap()
});

/// Permissive scan: every `denser_summary` string value, in order.
fn permissive_scan(raw: &str) -> Vec<SummaryRecord> {
    RE_DENSER_SUMMARY
        .captures_iter(raw)
        .map(|caps| SummaryRecord {
            missing_entities: String::new(),
            denser_summary: unescape_json_string(&caps[1]),
        })
        .collect()
}

/// Undo the JSON string escapes the scan captured literally.
fn unescape_json_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_list_parses_strict() {
        let raw = r#"[{"missing_entities":"x","denser_summary":"A short summary."}]"#;
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Strict);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].missing_entities, "x");
        assert_eq!(records[0].denser_summary, "A short summary.");
    }

    #[test]
    fn final_summary_single_record() {
        let raw = r#"[{"missing_entities":"x","denser_summary":"A short summary."}]"#;
        assert_eq!(extract_final_summary(raw), "A short summary.\n");
    }

    #[test]
    fn final_summary_preserves_order_and_count() {
        let raw = r#"[
            {"missing_entities": "a;b", "denser_summary": "one"},
            {"missing_entities": "c", "denser_summary": "two"},
            {"missing_entities": "d", "denser_summary": "three"}
        ]"#;
        assert_eq!(extract_final_summary(raw), "one\ntwo\nthree\n");
    }

    #[test]
    fn no_matches_yields_empty_string() {
        assert_eq!(extract_final_summary("the model refused to answer"), "");
        assert_eq!(extract_final_summary(""), "");
    }

    #[test]
    fn fenced_output_still_parses_strict() {
        let raw = "```json\n[{\"missing_entities\":\"x\",\"denser_summary\":\"S\"}]\n```";
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Strict);
        assert_eq!(records[0].denser_summary, "S");
    }

    #[test]
    fn truncated_json_falls_back_to_permissive() {
        // Final record cut off mid-stream: strict decode fails, but the
        // complete fields are still recoverable.
        let raw = r#"[{"missing_entities":"a","denser_summary":"first"},{"missing_entities":"b","denser_summary":"second"},{"missing_ent"#;
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Permissive);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].denser_summary, "first");
        assert_eq!(records[1].denser_summary, "second");
        assert_eq!(records[0].missing_entities, "");
    }

    #[test]
    fn commentary_around_json_falls_back_to_permissive() {
        let raw = r#"Sure! Here is the JSON you asked for:
[{"missing_entities":"x","denser_summary":"A short summary."}]
Hope this helps."#;
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Permissive);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].denser_summary, "A short summary.");
    }

    #[test]
    fn permissive_scan_unescapes() {
        let raw = r#""denser_summary": "He said \"dense\",\nthen stopped.""#;
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Permissive);
        assert_eq!(records[0].denser_summary, "He said \"dense\",\nthen stopped.");
    }

    #[test]
    fn missing_entities_field_is_optional_in_strict_mode() {
        let raw = r#"[{"denser_summary":"only the summary"}]"#;
        let (records, mode) = extract_records(raw);
        assert_eq!(mode, ExtractionMode::Strict);
        assert_eq!(records[0].missing_entities, "");
    }
}
