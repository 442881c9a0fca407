//! Token accounting over a fixed encoding.
//!
//! The encoder (cl100k_base) is chosen once at initialisation and shared
//! for the life of the process; every token count in the pipeline — ingest
//! metadata, completion result tags, merge-article sizing — goes through
//! [`count_tokens`] so the numbers are comparable across stages.

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

static ENCODER: Lazy<CoreBPE> = Lazy::new(|| {
    // The vocabulary ships embedded in tiktoken-rs; failure to build it is
    // unrecoverable misconfiguration, not a runtime condition.
    tiktoken_rs::cl100k_base().expect("embedded cl100k_base vocabulary must load")
});

/// Count the tokens in `text` under the pipeline's fixed encoding.
pub fn count_tokens(text: &str) -> usize {
    ENCODER.encode_with_special_tokens(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn plain_text_counts() {
        let n = count_tokens("Alpha text about a topic.");
        assert!(n > 0);
        assert!(n < 25, "short sentence should be a handful of tokens, got {n}");
    }

    #[test]
    fn longer_text_never_counts_fewer() {
        let short = count_tokens("entity-dense summaries");
        let long = count_tokens("entity-dense summaries of the above Article, repeated");
        assert!(long >= short);
    }
}
