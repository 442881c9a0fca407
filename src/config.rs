//! Configuration types for a summarization run.
//!
//! All behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The config is immutable for the duration of a
//! run and passed explicitly into every core call — there is no ambient,
//! process-wide summarization state.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults
//! for the rest; validation happens once, in `build()`.

use crate::error::RunError;
use crate::pipeline::completion::CompletionBackend;
use crate::progress::RunProgress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default upload ceiling: 200 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// The fixed set of per-iteration word budgets a summary may be asked for.
///
/// The budget is a closed set rather than a free integer because the
/// densification contract ("identical length each iteration") only behaves
/// well at sizes the prompt has been tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordBudget {
    W128,
    W256,
    #[default]
    W512,
    W1024,
}

impl WordBudget {
    /// The budget as a word count.
    pub fn words(self) -> usize {
        match self {
            WordBudget::W128 => 128,
            WordBudget::W256 => 256,
            WordBudget::W512 => 512,
            WordBudget::W1024 => 1024,
        }
    }

    /// Map a word count back to a budget. `None` for values outside the set.
    pub fn from_words(n: usize) -> Option<Self> {
        match n {
            128 => Some(WordBudget::W128),
            256 => Some(WordBudget::W256),
            512 => Some(WordBudget::W512),
            1024 => Some(WordBudget::W1024),
            _ => None,
        }
    }
}

impl fmt::Display for WordBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words())
    }
}

/// Configuration for one summarization run.
///
/// Built via [`SummaryConfig::builder()`] or [`SummaryConfig::default()`].
///
/// # Example
/// ```rust
/// use densum::{SummaryConfig, WordBudget};
///
/// let config = SummaryConfig::builder()
///     .word_budget(WordBudget::W256)
///     .content_category("Research Paper")
///     .iterations(3)
///     .completion_url("https://api.example.com/chat/completions")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Word cap for every summary iteration. Default: 512.
    pub word_budget: WordBudget,

    /// Number of descriptive entities the model is asked to introduce per
    /// densification step. Default: 5.
    pub entity_range: usize,

    /// The subject category the prompt refers to the source material as
    /// ("Article", "Research Paper", "Contract", …). Default: "Article".
    ///
    /// The template substitutes this everywhere it names the source, so a
    /// well-chosen category measurably sharpens entity selection.
    pub content_category: String,

    /// Densification steps after the initial summary; the output contains
    /// `1 + iterations` records of increasing density. Default: 5.
    pub iterations: usize,

    /// Completion endpoint URL. Required unless a custom backend is set.
    pub completion_url: String,

    /// Target agent identifier sent with every request.
    pub agent_id: String,

    /// Bearer token for the completion endpoint.
    pub api_key: String,

    /// Per-completion-call timeout in seconds. Default: 120.
    ///
    /// Densification outputs are long (up to `(1 + iterations) × budget`
    /// words), so a generous timeout beats spurious failures on large
    /// documents.
    pub api_timeout_secs: u64,

    /// Upload size ceiling enforced before PDF parsing. Default: 200 MiB.
    pub max_upload_bytes: u64,

    /// Pre-constructed completion backend. Takes precedence over
    /// `completion_url`; the seam for tests and for middleware such as a
    /// retrying wrapper.
    pub backend: Option<Arc<dyn CompletionBackend>>,

    /// Progress observer for run/document/merge events. Default: none.
    pub progress_callback: Option<RunProgress>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            word_budget: WordBudget::default(),
            entity_range: 5,
            content_category: "Article".to_string(),
            iterations: 5,
            completion_url: String::new(),
            agent_id: String::new(),
            api_key: String::new(),
            api_timeout_secs: 120,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            backend: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("word_budget", &self.word_budget)
            .field("entity_range", &self.entity_range)
            .field("content_category", &self.content_category)
            .field("iterations", &self.iterations)
            .field("completion_url", &self.completion_url)
            .field("agent_id", &self.agent_id)
            .field("api_key", &"<redacted>")
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn CompletionBackend>"))
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn word_budget(mut self, budget: WordBudget) -> Self {
        self.config.word_budget = budget;
        self
    }

    pub fn entity_range(mut self, n: usize) -> Self {
        self.config.entity_range = n.max(1);
        self
    }

    pub fn content_category(mut self, category: impl Into<String>) -> Self {
        self.config.content_category = category.into();
        self
    }

    pub fn iterations(mut self, n: usize) -> Self {
        self.config.iterations = n.max(1);
        self
    }

    pub fn completion_url(mut self, url: impl Into<String>) -> Self {
        self.config.completion_url = url.into();
        self
    }

    pub fn agent_id(mut self, id: impl Into<String>) -> Self {
        self.config.agent_id = id.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn progress_callback(mut self, cb: RunProgress) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, RunError> {
        let c = &self.config;
        if c.entity_range == 0 {
            return Err(RunError::InvalidConfig("entity_range must be ≥ 1".into()));
        }
        if c.iterations == 0 {
            return Err(RunError::InvalidConfig("iterations must be ≥ 1".into()));
        }
        if c.content_category.trim().is_empty() {
            return Err(RunError::InvalidConfig(
                "content_category must not be empty".into(),
            ));
        }
        if c.backend.is_none() && c.completion_url.trim().is_empty() {
            return Err(RunError::InvalidConfig(
                "completion_url is required when no backend is provided".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SummaryConfig::default();
        assert_eq!(c.word_budget.words(), 512);
        assert_eq!(c.entity_range, 5);
        assert_eq!(c.iterations, 5);
        assert_eq!(c.content_category, "Article");
        assert_eq!(c.max_upload_bytes, 200 * 1024 * 1024);
    }

    #[test]
    fn word_budget_round_trips() {
        for n in [128, 256, 512, 1024] {
            let budget = WordBudget::from_words(n).expect("in the option set");
            assert_eq!(budget.words(), n);
        }
        assert!(WordBudget::from_words(300).is_none());
        assert!(WordBudget::from_words(0).is_none());
    }

    #[test]
    fn builder_requires_url_without_backend() {
        let err = SummaryConfig::builder().build().unwrap_err();
        assert!(err.to_string().contains("completion_url"));
    }

    #[test]
    fn builder_rejects_empty_category() {
        let err = SummaryConfig::builder()
            .completion_url("https://api.example.com")
            .content_category("   ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("content_category"));
    }

    #[test]
    fn builder_clamps_zero_knobs() {
        let c = SummaryConfig::builder()
            .completion_url("https://api.example.com")
            .entity_range(0)
            .iterations(0)
            .build()
            .expect("clamped values must validate");
        assert_eq!(c.entity_range, 1);
        assert_eq!(c.iterations, 1);
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = SummaryConfig::builder()
            .completion_url("https://api.example.com")
            .api_key("sk-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
