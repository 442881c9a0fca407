//! Completion client: build the delimited message and drive the endpoint.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching transport or
//! error-handling logic here.
//!
//! ## Retry Strategy
//!
//! There is none, on purpose. Each call is a single attempt; a transient
//! failure surfaces as a [`TransportError`] and the orchestrator decides
//! what it means (recorded per document, fatal for the merge). Callers who
//! want bounded retry with backoff wrap the [`CompletionBackend`] trait —
//! the same seam the tests use to substitute a scripted backend.

use crate::config::SummaryConfig;
use crate::error::TransportError;
use crate::output::CompletionResult;
use crate::pipeline::tokenize::count_tokens;
use crate::prompts::{build_prompt, ARTICLE_CLOSE, ARTICLE_OPEN};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// How much of an error body to keep in a [`TransportError::Http`].
const ERROR_BODY_LIMIT: usize = 512;

/// Transport abstraction over the completion endpoint.
///
/// One message in, raw model text out. [`HttpBackend`] is the production
/// implementation; anything `Send + Sync` with the same shape (a mock, a
/// retrying or caching wrapper around another backend) can be injected via
/// [`SummaryConfig::backend`](crate::config::SummaryConfig::backend).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Submit one user-turn message and return the decoded model text.
    async fn complete(&self, message: &str) -> Result<String, TransportError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    #[serde(rename = "agentId")]
    agent_id: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
}

/// reqwest-backed implementation of the completion wire protocol.
///
/// POSTs `{agentId, messages, format: "text", stream: false}` with bearer
/// authorization; a 200 body is JSON whose decoded value is the model's
/// raw text output. Anything else maps onto [`TransportError`].
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
    agent_id: String,
    api_key: String,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(
        url: impl Into<String>,
        agent_id: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            agent_id: agent_id.into(),
            api_key: api_key.into(),
            timeout_secs,
        })
    }

    /// Build a backend from the endpoint coordinates in `config`.
    pub fn from_config(config: &SummaryConfig) -> Result<Self, TransportError> {
        Self::new(
            config.completion_url.clone(),
            config.agent_id.clone(),
            config.api_key.clone(),
            config.api_timeout_secs,
        )
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, message: &str) -> Result<String, TransportError> {
        let payload = CompletionRequest {
            agent_id: &self.agent_id,
            messages: vec![ChatMessage {
                role: "user",
                content: message,
            }],
            format: "text",
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        match value {
            serde_json::Value::String(text) => Ok(text),
            other => Err(TransportError::Decode(format!(
                "expected a JSON string body, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Run one densification pass over a single article.
///
/// Builds the prompt for `(article_name, article_text)`, wraps it in the
/// article marker pair, submits it as a single user-turn message, and tags
/// the decoded output with its token count and source name.
///
/// Used for both phases of a run: once per document, and once more over
/// the concatenated per-document summaries (with an empty name).
pub async fn summarize_article(
    backend: &Arc<dyn CompletionBackend>,
    config: &SummaryConfig,
    article_name: &str,
    article_text: &str,
) -> Result<CompletionResult, TransportError> {
    let prompt = build_prompt(config, article_name, article_text);
    let message = format!("{ARTICLE_OPEN}{prompt}{ARTICLE_CLOSE}");

    let start = Instant::now();
    let content = backend.complete(&message).await?;
    let tokens = count_tokens(&content);
    debug!(
        "completion for '{}': {} output tokens in {:?}",
        if article_name.is_empty() { "<merge>" } else { article_name },
        tokens,
        start.elapsed()
    );

    Ok(CompletionResult {
        source_name: article_name.to_string(),
        tokens,
        content,
    })
}
