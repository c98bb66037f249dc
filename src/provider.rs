//! Completion backend seam and the Groq-backed implementation.
//!
//! The pipeline only ever talks to [`CompletionProvider`], an object-safe
//! trait, so tests can substitute scripted providers and callers can plug in
//! any OpenAI-compatible endpoint. [`GroqProvider`] is the production
//! implementation: a thin `reqwest` client for `POST {base}/chat/completions`
//! with Bearer auth and explicit status mapping. It does no retrying of its
//! own; the retry policy lives in [`crate::pipeline::llm`] where prompt
//! strictness and backoff are decided together.

use crate::config::AnalysisConfig;
use crate::error::{DocRiskError, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Environment variable holding the Groq API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the default model.
pub const MODEL_ENV: &str = "DOCRISK_MODEL";

/// One chat-completion call: a system/user message pair plus sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Abstraction over the chat-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Run one completion and return the raw assistant text.
    ///
    /// Implementations must not retry internally: every failure corresponds
    /// to exactly one attempt in the caller's retry budget.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Chat-completions client for the Groq API.
pub struct GroqProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GroqProvider {
    /// Client with the default model, base URL, and a 60 s timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_options(api_key, DEFAULT_MODEL, DEFAULT_BASE_URL, 60)
    }

    /// Fully parameterised client. `base_url` is the API root without the
    /// `/chat/completions` suffix; a trailing slash is tolerated.
    pub fn with_options(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network {
                detail: format!("could not build HTTP client: {e}"),
            })?;

        let base_url = base_url.into();
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from `GROQ_API_KEY`, or `Ok(None)` when the key is absent.
    ///
    /// Model precedence: `model` argument, then `DOCRISK_MODEL`, then
    /// [`DEFAULT_MODEL`].
    pub fn from_env(
        model: Option<String>,
        timeout_secs: u64,
    ) -> Result<Option<Self>, ProviderError> {
        let api_key = match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };
        let model = model
            .or_else(|| std::env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self::with_options(api_key, model, DEFAULT_BASE_URL, timeout_secs).map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
        });

        debug!(
            "completion request: model={} temperature={} user_chars={}",
            self.model,
            request.temperature,
            request.user.chars().count()
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                detail: e.to_string(),
            })?;

        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth {
                detail: format!("HTTP {}; check {API_KEY_ENV}", status.as_u16()),
            });
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let content = payload["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "response carries no choices[0].message.content".to_string(),
                )
            })?;

        Ok(content.to_string())
    }
}

/// The provider the analysis will use: the injected one, else Groq from the
/// environment, else [`DocRiskError::MissingProvider`].
pub(crate) fn resolve(
    config: &AnalysisConfig,
) -> Result<Arc<dyn CompletionProvider>, DocRiskError> {
    if let Some(provider) = &config.provider {
        return Ok(Arc::clone(provider));
    }

    match GroqProvider::from_env(config.model.clone(), config.api_timeout_secs) {
        Ok(Some(groq)) => {
            debug!("using Groq provider from environment: model={}", groq.model());
            Ok(Arc::new(groq))
        }
        Ok(None) => Err(DocRiskError::MissingProvider),
        Err(e) => Err(DocRiskError::InvalidConfig(format!(
            "could not build Groq client: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_options_normalizes_base_url() {
        let p = GroqProvider::with_options("key", "m", "https://example.test/v1/", 5)
            .expect("client builds");
        assert_eq!(p.base_url(), "https://example.test/v1");
        assert_eq!(p.name(), "groq");
    }

    #[test]
    fn new_uses_groq_defaults() {
        let p = GroqProvider::new("key").expect("client builds");
        assert_eq!(p.model(), DEFAULT_MODEL);
        assert_eq!(p.base_url(), DEFAULT_BASE_URL);
    }

    // Sets and clears GROQ_API_KEY itself; kept as a single test so the
    // mutation cannot race a parallel sibling.
    #[test]
    fn from_env_requires_api_key() {
        std::env::remove_var(API_KEY_ENV);
        assert!(GroqProvider::from_env(None, 5)
            .expect("no client error")
            .is_none());

        std::env::set_var(API_KEY_ENV, "gsk_test");
        let provider = GroqProvider::from_env(Some("custom-model".into()), 5)
            .expect("client builds")
            .expect("provider present");
        assert_eq!(provider.model(), "custom-model");
        std::env::remove_var(API_KEY_ENV);
    }
}
