//! Configuration types for document risk analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across requests, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::DocRiskError;
use crate::provider::CompletionProvider;
use crate::store::ReportStore;
use std::fmt;
use std::sync::Arc;

/// Configuration for a document risk analysis.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use docrisk::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .max_chunks(3)
///     .model("llama3-70b-8192")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Maximum accepted upload size in bytes. Default: 10 MiB.
    ///
    /// Checked before extraction; larger inputs are rejected with
    /// [`DocRiskError::OversizedInput`] and never touch the parser.
    pub max_input_bytes: usize,

    /// Maximum characters per chunk sent to the model. Default: 7000.
    ///
    /// Sized so a chunk plus prompt scaffolding fits comfortably inside an
    /// 8K-context model. Raising it reduces the number of round-trips but
    /// risks truncated completions on dense documents.
    pub chunk_chars: usize,

    /// Character overlap between consecutive chunks. Default: 400.
    ///
    /// A clause split across a chunk boundary still appears whole in at
    /// least one chunk, so boundary-straddling findings are not lost.
    /// Must be smaller than `chunk_chars`.
    pub chunk_overlap: usize,

    /// How many chunks (from the start of the document) are analyzed.
    /// Default: 3.
    ///
    /// Only the beginning of a long document is analyzed in the default
    /// configuration. This is a deliberate cost/latency trade-off: contracts
    /// and policies put definitions and obligations up front, and 3 chunks
    /// already cover ~20K characters. Raise it for exhaustive sweeps.
    pub max_chunks: usize,

    /// Model identifier, e.g. "llama3-70b-8192". If None, uses the
    /// provider's default.
    pub model: Option<String>,

    /// Pre-constructed completion provider. If None, one is built from the
    /// environment (`GROQ_API_KEY`) at analysis time.
    pub provider: Option<Arc<dyn CompletionProvider>>,

    /// Report store for best-effort persistence. If None, results are not
    /// persisted.
    pub store: Option<Arc<dyn ReportStore>>,

    /// Owner recorded on persisted reports. Default: "anonymous".
    pub user_id: String,

    /// Sampling temperature for the first attempt on each chunk.
    /// Default: 0.2.
    ///
    /// Low temperature keeps the model close to the document text. Retries
    /// always run at 0.0 regardless of this setting.
    pub temperature: f32,

    /// Maximum tokens the model may generate per chunk. Default: 2048.
    pub max_tokens: usize,

    /// Retry attempts per chunk after the first failure. Default: 1.
    ///
    /// Every retry uses the stricter prompt pair at temperature 0.0 on a
    /// shortened chunk prefix. The default of 1 means each chunk gets one
    /// standard attempt plus one strict retry before the analysis fails.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff).
    /// Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s. A rate-limit reply
    /// that names its own delay overrides the computed backoff.
    pub retry_backoff_ms: u64,

    /// Custom system prompt for the first attempt. If None, uses the
    /// built-in default.
    pub system_prompt: Option<String>,

    /// Per-completion-call timeout in seconds, applied when the provider is
    /// built from the environment. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 10 * 1024 * 1024,
            chunk_chars: 7000,
            chunk_overlap: 400,
            max_chunks: 3,
            model: None,
            provider: None,
            store: None,
            user_id: "anonymous".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            max_retries: 1,
            retry_backoff_ms: 500,
            system_prompt: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("max_input_bytes", &self.max_input_bytes)
            .field("chunk_chars", &self.chunk_chars)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("max_chunks", &self.max_chunks)
            .field("model", &self.model)
            .field(
                "provider",
                &self.provider.as_ref().map(|_| "<dyn CompletionProvider>"),
            )
            .field("store", &self.store.as_ref().map(|_| "<dyn ReportStore>"))
            .field("user_id", &self.user_id)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn max_input_bytes(mut self, n: usize) -> Self {
        self.config.max_input_bytes = n.max(1);
        self
    }

    pub fn chunk_chars(mut self, n: usize) -> Self {
        self.config.chunk_chars = n.max(1);
        self
    }

    pub fn chunk_overlap(mut self, n: usize) -> Self {
        self.config.chunk_overlap = n;
        self
    }

    pub fn max_chunks(mut self, n: usize) -> Self {
        self.config.max_chunks = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.config.store = Some(store);
        self
    }

    pub fn user_id(mut self, user: impl Into<String>) -> Self {
        self.config.user_id = user.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    /// Clamped to at most 5: a model that failed five strict retries in a
    /// row is not going to succeed on the sixth.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(5);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, DocRiskError> {
        let c = &self.config;
        if c.chunk_chars == 0 {
            return Err(DocRiskError::InvalidConfig(
                "chunk_chars must be ≥ 1".into(),
            ));
        }
        if c.chunk_overlap >= c.chunk_chars {
            return Err(DocRiskError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_chars ({})",
                c.chunk_overlap, c.chunk_chars
            )));
        }
        if c.max_chunks == 0 {
            return Err(DocRiskError::InvalidConfig("max_chunks must be ≥ 1".into()));
        }
        if c.user_id.trim().is_empty() {
            return Err(DocRiskError::InvalidConfig(
                "user_id must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}
