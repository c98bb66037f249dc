//! Error types for the docrisk library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocRiskError`] — **Fatal**: the analysis cannot proceed or complete
//!   (oversized upload, no extractable text, a chunk exhausted its retries).
//!   Returned as `Err(DocRiskError)` from the top-level `analyze_*` functions.
//!
//! * [`ChunkError`] — **Retryable**: one invoke-and-normalize attempt on one
//!   chunk failed (provider hiccup, empty completion, unsalvageable output).
//!   The retry loop in [`crate::pipeline::llm`] consumes these internally;
//!   only the last one surfaces, wrapped in [`DocRiskError::Analysis`].
//!
//! Transport-level failures from a completion backend are [`ProviderError`];
//! persistence failures are [`StoreError`] and are never fatal — the store is
//! best-effort, so callers log them and return the analysis anyway.

use thiserror::Error;

/// All fatal errors returned by the docrisk library.
///
/// Per-attempt chunk failures use [`ChunkError`] and reach this enum only
/// after the retry budget is spent.
#[derive(Debug, Error)]
pub enum DocRiskError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Upload exceeds the configured byte limit. Rejected before any
    /// processing; the client must resubmit a smaller document.
    #[error("Document is too large: {size} bytes (limit {limit})\nResubmit a smaller file or raise max_input_bytes.")]
    OversizedInput { size: usize, limit: usize },

    /// Both extraction methods failed or produced no text.
    #[error("Could not extract any text from the document\nThe file may be scanned images, encrypted, or not a PDF.")]
    ExtractionFailed,

    /// The chunk sequence is empty, so there is nothing to analyze.
    #[error("Document contains no analyzable text")]
    NoContent,

    // ── Analysis errors ───────────────────────────────────────────────────
    /// A chunk failed every attempt; `chunk` is its zero-based position.
    #[error("Analysis failed on chunk {chunk}: {source}")]
    Analysis {
        chunk: usize,
        #[source]
        source: ChunkError,
    },

    /// No completion provider was injected and none could be built from the
    /// environment.
    #[error("No completion provider is configured.\nInject one with AnalysisConfigBuilder::provider(..) or set GROQ_API_KEY.")]
    MissingProvider,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A single failed invoke-and-normalize attempt on one chunk.
///
/// The retry loop turns any of these into another attempt with the stricter
/// prompt pair; the last one is wrapped in [`DocRiskError::Analysis`].
#[derive(Debug, Clone, Error)]
pub enum ChunkError {
    /// The completion backend failed (network, auth, rate limit, 5xx).
    #[error("completion request failed: {0}")]
    Provider(#[from] ProviderError),

    /// The backend answered but the completion text was empty.
    #[error("model returned an empty completion")]
    EmptyResponse,

    /// No JSON object could be salvaged from the model output, even after
    /// fence stripping, brace-span extraction, and trailing-comma repair.
    #[error("unparseable model output: {detail}")]
    Unparseable { detail: String },
}

/// Transport-level failure from a completion backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Connection, DNS, TLS, or timeout failure before an HTTP status.
    #[error("network error: {detail}")]
    Network { detail: String },

    /// HTTP 429 — caller should back off.
    ///
    /// Check `retry_after_secs` for a server-specified delay, or use
    /// exponential backoff if `None`.
    #[error("rate limited by completion service")]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP 401/403 — retry will not help, the key is bad.
    #[error("authentication rejected: {detail}")]
    Auth { detail: String },

    /// Any other non-success HTTP status.
    #[error("completion service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body did not carry a completion.
    #[error("malformed completion payload: {0}")]
    MalformedResponse(String),
}

/// Persistence failure. Best-effort only: logged at WARN by the pipeline and
/// never surfaced to the analysis caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure (open, migrate, insert, query).
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Could not create the parent directory for the database file.
    #[error("could not prepare database path: {0}")]
    Io(#[from] std::io::Error),

    /// Report fields could not be serialized for storage.
    #[error("could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_display_names_both_sizes() {
        let e = DocRiskError::OversizedInput {
            size: 11_534_336,
            limit: 10_485_760,
        };
        let msg = e.to_string();
        assert!(msg.contains("11534336"), "got: {msg}");
        assert!(msg.contains("10485760"), "got: {msg}");
    }

    #[test]
    fn analysis_display_names_chunk_and_cause() {
        let e = DocRiskError::Analysis {
            chunk: 2,
            source: ChunkError::Unparseable {
                detail: "no braces".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("chunk 2"), "got: {msg}");
        assert!(msg.contains("no braces"), "got: {msg}");
    }

    #[test]
    fn rate_limit_display_with_retry() {
        let e = ProviderError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn rate_limit_display_without_retry() {
        let e = ProviderError::RateLimited {
            retry_after_secs: None,
        };
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn provider_error_wraps_into_chunk_error() {
        let e: ChunkError = ProviderError::Api {
            status: 503,
            message: "overloaded".into(),
        }
        .into();
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("overloaded"), "got: {msg}");
    }

    #[test]
    fn empty_response_display() {
        assert!(ChunkError::EmptyResponse.to_string().contains("empty"));
    }
}
