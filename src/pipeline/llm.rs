//! Model interaction: build the prompt pair, call the provider, normalize.
//!
//! This module converts one text chunk into a completion call and returns a
//! schema-valid [`Report`]. It is intentionally thin — all prompt wording
//! lives in [`crate::prompts`] and all output repair in
//! [`crate::pipeline::normalize`], so retry policy can change without
//! touching either.
//!
//! ## Retry Strategy
//!
//! Every failure of a full invoke-and-normalize attempt consumes one unit of
//! the retry budget, whether the provider errored, the completion was empty,
//! or no JSON object could be salvaged. Retries switch to the strict prompt
//! pair at temperature 0.0 with a truncated chunk: a model that rambled past
//! its token budget or wrapped JSON in prose usually complies when asked
//! tersely for less. Exponential backoff (`retry_backoff_ms * 2^(attempt-1)`)
//! spaces the attempts; a rate-limit `retry-after` hint overrides it.

use crate::config::AnalysisConfig;
use crate::error::{ChunkError, ProviderError};
use crate::pipeline::normalize;
use crate::prompts;
use crate::provider::{CompletionProvider, CompletionRequest};
use crate::report::Report;
use crate::rules::ComplianceRule;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Sampling temperature for strict retries.
const STRICT_TEMPERATURE: f32 = 0.0;

/// Analyze one chunk: invoke the model, normalize the output, retry with the
/// stricter prompt pair on failure.
///
/// `chunk_index` is zero-based and appears only in logs and errors. Returns
/// the last [`ChunkError`] once the retry budget is spent; the caller wraps
/// it into the terminal analysis failure.
pub async fn analyze_chunk(
    provider: &dyn CompletionProvider,
    config: &AnalysisConfig,
    chunk_index: usize,
    chunk: &str,
    relevant: &[&ComplianceRule],
) -> Result<Report, ChunkError> {
    let mut last_err: Option<ChunkError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt, last_err.as_ref());
            warn!(
                "Chunk {}: retry {}/{} after {}ms",
                chunk_index, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let request = build_request(config, chunk, relevant, attempt > 0);

        match run_attempt(provider, &request).await {
            Ok(report) => {
                debug!(
                    "Chunk {}: valid report with {} flag(s) on attempt {}",
                    chunk_index,
                    report.flags.len(),
                    attempt + 1
                );
                return Ok(report);
            }
            Err(e) => {
                warn!(
                    "Chunk {}: attempt {} failed: {}",
                    chunk_index,
                    attempt + 1,
                    e
                );
                last_err = Some(e);
            }
        }
    }

    // The loop always runs at least once, so an error is recorded.
    Err(last_err.unwrap_or(ChunkError::EmptyResponse))
}

/// One invoke-and-normalize attempt.
async fn run_attempt(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
) -> Result<Report, ChunkError> {
    let raw = provider.complete(request).await?;
    if raw.trim().is_empty() {
        return Err(ChunkError::EmptyResponse);
    }
    normalize::normalize_report(&raw)
}

/// Assemble the request for one attempt. First attempts use the standard
/// prompt pair (honoring a config override of the system prompt); retries
/// use the strict pair with the truncated chunk.
fn build_request(
    config: &AnalysisConfig,
    chunk: &str,
    relevant: &[&ComplianceRule],
    strict: bool,
) -> CompletionRequest {
    let (system, user, temperature) = if strict {
        let (system, user) = prompts::build_strict_prompts(chunk);
        (system, user, STRICT_TEMPERATURE)
    } else {
        let (default_system, user) = prompts::build_prompts(chunk, relevant);
        let system = config.system_prompt.clone().unwrap_or(default_system);
        (system, user, config.temperature)
    };

    CompletionRequest {
        system,
        user,
        temperature,
        max_tokens: config.max_tokens,
    }
}

/// Milliseconds to wait before retry `attempt` (1-based). A rate-limit
/// `retry-after` hint from the previous failure wins over the exponential
/// schedule.
fn backoff_ms(base_ms: u64, attempt: u32, last_err: Option<&ChunkError>) -> u64 {
    if let Some(ChunkError::Provider(ProviderError::RateLimited {
        retry_after_secs: Some(secs),
    })) = last_err
    {
        return secs.saturating_mul(1000);
    }
    base_ms * 2u64.pow(attempt - 1)
}
