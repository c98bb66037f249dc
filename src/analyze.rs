//! Eager (full-document) analysis entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: run the whole pipeline, then return
//! one [`Analysis`]. Use [`crate::stream::analyze_document_with_progress`]
//! instead when the caller should see stage-by-stage progress, e.g. a web
//! handler relaying events to a browser while the model calls run.

use crate::config::AnalysisConfig;
use crate::error::DocRiskError;
use crate::pipeline::{chunk, extract, llm, merge};
use crate::progress::ProgressEvent;
use crate::provider::{self, CompletionProvider};
use crate::report::{Analysis, Report};
use crate::rules;
use chrono::Utc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Recorded on results when the caller passes an empty document name.
const DEFAULT_DOC_NAME: &str = "document.pdf";

/// Analyze a PDF document for compliance risks.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `bytes`    — Raw PDF file contents
/// * `doc_name` — Display name recorded on the result; an empty name becomes
///   `"document.pdf"`
/// * `config`   — Analysis configuration
///
/// # Returns
/// `Ok(Analysis)` carrying the normalized report plus request metadata.
/// Persistence problems never fail the call: if a store is configured and
/// the save fails, the failure is logged and the analysis still returns.
///
/// # Errors
/// Returns `Err(DocRiskError)` when no report can be produced:
/// - input larger than `config.max_input_bytes`
/// - no extractable text (scanned images, encryption, not a PDF)
/// - no provider configured and none available from the environment
/// - a chunk that failed every retry
pub async fn analyze_document(
    bytes: &[u8],
    doc_name: &str,
    config: &AnalysisConfig,
) -> Result<Analysis, DocRiskError> {
    run_pipeline(bytes, doc_name, config, None).await
}

/// Analyze pre-chunked text and return the merged [`Report`].
///
/// Applies the same chunk budget (`config.max_chunks`), sequential
/// processing, and merge semantics as [`analyze_document`], but starts from
/// text the caller already extracted and split. An empty slice is
/// [`DocRiskError::NoContent`].
pub async fn analyze_chunks(
    provider: &dyn CompletionProvider,
    config: &AnalysisConfig,
    chunks: &[String],
) -> Result<Report, DocRiskError> {
    run_chunks(provider, config, chunks, None).await
}

/// The shared pipeline behind the eager and streaming entry points.
///
/// `progress` is the streaming surface's event channel; `None` skips event
/// emission entirely. Terminal events (`Done`/`Error`) are the caller's
/// responsibility, so this function stays a plain `Result` producer.
pub(crate) async fn run_pipeline(
    bytes: &[u8],
    doc_name: &str,
    config: &AnalysisConfig,
    progress: Option<&mpsc::Sender<ProgressEvent>>,
) -> Result<Analysis, DocRiskError> {
    let total_start = Instant::now();
    let doc_name = if doc_name.trim().is_empty() {
        DEFAULT_DOC_NAME
    } else {
        doc_name
    };
    info!("Starting analysis: {} ({} bytes)", doc_name, bytes.len());

    // ── Step 1: Size gate ────────────────────────────────────────────────
    if bytes.len() > config.max_input_bytes {
        return Err(DocRiskError::OversizedInput {
            size: bytes.len(),
            limit: config.max_input_bytes,
        });
    }
    emit(
        progress,
        ProgressEvent::Ingest {
            doc_name: doc_name.to_string(),
            size: bytes.len(),
        },
    )
    .await;

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = provider::resolve(config)?;

    // ── Step 3: Extract text ─────────────────────────────────────────────
    let (text, pages) = extract::extract_text(bytes);
    if text.trim().is_empty() {
        return Err(DocRiskError::ExtractionFailed);
    }
    let chars = text.chars().count();
    info!("Extracted {} chars across {} pages", chars, pages);
    emit(progress, ProgressEvent::Extract { pages, chars }).await;

    // ── Step 4: Chunk ────────────────────────────────────────────────────
    let chunks = chunk::chunk_text(&text, config.chunk_chars, config.chunk_overlap);
    debug!(
        "Split into {} chunks of at most {} chars",
        chunks.len(),
        config.chunk_chars
    );

    // ── Step 5: Analyze chunks ───────────────────────────────────────────
    let budget = config.max_chunks.min(chunks.len());
    let report = run_chunks(provider.as_ref(), config, &chunks, progress).await?;

    // ── Step 6: Persist (best effort) ────────────────────────────────────
    if let Some(store) = &config.store {
        match store.save(&report, &config.user_id, doc_name) {
            Ok(id) => debug!("Saved report {} for user {}", id, config.user_id),
            Err(e) => warn!("Could not persist report: {}", e),
        }
    }

    let analysis = Analysis {
        report,
        doc_name: doc_name.to_string(),
        pages,
        chunks_analyzed: budget,
        duration_ms: total_start.elapsed().as_millis() as u64,
        created_at_ms: Utc::now().timestamp_millis(),
    };
    info!(
        "Analysis complete: {} flags, risk {:.2}, {}ms",
        analysis.report.flags.len(),
        analysis.report.overall_risk,
        analysis.duration_ms
    );
    Ok(analysis)
}

/// Run the budgeted chunks sequentially and merge their reports.
///
/// The first chunk to exhaust its retries aborts the whole analysis; partial
/// results are discarded rather than silently presented as complete.
async fn run_chunks(
    provider: &dyn CompletionProvider,
    config: &AnalysisConfig,
    chunks: &[String],
    progress: Option<&mpsc::Sender<ProgressEvent>>,
) -> Result<Report, DocRiskError> {
    if chunks.is_empty() {
        return Err(DocRiskError::NoContent);
    }

    let budget = config.max_chunks.min(chunks.len());
    let mut reports = Vec::with_capacity(budget);
    for (index, text) in chunks.iter().take(budget).enumerate() {
        emit(
            progress,
            ProgressEvent::Analyze {
                chunk: index + 1,
                total: budget,
            },
        )
        .await;

        let relevant = rules::relevant_rules(text);
        debug!(
            "Chunk {}/{}: {} chars, {} relevant rules",
            index + 1,
            budget,
            text.chars().count(),
            relevant.len()
        );
        let report = llm::analyze_chunk(provider, config, index, text, &relevant)
            .await
            .map_err(|source| DocRiskError::Analysis {
                chunk: index,
                source,
            })?;
        reports.push(report);
    }

    Ok(merge::merge_reports(reports))
}

/// Send an event when a channel is attached. A dropped receiver just means
/// nobody is watching anymore, so send failures are ignored.
async fn emit(progress: Option<&mpsc::Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = progress {
        let _ = tx.send(event).await;
    }
}
