//! Streaming analysis API: progress events as the pipeline runs.
//!
//! ## Why stream?
//!
//! A three-chunk analysis means three model round-trips, easily many seconds
//! of wall clock. The streaming API surfaces each stage as it happens so a
//! web handler can relay server-sent events or a CLI can animate a progress
//! bar while the requests run.
//!
//! Unlike the eager [`crate::analyze::analyze_document`] which returns only
//! after everything finishes, [`analyze_document_with_progress`] yields
//! [`ProgressEvent`] items in pipeline order and always closes with exactly
//! one terminal event: `Done { analysis }` on success, `Error { message }`
//! otherwise.

use crate::analyze;
use crate::config::AnalysisConfig;
use crate::progress::ProgressEvent;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

/// A boxed stream of progress events.
pub type ProgressStream = Pin<Box<dyn Stream<Item = ProgressEvent> + Send>>;

/// Events the producer can buffer ahead of a slow consumer.
const EVENT_BUFFER: usize = 16;

/// Analyze PDF bytes, streaming progress events as the pipeline runs.
///
/// The analysis runs on a spawned task, so this must be called inside a
/// Tokio runtime. Dropping the stream stops event delivery but does not
/// cancel an in-flight model call.
///
/// # Arguments
/// * `bytes`    — Raw PDF file contents
/// * `doc_name` — Display name recorded on the result
/// * `config`   — Analysis configuration
///
/// # Example
/// ```rust,no_run
/// use docrisk::{analyze_document_with_progress, AnalysisConfig, ProgressEvent};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("contract.pdf")?;
/// let mut events =
///     analyze_document_with_progress(bytes, "contract.pdf", AnalysisConfig::default());
/// while let Some(event) = events.next().await {
///     match event {
///         ProgressEvent::Done { analysis } => {
///             println!("risk {:.1}", analysis.report.overall_risk);
///         }
///         ProgressEvent::Error { message } => eprintln!("failed: {message}"),
///         other => println!("{}...", other.stage()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn analyze_document_with_progress(
    bytes: Vec<u8>,
    doc_name: impl Into<String>,
    config: AnalysisConfig,
) -> ProgressStream {
    let doc_name = doc_name.into();
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        let outcome = analyze::run_pipeline(&bytes, &doc_name, &config, Some(&tx)).await;
        let terminal = match outcome {
            Ok(analysis) => ProgressEvent::Done { analysis },
            Err(e) => ProgressEvent::Error {
                message: e.to_string(),
            },
        };
        let _ = tx.send(terminal).await;
    });

    Box::pin(ReceiverStream::new(rx))
}
