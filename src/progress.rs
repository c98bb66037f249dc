//! Progress events emitted while a document analysis runs.
//!
//! [`crate::analyze_document_with_progress`] yields these over a stream so a
//! caller can show live status: a web handler frames them as server-sent
//! events, a CLI drives a progress bar, a test asserts on ordering.
//!
//! # Why a tagged enum instead of callbacks?
//!
//! Events are data. Serializing each one with a `stage` tag lets a transport
//! layer frame them without knowing the enum, and lets consumers on the
//! other side of a process boundary (browsers, log pipelines) dispatch on a
//! plain string field. A callback trait would trap the information inside
//! the process that produced it.
//!
//! # Ordering contract
//!
//! Per analysis: `Ingest`, then `Extract`, then one `Analyze` per chunk sent
//! to the model, then exactly one terminal event (`Done` on success, `Error`
//! otherwise). A request that fails early skips straight to `Error`; the
//! terminal event is never duplicated and never absent.
//!
//! # Example
//!
//! ```rust
//! use docrisk::ProgressEvent;
//!
//! let event = ProgressEvent::Analyze { chunk: 1, total: 3 };
//! let wire = serde_json::to_string(&event).unwrap();
//! assert_eq!(wire, r#"{"stage":"analyze","chunk":1,"total":3}"#);
//! ```

use crate::report::Analysis;
use serde::{Deserialize, Serialize};

/// One step of a running document analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The upload passed the size gate and analysis has begun.
    Ingest {
        /// Name the caller gave the document.
        doc_name: String,
        /// Input size in bytes.
        size: usize,
    },
    /// Text extraction finished.
    Extract {
        /// Page count seen by the extractor (0 if unknown).
        pages: usize,
        /// Characters of extracted text.
        chars: usize,
    },
    /// A chunk is about to be sent to the model.
    Analyze {
        /// 1-based index of the chunk being analyzed.
        chunk: usize,
        /// Total chunks that will be analyzed (after the budget cap).
        total: usize,
    },
    /// Terminal: the analysis succeeded.
    Done {
        /// The full analysis outcome, report included.
        analysis: Analysis,
    },
    /// Terminal: the analysis failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl ProgressEvent {
    /// The wire name of this event's stage.
    pub fn stage(&self) -> &'static str {
        match self {
            ProgressEvent::Ingest { .. } => "ingest",
            ProgressEvent::Extract { .. } => "extract",
            ProgressEvent::Analyze { .. } => "analyze",
            ProgressEvent::Done { .. } => "done",
            ProgressEvent::Error { .. } => "error",
        }
    }

    /// True for the events that end a stream (`Done` and `Error`).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Done { .. } | ProgressEvent::Error { .. }
        )
    }
}
