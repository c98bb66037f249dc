//! Report data model: the validated output of a document analysis.
//!
//! These shapes are the crate's wire contract. The model is asked to emit
//! them directly, but nothing it emits is trusted: every bound documented
//! here (severity range, quote length, risk range) is enforced by
//! [`crate::pipeline::normalize`] before a [`Report`] reaches a caller,
//! a store, or a progress event. A `Report` is immutable once normalized.

use serde::{Deserialize, Serialize};

/// A literal excerpt from the document supporting a [`Flag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// 1-based page number the quote was found on.
    pub page: u32,
    /// Verbatim quote, at most [`Evidence::MAX_QUOTE_CHARS`] characters.
    pub quote: String,
}

impl Evidence {
    /// Stored quotes never exceed this many characters.
    pub const MAX_QUOTE_CHARS: usize = 600;
}

/// One identified compliance risk finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// Short finding title.
    pub title: String,
    /// Severity from 1 (informational) to 5 (critical).
    pub severity: u8,
    /// Why this finding is a compliance concern.
    pub why_it_matters: String,
    /// Suggested remediation.
    pub recommendation: String,
    /// Supporting excerpts, in document order.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl Flag {
    pub const MIN_SEVERITY: u8 = 1;
    pub const MAX_SEVERITY: u8 = 5;
}

/// A validated analysis report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Prose summary of the findings.
    pub summary: String,
    /// 0–100 risk score; derived from flag severities when the model omits
    /// or zeroes it.
    pub overall_risk: f64,
    /// Findings in document order.
    #[serde(default)]
    pub flags: Vec<Flag>,
}

impl Report {
    pub const MAX_RISK: f64 = 100.0;
}

/// Outcome of a full document analysis: the report plus request metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// The normalized report.
    pub report: Report,
    /// Name the caller gave the document.
    pub doc_name: String,
    /// Page count seen by the extractor (0 if unknown).
    pub pages: usize,
    /// How many chunks were actually sent to the model.
    pub chunks_analyzed: usize,
    /// Wall-clock duration of the whole analysis.
    pub duration_ms: u64,
    /// Unix epoch milliseconds at completion.
    pub created_at_ms: i64,
}

/// A persisted report row, as returned by a store listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Store-assigned row id.
    pub id: i64,
    /// Owner the report was saved under.
    pub user_id: String,
    /// Document name at save time.
    pub doc_name: String,
    /// The saved report.
    pub report: Report,
    /// Unix epoch milliseconds at save time.
    pub created_at_ms: i64,
}
