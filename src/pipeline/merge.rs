//! Merging per-chunk reports into one document-level report.
//!
//! Each analyzed chunk yields its own [`Report`]. The caller wants a single
//! answer for the document, so the per-chunk results are folded back
//! together here:
//!
//! - **flags** concatenate in chunk order, which is document order.
//! - **summaries** join with a blank line between them; chunks that had
//!   nothing to say (empty or whitespace summary) are skipped. When no
//!   chunk produced a summary the merged report falls back to
//!   [`DEFAULT_SUMMARY`].
//! - **overall_risk** is the arithmetic mean of the per-chunk scores,
//!   rounded to two decimals.
//!
//! The merged draft then runs through the same final normalization pass as
//! a single-chunk report. A merge can pair a zeroed risk with real flags
//! (the mean of zeros is zero), and per-flag bounds must hold on the
//! document-level report no matter what the inputs contained.

use crate::pipeline::normalize;
use crate::report::Report;

/// Summary used when no chunk produced one.
pub const DEFAULT_SUMMARY: &str = "No significant risks identified.";

/// Fold per-chunk reports into a single document-level [`Report`].
///
/// An empty input yields an empty report with [`DEFAULT_SUMMARY`] and a
/// risk of 0. Analysis gates on content before it gets here, so that case
/// only arises when merging is driven directly.
pub fn merge_reports(reports: Vec<Report>) -> Report {
    let count = reports.len();
    let mut flags = Vec::new();
    let mut summaries = Vec::new();
    let mut risk_sum = 0.0;

    for report in reports {
        let summary = report.summary.trim();
        if !summary.is_empty() {
            summaries.push(summary.to_owned());
        }
        risk_sum += report.overall_risk;
        flags.extend(report.flags);
    }

    let summary = if summaries.is_empty() {
        DEFAULT_SUMMARY.to_owned()
    } else {
        summaries.join("\n\n")
    };
    let overall_risk = if count == 0 {
        0.0
    } else {
        normalize::round2(risk_sum / count as f64)
    };

    let mut merged = Report {
        summary,
        overall_risk,
        flags,
    };
    normalize::finalize(&mut merged);
    merged
}
