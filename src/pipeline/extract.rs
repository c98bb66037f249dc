//! Text extraction: PDF bytes → plain text plus a page count.
//!
//! Two extraction backends run in order:
//!
//! 1. **pdf_extract** — better text shaping, understands more font
//!    encodings. It can panic on malformed input (rather than returning
//!    errors), so the call is wrapped in [`std::panic::catch_unwind`].
//! 2. **lopdf** — stricter object-level parser that survives some files the
//!    primary path chokes on; text comes from its content-stream walker,
//!    page by page when the bulk call fails.
//!
//! Both failing is not an error at this stage. The function returns empty
//! text and zero pages and the caller decides what that means (downstream it
//! becomes [`crate::error::DocRiskError::ExtractionFailed`]).

use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Extract plain text and a page count from PDF bytes.
///
/// Tries the primary extractor first; any failure, panic, or empty result
/// falls through silently to the fallback. Never errors and never panics:
/// total failure yields `("", 0)`.
pub fn extract_text(bytes: &[u8]) -> (String, usize) {
    if let Some((text, pages)) = extract_primary(bytes) {
        if !text.trim().is_empty() {
            debug!(pages, chars = text.len(), "primary extractor succeeded");
            return (text, pages);
        }
    }
    debug!("primary extractor produced nothing, trying fallback");

    if let Some((text, pages)) = extract_fallback(bytes) {
        if !text.trim().is_empty() {
            debug!(pages, chars = text.len(), "fallback extractor succeeded");
            return (text, pages);
        }
    }

    (String::new(), 0)
}

// ── Primary: pdf_extract ─────────────────────────────────────────────────

/// One string per page via pdf_extract, panics converted to `None`.
fn extract_primary(bytes: &[u8]) -> Option<(String, usize)> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));
    match outcome {
        Ok(Ok(pages)) => {
            let count = pages.len();
            let text = join_pages(pages.iter().map(String::as_str));
            Some((text, count))
        }
        Ok(Err(e)) => {
            debug!(error = %e, "pdf_extract failed");
            None
        }
        Err(_) => {
            debug!("pdf_extract panicked on malformed input");
            None
        }
    }
}

// ── Fallback: lopdf ──────────────────────────────────────────────────────

fn extract_fallback(bytes: &[u8]) -> Option<(String, usize)> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "lopdf could not load document");
            return None;
        }
    };

    let pages = doc.get_pages();
    let count = pages.len();
    if count == 0 {
        return Some((String::new(), 0));
    }

    let mut page_numbers: Vec<u32> = pages.keys().copied().collect();
    page_numbers.sort_unstable();

    // Bulk extraction first; one broken page otherwise poisons the whole
    // document, so fall back to page-at-a-time and keep what works.
    let text = match doc.extract_text(&page_numbers) {
        Ok(t) => t,
        Err(_) => {
            let parts: Vec<String> = page_numbers
                .iter()
                .filter_map(|n| doc.extract_text(&[*n]).ok())
                .collect();
            join_pages(parts.iter().map(String::as_str))
        }
    };

    Some((text, count))
}

/// Join page texts with a blank line, skipping pages with no content.
fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for page in pages {
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(page);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_empty() {
        let (text, pages) = extract_text(b"definitely not a pdf");
        assert_eq!(text, "");
        assert_eq!(pages, 0);
    }

    #[test]
    fn empty_input_yields_empty() {
        let (text, pages) = extract_text(b"");
        assert_eq!(text, "");
        assert_eq!(pages, 0);
    }

    #[test]
    fn header_only_pdf_yields_empty() {
        let (text, pages) = extract_text(b"%PDF-1.4\n%%EOF\n");
        assert_eq!(text, "");
        assert_eq!(pages, 0);
    }

    #[test]
    fn join_pages_skips_blank_pages() {
        let pages = ["first page", "   ", "third page"];
        let joined = join_pages(pages.iter().copied());
        assert_eq!(joined, "first page\n\nthird page");
    }
}
