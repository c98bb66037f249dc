//! Normalization: salvage a schema-valid [`Report`] from arbitrary model text.
//!
//! ## Why is normalization necessary?
//!
//! The model is an untrusted text source. Even when the prompt demands
//! "return ONLY the JSON object", completions arrive:
//!
//! - wrapped in ` ```json ... ``` ` fences despite the prompt
//! - prefixed with prose ("Here is the compliance report:")
//! - with trailing commas before a closing `}` or `]`
//! - with `severity` 0, 7, `"three"`, or null
//! - with evidence quotes thousands of characters long
//! - with `overall_risk` missing, `""`, or 150
//!
//! This module turns all of that into a valid [`Report`], or gives up with a
//! single [`ChunkError::Unparseable`] when no JSON object can be salvaged at
//! all. Every numeric and length bound is enforced redundantly: the final
//! pass re-clamps values that already passed strict validation, because more
//! than one call path feeds reports into stores and responses and no single
//! layer can be trusted to be the only one executed.
//!
//! ## Step order
//!
//! 1. Strip a leading ` ```lang ` fence and a trailing ` ``` ` fence
//! 2. Cut the candidate to the outermost brace span (first `{` .. last `}`)
//! 3. Strict JSON parse; on failure strip trailing commas and re-parse
//! 4. Coerce the loose tree: missing `flags` → `[]`, blank `overall_risk` → 0
//! 5. Strict schema deserialize, falling back to per-field lenient coercion
//! 6. Derive `overall_risk` from severities when it is zero or absent
//! 7. Final clamp pass over severity, page, quote length, and risk

use crate::error::ChunkError;
use crate::report::{Evidence, Flag, Report};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Normalize raw model output into a valid [`Report`].
///
/// Fails only with [`ChunkError::Unparseable`], and only when no JSON object
/// survives fence stripping, brace-span extraction, and trailing-comma
/// repair. Everything else — wrong types, out-of-range numbers, oversized
/// quotes, missing fields — is coerced locally and never propagates.
pub fn normalize_report(raw: &str) -> Result<Report, ChunkError> {
    let mut value = salvage_json(raw)?;
    coerce_shape(&mut value);

    let mut report = match Report::deserialize(&value) {
        Ok(report) => report,
        Err(_) => lenient_report(&value),
    };

    finalize(&mut report);
    Ok(report)
}

/// Enforce every report bound in place: severity and page ranges, quote
/// length, and the 0–100 risk score (derived from severities when the model
/// zeroed or omitted it). Running it on an already-valid report changes
/// nothing, so callers may apply it at every write path.
pub(crate) fn finalize(report: &mut Report) {
    for flag in &mut report.flags {
        flag.severity = flag.severity.clamp(Flag::MIN_SEVERITY, Flag::MAX_SEVERITY);
        for evidence in &mut flag.evidence {
            evidence.page = evidence.page.max(1);
            truncate_chars(&mut evidence.quote, Evidence::MAX_QUOTE_CHARS);
        }
    }

    if !report.overall_risk.is_finite() || report.overall_risk <= 0.0 {
        report.overall_risk = derived_risk(&report.flags);
    }
    report.overall_risk = report.overall_risk.clamp(0.0, Report::MAX_RISK);
}

/// `mean(severity) / 5 * 100`, rounded to 2 decimals; 0.0 with no flags.
///
/// Severities are clamped before this runs, so the result is always within
/// 20–100 for a non-empty flag list.
fn derived_risk(flags: &[Flag]) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }
    let mean = flags.iter().map(|f| f64::from(f.severity)).sum::<f64>() / flags.len() as f64;
    round2(mean / f64::from(Flag::MAX_SEVERITY) * 100.0)
}

/// Round to 2 decimal places.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ── Steps 1–3: salvage a JSON object from raw text ───────────────────────

static RE_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```[A-Za-z]*").unwrap());
static RE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").unwrap());
static RE_TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Extract and parse the most plausible JSON object in `raw`.
fn salvage_json(raw: &str) -> Result<Value, ChunkError> {
    let trimmed = raw.trim();
    let no_open = RE_FENCE_OPEN.replace(trimmed, "");
    let no_fences = RE_FENCE_CLOSE.replace(no_open.as_ref(), "");
    let candidate = brace_span(no_fences.as_ref()).unwrap_or(no_fences.as_ref());

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(parse_err) => {
            let repaired = RE_TRAILING_COMMA.replace_all(candidate, "$1");
            serde_json::from_str::<Value>(repaired.as_ref()).map_err(|_| {
                ChunkError::Unparseable {
                    detail: parse_err.to_string(),
                }
            })?
        }
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(ChunkError::Unparseable {
            detail: "top-level JSON value is not an object".into(),
        })
    }
}

/// First `{` through last `}` inclusive, when both exist in that order.
fn brace_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end >= start).then(|| &s[start..=end])
}

// ── Step 4: shape coercion on the loose tree ─────────────────────────────

/// Fill in the two fields strict validation insists on: `flags` (missing or
/// null becomes `[]`) and `overall_risk` (missing, null, or blank becomes a
/// provisional 0, re-derived later).
fn coerce_shape(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    match obj.get("flags") {
        None | Some(Value::Null) => {
            obj.insert("flags".to_string(), Value::Array(Vec::new()));
        }
        _ => {}
    }

    let risk_blank = match obj.get("overall_risk") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    };
    if risk_blank {
        obj.insert("overall_risk".to_string(), Value::from(0.0));
    }
}

// ── Step 5 fallback: per-field lenient coercion ──────────────────────────

/// Build a report from whatever fields are usable, defaulting the rest.
fn lenient_report(value: &Value) -> Report {
    let summary = value
        .get("summary")
        .and_then(loose_string)
        .unwrap_or_default();
    let overall_risk = value
        .get("overall_risk")
        .and_then(loose_f64)
        .unwrap_or(0.0);
    let flags = value
        .get("flags")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(lenient_flag).collect())
        .unwrap_or_default();

    Report {
        summary,
        overall_risk,
        flags,
    }
}

/// Coerce one flag entry; entries that are not objects are dropped.
fn lenient_flag(value: &Value) -> Option<Flag> {
    let obj = value.as_object()?;

    let severity = obj
        .get("severity")
        .and_then(loose_f64)
        .map(|s| s.round() as i64)
        .unwrap_or(3)
        .clamp(i64::from(Flag::MIN_SEVERITY), i64::from(Flag::MAX_SEVERITY))
        as u8;

    let evidence = obj
        .get("evidence")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(lenient_evidence).collect())
        .unwrap_or_default();

    Some(Flag {
        title: obj
            .get("title")
            .and_then(loose_string)
            .unwrap_or_else(|| "Risk".to_string()),
        severity,
        why_it_matters: obj
            .get("why_it_matters")
            .and_then(loose_string)
            .unwrap_or_default(),
        recommendation: obj
            .get("recommendation")
            .and_then(loose_string)
            .unwrap_or_default(),
        evidence,
    })
}

/// Coerce one evidence entry; entries that are not objects are dropped.
fn lenient_evidence(value: &Value) -> Option<Evidence> {
    let obj = value.as_object()?;

    let page = obj
        .get("page")
        .and_then(loose_f64)
        .map(|p| p.trunc() as i64)
        .unwrap_or(1)
        .max(1);
    let page = u32::try_from(page).unwrap_or(u32::MAX);

    let mut quote = obj.get("quote").and_then(loose_string).unwrap_or_default();
    truncate_chars(&mut quote, Evidence::MAX_QUOTE_CHARS);

    Some(Evidence { page, quote })
}

/// A number, or a string containing one. Non-finite values are rejected so
/// a `"NaN"` string cannot smuggle a NaN into the schema.
fn loose_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// A string, or a scalar worth stringifying. Null counts as absent.
fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ── Step 7 helper: char-boundary truncation ──────────────────────────────

/// Truncate to at most `max_chars` characters, never splitting a code point.
fn truncate_chars(s: &mut String, max_chars: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(idx);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
