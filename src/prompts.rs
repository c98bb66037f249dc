//! System and user prompts for compliance analysis.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the schema the model is asked
//!    for, or the focus areas, requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the exact strings sent to the
//!    provider without spinning up a real model, making prompt regressions
//!    easy to catch.
//!
//! Callers can override the default via
//! [`crate::config::AnalysisConfig::system_prompt`]; the constants here are
//! used only when no override is provided. Whatever the prompts demand, the
//! normalizer still treats the response as untrusted.

use crate::rules::{self, ComplianceRule};

/// Default system prompt for analysing a document chunk.
///
/// This prompt is used when `AnalysisConfig::system_prompt` is `None`. The
/// schema block mirrors the [`crate::report::Report`] wire shape exactly.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert compliance analyst for financial and legal documents.

Return ONLY valid JSON following this schema strictly, with no extra text:

{
  "summary": string,
  "overall_risk": number,
  "flags": [
    {
      "title": string,
      "severity": integer 1-5,
      "why_it_matters": string,
      "recommendation": string,
      "evidence": [ { "page": integer >= 1, "quote": string <= 600 chars } ]
    }
  ]
}

Guidelines:
- Identify red flags across Cross-Border, AML/CFT, Sanctions, and PDPA/GDPR obligations.
- Keep every evidence quote at or under 600 characters.
- If overall_risk cannot be judged directly, estimate it as mean(severity) / 5 * 100."#;

/// System prompt for the strict retry after a failed attempt.
pub const STRICT_SYSTEM_PROMPT: &str =
    "Return only strict JSON per schema; no markdown, no prose.";

/// Ceiling on how much of the chunk the strict retry resends.
pub const STRICT_PREFIX_CHARS: usize = 5000;

/// Build the `(system, user)` message pair for a first attempt.
///
/// Deterministic: the same chunk and rule selection always produce the same
/// strings. The user message carries the bounded rule digest so the model
/// knows which specific obligations to check.
pub fn build_prompts(chunk: &str, relevant: &[&ComplianceRule]) -> (String, String) {
    let digest = rules::prompt_digest(relevant);

    let mut user = String::with_capacity(chunk.len() + digest.len() + 128);
    user.push_str(
        "Analyze the following document excerpt for compliance risks and produce the JSON report.\n",
    );
    if !digest.is_empty() {
        user.push_str("\nSpecific rules to check:\n\n");
        user.push_str(&digest);
    }
    user.push_str("\nDocument excerpt:\n");
    user.push_str(chunk);

    (DEFAULT_SYSTEM_PROMPT.to_string(), user)
}

/// Build the `(system, user)` pair for a strict retry: a terse format
/// reminder and only the first [`STRICT_PREFIX_CHARS`] characters of the
/// chunk, so a response that previously overflowed or rambled gets a second,
/// cheaper chance.
pub fn build_strict_prompts(chunk: &str) -> (String, String) {
    let prefix: String = chunk.chars().take(STRICT_PREFIX_CHARS).collect();
    (
        STRICT_SYSTEM_PROMPT.to_string(),
        format!("Strict JSON report for:\n{prefix}"),
    )
}
