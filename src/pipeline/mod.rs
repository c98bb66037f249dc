//! Pipeline stages for document risk analysis.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch extraction backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ chunk ──▶ llm ──▶ normalize ──▶ merge
//! (bytes)   (windows)  (Groq)   (repair)   (one report)
//! ```
//!
//! 1. [`extract`]   — pull plain text and a page count out of PDF bytes;
//!    primary extractor with a silent fallback
//! 2. [`chunk`]     — overlapping fixed-size windows so each request fits a
//!    model context budget
//! 3. [`llm`]       — drive the completion call with retry/strictening; the
//!    only stage with network I/O
//! 4. [`normalize`] — salvage, repair, and clamp the model's JSON into a
//!    schema-valid report
//! 5. [`merge`]     — fold the per-chunk reports into one document-level
//!    report and renormalize it

pub mod chunk;
pub mod extract;
pub mod llm;
pub mod merge;
pub mod normalize;
