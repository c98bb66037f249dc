//! # docrisk
//!
//! Analyze PDF documents for regulatory compliance risks using hosted LLMs.
//!
//! ## Why this crate?
//!
//! Reading a 40-page outsourcing agreement for AML, sanctions, and data
//! protection exposure is hours of specialist work. This crate turns the job
//! into one call: extract the text, send bounded windows of it to a model
//! with a strict JSON schema, then repair and clamp whatever comes back so
//! callers always receive a valid report. The model is treated as an
//! untrusted narrator: its findings are welcome, its structure is not
//! believed until normalization has enforced every bound.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Ingest     size gate (10 MiB default)
//!  ├─ 2. Extract    pdf-extract, with a lopdf fallback
//!  ├─ 3. Chunk      7000-char windows, 400-char overlap
//!  ├─ 4. Analyze    sequential Groq calls, strict retry on bad JSON
//!  ├─ 5. Normalize  salvage JSON, clamp severity / quotes / risk
//!  └─ 6. Merge      one report, mean risk, flags in document order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docrisk::{analyze_document, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider built from GROQ_API_KEY when none is injected
//!     let bytes = std::fs::read("contract.pdf")?;
//!     let config = AnalysisConfig::default();
//!     let analysis = analyze_document(&bytes, "contract.pdf", &config).await?;
//!     println!("risk {:.1}/100", analysis.report.overall_risk);
//!     for flag in &analysis.report.flags {
//!         println!("  [severity {}] {}", flag.severity, flag.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docrisk` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! docrisk = { version = "0.1", default-features = false }
//! ```
//!
//! ## Report Guarantees
//!
//! Every [`Report`] leaving this crate holds these bounds no matter what the
//! model produced:
//!
//! - `overall_risk` is finite and within [0, 100]; derived and merged
//!   scores are rounded to two decimals
//! - every flag severity is within [1, 5]
//! - every evidence quote is at most 600 characters
//! - `flags` and `evidence` are always present (possibly empty), never null
//! - a zeroed risk next to real flags is re-derived from their severities

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod report;
pub mod rules;
pub mod store;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_chunks, analyze_document};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{ChunkError, DocRiskError, ProviderError, StoreError};
pub use pipeline::chunk::chunk_text;
pub use pipeline::extract::extract_text;
pub use pipeline::normalize::normalize_report;
pub use progress::ProgressEvent;
pub use provider::{CompletionProvider, CompletionRequest, GroqProvider};
pub use report::{Analysis, Evidence, Flag, Report, StoredReport};
pub use rules::{ComplianceRule, RuleCategory};
pub use store::{ReportStore, SqliteReportStore};
pub use stream::{analyze_document_with_progress, ProgressStream};
