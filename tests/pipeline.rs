//! Integration tests for the docrisk analysis pipeline.
//!
//! Everything except the last test runs offline: test documents are built
//! in-process with `lopdf` and the completion backend is a scripted provider
//! that replays canned model output, so the suite is fast and deterministic.
//! The live Groq test at the bottom is gated behind the `E2E_ENABLED`
//! environment variable (plus a real `GROQ_API_KEY`) so it does not run in
//! CI unless explicitly requested.
//!
//! Run with:
//!   cargo test --test pipeline
//!
//! Including the live API test:
//!   E2E_ENABLED=1 cargo test --test pipeline -- --nocapture

use docrisk::{
    analyze_chunks, analyze_document, analyze_document_with_progress, prompts, AnalysisConfig,
    AnalysisConfigBuilder, ChunkError, CompletionProvider, CompletionRequest, DocRiskError,
    ProgressEvent, ProviderError, Report, ReportStore, SqliteReportStore, StoreError,
    StoredReport,
};

use async_trait::async_trait;
use futures::StreamExt;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ── Test documents ───────────────────────────────────────────────────────────

const POLICY_PAGE_1: &str = "Vendor Risk Policy\n\
    Customer accounts may be opened without identity verification when the\n\
    onboarding queue exceeds two business days.\n\
    All exceptions are approved verbally by the branch manager.";

const POLICY_PAGE_2: &str = "Records of verbal approvals are not retained.\n\
    Transaction monitoring is paused during system maintenance windows.\n\
    Cross-border transfers settle without sanctions screening, and the\n\
    AML programme does not name a compliance officer.";

/// Build a small PDF in memory, one `&str` per page, one text line per `\n`.
///
/// Standard Helvetica and plain `Tj` operators keep the file readable by
/// both extraction backends.
fn make_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
        ];
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.trim())]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream encodes"),
        ));
        kids.push(
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into(),
        );
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory save");
    bytes
}

/// A page long enough to split into several chunks at small window sizes.
fn long_page() -> String {
    "Customer accounts may be opened without identity verification. ".repeat(16)
}

// ── Canned model output ──────────────────────────────────────────────────────

/// Well-formed model output: one severity-4 flag, risk left at zero so the
/// pipeline derives it (4/5 × 100 = 80).
const CLEAN_REPORT: &str = r#"{
  "summary": "Onboarding allows unverified accounts.",
  "overall_risk": 0,
  "flags": [
    {
      "title": "AML identity checks are skipped at onboarding",
      "severity": 4,
      "why_it_matters": "Accounts can be opened for unknown parties.",
      "recommendation": "Make identity verification a blocking onboarding step.",
      "evidence": [
        { "page": 1, "quote": "accounts may be opened without identity verification" }
      ]
    }
  ]
}"#;

/// Everything the prompt forbids at once: prose wrapper, fences, trailing
/// commas, out-of-range severity and page number.
const NOISY_REPORT: &str = r#"Here is the compliance report you asked for:
```json
{
  "summary": "Verbal approvals leave no audit trail.",
  "overall_risk": 0,
  "flags": [
    {
      "title": "Undocumented exception approvals",
      "severity": 7,
      "why_it_matters": "Exceptions cannot be reviewed after the fact.",
      "recommendation": "Record every exception in the case system.",
      "evidence": [{ "page": 0, "quote": "approved verbally by the branch manager" }],
    },
  ],
}
```
Let me know if you need anything else!"#;

const REFUSAL: &str = "I'm sorry, but I can't produce a risk report for this text.";

/// One-flag report with an explicit risk score, as a well-behaved model
/// returns it. Positive scores are kept as-is, which makes merge arithmetic
/// easy to pin down.
fn report_json(summary: &str, risk: f64, flag_title: &str) -> String {
    format!(
        r#"{{"summary":"{summary}","overall_risk":{risk},"flags":[{{"title":"{flag_title}","severity":3,"why_it_matters":"w","recommendation":"r","evidence":[]}}]}}"#
    )
}

// ── Scripted provider ────────────────────────────────────────────────────────

/// Completion backend that replays a fixed script and records every request.
/// Calls beyond the script fail loudly, so a test that expects two calls
/// cannot silently make three.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn replaying<S: AsRef<str>>(responses: &[S]) -> Arc<Self> {
        Self::new(responses.iter().map(|r| Ok(r.as_ref().to_string())).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, i: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ProviderError::Network {
                detail: "script exhausted: more completion calls than expected".into(),
            })
        })
    }
}

/// Config wired to a scripted provider, with retry backoff zeroed so
/// failure-path tests do not sleep.
fn test_config(provider: Arc<ScriptedProvider>) -> AnalysisConfigBuilder {
    AnalysisConfig::builder()
        .provider(provider)
        .retry_backoff_ms(0)
}

// ── Assertion helpers ────────────────────────────────────────────────────────

/// Every bound the pipeline promises, checked on one report.
fn assert_report_invariants(report: &Report, context: &str) {
    assert!(
        (0.0..=100.0).contains(&report.overall_risk),
        "[{context}] overall_risk {} outside 0..=100",
        report.overall_risk
    );
    for flag in &report.flags {
        assert!(
            (1..=5).contains(&flag.severity),
            "[{context}] severity {} outside 1..=5 on {:?}",
            flag.severity,
            flag.title
        );
        assert!(!flag.title.trim().is_empty(), "[{context}] flag has a blank title");
        for evidence in &flag.evidence {
            assert!(evidence.page >= 1, "[{context}] evidence page below 1");
            assert!(
                evidence.quote.chars().count() <= 600,
                "[{context}] evidence quote over 600 chars"
            );
        }
    }
}

/// A progress stream must end with its only terminal event.
fn assert_single_terminal(events: &[ProgressEvent], context: &str) {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(
        terminals, 1,
        "[{context}] expected exactly one terminal event, got {terminals}: {events:?}"
    );
    assert!(
        events.last().is_some_and(ProgressEvent::is_terminal),
        "[{context}] terminal event must come last: {events:?}"
    );
}

fn stages(events: &[ProgressEvent]) -> Vec<&'static str> {
    events.iter().map(ProgressEvent::stage).collect()
}

// ── Full-document analysis ───────────────────────────────────────────────────

#[tokio::test]
async fn analyze_document_end_to_end() {
    let bytes = make_pdf(&[POLICY_PAGE_1, POLICY_PAGE_2]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider.clone()).build().expect("valid config");

    let analysis = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.doc_name, "policy.pdf");
    assert_eq!(analysis.pages, 2);
    assert_eq!(analysis.chunks_analyzed, 1);
    assert!(analysis.created_at_ms > 0);

    assert_eq!(analysis.report.overall_risk, 80.0);
    assert_eq!(analysis.report.flags.len(), 1);
    assert_eq!(analysis.report.flags[0].severity, 4);
    assert!(
        analysis.report.flags[0].title.contains("AML"),
        "flag should reference a named focus area"
    );
    assert_report_invariants(&analysis.report, "end_to_end");

    // The extracted document text must reach the model verbatim.
    assert_eq!(provider.calls(), 1);
    let request = provider.request(0);
    for phrase in ["identity verification", "Cross-border", "AML"] {
        assert!(
            request.user.contains(phrase),
            "prompt should carry the extracted text ({phrase}), got: {}",
            request.user.chars().take(400).collect::<String>()
        );
    }
}

#[tokio::test]
async fn blank_doc_name_gets_a_default() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider).build().expect("valid config");

    let analysis = analyze_document(&bytes, "  ", &config)
        .await
        .expect("analysis should succeed");
    assert_eq!(analysis.doc_name, "document.pdf");
}

#[tokio::test]
async fn model_noise_is_normalized_away() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[NOISY_REPORT]);
    let config = test_config(provider.clone()).build().expect("valid config");

    let analysis = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect("noisy but salvageable output should succeed");

    // No retry needed: the first completion is repaired, not rejected.
    assert_eq!(provider.calls(), 1);

    let report = &analysis.report;
    assert_eq!(report.summary, "Verbal approvals leave no audit trail.");
    assert_eq!(report.flags[0].severity, 5, "severity 7 must clamp to 5");
    assert_eq!(report.flags[0].evidence[0].page, 1, "page 0 must floor to 1");
    assert_eq!(report.overall_risk, 100.0, "zero risk rederives from severities");
    assert_report_invariants(report, "noisy");
}

#[tokio::test]
async fn oversized_input_is_rejected_before_any_work() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider.clone())
        .max_input_bytes(64)
        .build()
        .expect("valid config");

    let err = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect_err("oversized input must be rejected");

    match err {
        DocRiskError::OversizedInput { size, limit } => {
            assert_eq!(size, bytes.len());
            assert_eq!(limit, 64);
        }
        other => panic!("expected OversizedInput, got {other}"),
    }
    assert_eq!(provider.calls(), 0, "no completion call for rejected input");
}

#[tokio::test]
async fn garbage_bytes_fail_extraction() {
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider.clone()).build().expect("valid config");

    let err = analyze_document(b"definitely not a pdf", "junk.pdf", &config)
        .await
        .expect_err("non-PDF bytes must fail extraction");

    assert!(matches!(err, DocRiskError::ExtractionFailed));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn chunk_budget_caps_model_calls() {
    let page = long_page();
    let bytes = make_pdf(&[page.as_str()]);
    // ~1000 extracted chars split into 200-char windows: well over two
    // chunks, of which only the first two may be analyzed.
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT, CLEAN_REPORT]);
    let config = test_config(provider.clone())
        .chunk_chars(200)
        .chunk_overlap(40)
        .max_chunks(2)
        .build()
        .expect("valid config");

    let analysis = analyze_document(&bytes, "long.pdf", &config)
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.chunks_analyzed, 2);
    assert_eq!(provider.calls(), 2, "model calls must stop at the chunk budget");
    assert_eq!(analysis.report.flags.len(), 2, "one flag per analyzed chunk");
}

#[tokio::test]
async fn summaries_and_risk_merge_across_chunks() {
    let page = long_page();
    let bytes = make_pdf(&[page.as_str()]);
    let provider = ScriptedProvider::replaying(&[
        report_json("Chunk one has a residency gap.", 40.0, "Data residency gap"),
        report_json("Chunk two lacks audit logging.", 60.0, "No audit trail"),
    ]);
    let config = test_config(provider)
        .chunk_chars(200)
        .chunk_overlap(40)
        .max_chunks(2)
        .build()
        .expect("valid config");

    let analysis = analyze_document(&bytes, "long.pdf", &config)
        .await
        .expect("analysis should succeed");

    let report = &analysis.report;
    assert_eq!(
        report.summary,
        "Chunk one has a residency gap.\n\nChunk two lacks audit logging."
    );
    assert_eq!(report.overall_risk, 50.0, "risk is the mean of chunk risks");
    let titles: Vec<&str> = report.flags.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["Data residency gap", "No audit trail"]);
}

// ── Retry behavior ───────────────────────────────────────────────────────────

#[tokio::test]
async fn refusal_recovers_via_strict_retry() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[REFUSAL, CLEAN_REPORT]);
    let config = test_config(provider.clone()).build().expect("valid config");

    let analysis = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect("strict retry should recover");

    assert_eq!(analysis.report.overall_risk, 80.0);
    assert_eq!(provider.calls(), 2);

    // The second attempt must switch to the strict prompt pair at
    // temperature zero.
    let retry = provider.request(1);
    assert_eq!(retry.system, prompts::STRICT_SYSTEM_PROMPT);
    assert_eq!(retry.temperature, 0.0);
}

#[tokio::test]
async fn persistent_refusal_fails_the_first_chunk() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[REFUSAL, REFUSAL]);
    let config = test_config(provider.clone()).build().expect("valid config");

    let err = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect_err("both attempts refuse");

    match err {
        DocRiskError::Analysis { chunk, source } => {
            assert_eq!(chunk, 0);
            assert!(matches!(source, ChunkError::Unparseable { .. }));
        }
        other => panic!("expected Analysis error, got {other}"),
    }
    // Default budget: one standard attempt plus one strict retry.
    assert_eq!(provider.calls(), 2);
}

// ── Chunk-level entry point ──────────────────────────────────────────────────

#[tokio::test]
async fn analyze_chunks_works_without_a_document() {
    let provider = ScriptedProvider::replaying(&[
        report_json("First passage.", 20.0, "Finding A"),
        report_json("Second passage.", 30.0, "Finding B"),
    ]);
    let config = AnalysisConfig::builder()
        .retry_backoff_ms(0)
        .build()
        .expect("valid config");
    let chunks = vec![
        "The processor may retain records indefinitely.".to_string(),
        "No audit log is kept for access events.".to_string(),
    ];

    let report = analyze_chunks(provider.as_ref(), &config, &chunks)
        .await
        .expect("chunk analysis should succeed");

    assert_eq!(report.summary, "First passage.\n\nSecond passage.");
    assert_eq!(report.overall_risk, 25.0);
    assert_eq!(report.flags.len(), 2);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn analyze_chunks_rejects_empty_input() {
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = AnalysisConfig::builder().build().expect("valid config");

    let err = analyze_chunks(provider.as_ref(), &config, &[])
        .await
        .expect_err("no chunks means nothing to analyze");

    assert!(matches!(err, DocRiskError::NoContent));
    assert_eq!(provider.calls(), 0);
}

// ── Progress stream ──────────────────────────────────────────────────────────

#[tokio::test]
async fn events_arrive_in_pipeline_order() {
    let bytes = make_pdf(&[POLICY_PAGE_1, POLICY_PAGE_2]);
    let size = bytes.len();
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider).build().expect("valid config");

    let events: Vec<ProgressEvent> = analyze_document_with_progress(bytes, "policy.pdf", config)
        .collect()
        .await;

    assert_eq!(stages(&events), ["ingest", "extract", "analyze", "done"]);
    assert_single_terminal(&events, "ordered");

    match &events[0] {
        ProgressEvent::Ingest { doc_name, size: reported } => {
            assert_eq!(doc_name, "policy.pdf");
            assert_eq!(*reported, size);
        }
        other => panic!("expected ingest first, got {other:?}"),
    }
    match &events[1] {
        ProgressEvent::Extract { pages, chars } => {
            assert_eq!(*pages, 2);
            assert!(*chars > 0);
        }
        other => panic!("expected extract second, got {other:?}"),
    }
    match &events[2] {
        ProgressEvent::Analyze { chunk, total } => {
            assert_eq!((*chunk, *total), (1, 1));
        }
        other => panic!("expected analyze third, got {other:?}"),
    }
    match events.last() {
        Some(ProgressEvent::Done { analysis }) => {
            assert_eq!(analysis.report.overall_risk, 80.0);
            assert_eq!(analysis.chunks_analyzed, 1);
            assert_report_invariants(&analysis.report, "stream_done");
        }
        other => panic!("expected done last, got {other:?}"),
    }
}

#[tokio::test]
async fn analyze_events_count_up_to_the_budget() {
    let page = long_page();
    let bytes = make_pdf(&[page.as_str()]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT, CLEAN_REPORT]);
    let config = test_config(provider)
        .chunk_chars(200)
        .chunk_overlap(40)
        .max_chunks(2)
        .build()
        .expect("valid config");

    let events: Vec<ProgressEvent> =
        analyze_document_with_progress(bytes, "long.pdf", config).collect().await;

    assert_eq!(stages(&events), ["ingest", "extract", "analyze", "analyze", "done"]);
    let analyze_pairs: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Analyze { chunk, total } => Some((*chunk, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(analyze_pairs, [(1, 2), (2, 2)]);
}

#[tokio::test]
async fn extraction_failure_streams_ingest_then_error() {
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider).build().expect("valid config");

    let events: Vec<ProgressEvent> =
        analyze_document_with_progress(b"not a pdf".to_vec(), "junk.pdf", config)
            .collect()
            .await;

    assert_eq!(stages(&events), ["ingest", "error"]);
    assert_single_terminal(&events, "extraction_failure");
}

#[tokio::test]
async fn oversized_input_streams_a_single_error() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider)
        .max_input_bytes(64)
        .build()
        .expect("valid config");

    let events: Vec<ProgressEvent> =
        analyze_document_with_progress(bytes, "policy.pdf", config).collect().await;

    assert_eq!(stages(&events), ["error"], "size gate fires before ingest is reported");
    assert_single_terminal(&events, "oversized");
}

#[tokio::test]
async fn chunk_failure_ends_the_stream_with_an_error() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[REFUSAL, REFUSAL]);
    let config = test_config(provider).build().expect("valid config");

    let events: Vec<ProgressEvent> =
        analyze_document_with_progress(bytes, "policy.pdf", config).collect().await;

    assert_eq!(stages(&events), ["ingest", "extract", "analyze", "error"]);
    assert_single_terminal(&events, "chunk_failure");
    match events.last() {
        Some(ProgressEvent::Error { message }) => {
            assert!(message.contains("chunk 0"), "error should name the chunk: {message}");
        }
        other => panic!("expected an error event, got {other:?}"),
    }
}

// ── Persistence ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn reports_persist_when_a_store_is_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(
        SqliteReportStore::open(&dir.path().join("reports.db")).expect("store opens"),
    );
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider)
        .store(store.clone())
        .user_id("integration")
        .build()
        .expect("valid config");

    let analysis = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect("analysis should succeed");

    let listed = store.list_by_user("integration", 10).expect("listing succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].doc_name, "policy.pdf");
    assert_eq!(listed[0].user_id, "integration");
    assert_eq!(listed[0].report, analysis.report);
}

/// Store whose writes always fail, to prove persistence stays best-effort.
struct FailingStore;

impl ReportStore for FailingStore {
    fn save(&self, _report: &Report, _user: &str, _doc: &str) -> Result<i64, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    fn list_by_user(&self, _user: &str, _limit: usize) -> Result<Vec<StoredReport>, StoreError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn store_failure_does_not_fail_the_analysis() {
    let bytes = make_pdf(&[POLICY_PAGE_1]);
    let provider = ScriptedProvider::replaying(&[CLEAN_REPORT]);
    let config = test_config(provider)
        .store(Arc::new(FailingStore))
        .build()
        .expect("valid config");

    let analysis = analyze_document(&bytes, "policy.pdf", &config)
        .await
        .expect("a failing store must not fail the analysis");
    assert_eq!(analysis.report.overall_risk, 80.0);
}

// ── Live API test (gated) ────────────────────────────────────────────────────

/// Full pipeline against the real Groq API. Needs network and a key:
///   E2E_ENABLED=1 GROQ_API_KEY=gsk_... cargo test --test pipeline live_groq -- --nocapture
#[tokio::test]
async fn live_groq_analyzes_a_risky_policy() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run live API tests");
        return;
    }
    if std::env::var("GROQ_API_KEY").map(|k| k.trim().is_empty()).unwrap_or(true) {
        println!("SKIP — set GROQ_API_KEY to run live API tests");
        return;
    }

    let bytes = make_pdf(&[POLICY_PAGE_1, POLICY_PAGE_2]);
    let config = AnalysisConfig::builder().build().expect("valid config");

    let analysis = analyze_document(&bytes, "vendor-risk-policy.pdf", &config)
        .await
        .expect("live analysis should succeed");

    assert_eq!(analysis.pages, 2);
    assert_report_invariants(&analysis.report, "live");
    assert!(!analysis.report.summary.trim().is_empty(), "[live] summary is empty");

    println!(
        "[live] ✓  risk {:.2}, {} flag(s), {} ms",
        analysis.report.overall_risk,
        analysis.report.flags.len(),
        analysis.duration_ms
    );
    for flag in &analysis.report.flags {
        println!("[live]    [{}] {}", flag.severity, flag.title);
    }
}
