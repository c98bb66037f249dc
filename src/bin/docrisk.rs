//! CLI binary for docrisk.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalysisConfig`, renders progress from the event stream,
//! and prints reports.

use anyhow::{Context, Result};
use clap::Parser;
use docrisk::provider::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use docrisk::{
    analyze_document, analyze_document_with_progress, Analysis, AnalysisConfig,
    CompletionProvider, GroqProvider, ProgressEvent, ReportStore, SqliteReportStore,
};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze a PDF and print the report
  docrisk contract.pdf

  # Machine-readable output
  docrisk --json contract.pdf > report.json

  # Persist the report, then list what is stored
  docrisk --save --user alice --db reports.db contract.pdf
  docrisk --list --user alice --db reports.db

  # Use a specific model
  docrisk --model llama-3.3-70b-versatile contract.pdf

  # Point at any OpenAI-compatible endpoint
  docrisk --base-url http://localhost:11434/v1 --api-key ollama contract.pdf

  # Sweep a long document instead of just its opening chunks
  docrisk --max-chunks 10 annual-report.pdf

READING THE REPORT:
  overall_risk  0-100; when the model does not score the document directly,
                the mean flag severity scaled to a percentage
  severity      1 (informational) ... 5 (critical)
  evidence      verbatim quotes of at most 600 characters, with page numbers

ENVIRONMENT VARIABLES:
  GROQ_API_KEY   Groq API key (required unless --api-key is given)
  DOCRISK_MODEL  Override the default model (llama3-70b-8192)
  DOCRISK_DB     Default SQLite path for --save / --list
  DOCRISK_USER   Default user id for --save / --list

SETUP:
  1. Set API key:  export GROQ_API_KEY=gsk_...
  2. Analyze:      docrisk contract.pdf
"#;

/// Analyze PDF documents for regulatory compliance risks.
#[derive(Parser, Debug)]
#[command(
    name = "docrisk",
    version,
    about = "Analyze PDF documents for regulatory compliance risks using hosted LLMs",
    long_about = "Analyze PDF documents for compliance red flags (AML/CFT, sanctions, PDPA/GDPR, \
cross-border obligations) using an OpenAI-compatible chat-completions endpoint. Model output is \
repaired and clamped into a guaranteed-valid JSON report.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to analyze.
    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    /// Print the full analysis as pretty JSON instead of formatted text.
    #[arg(long)]
    json: bool,

    /// Persist the report into the SQLite database at --db.
    #[arg(long)]
    save: bool,

    /// List stored reports for --user instead of analyzing.
    #[arg(long)]
    list: bool,

    /// Maximum stored reports shown by --list.
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// SQLite database path for --save / --list.
    #[arg(long, env = "DOCRISK_DB", default_value = "docrisk.db")]
    db: PathBuf,

    /// User id reports are saved under and listed for.
    #[arg(long, env = "DOCRISK_USER", default_value = "anonymous")]
    user: String,

    /// Model ID (e.g. llama3-70b-8192, llama-3.3-70b-versatile).
    #[arg(long, env = "DOCRISK_MODEL")]
    model: Option<String>,

    /// OpenAI-compatible API root. Default: the Groq endpoint.
    #[arg(long, env = "DOCRISK_BASE_URL")]
    base_url: Option<String>,

    /// API key for the completion endpoint.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// How many chunks (from the start of the document) are analyzed.
    #[arg(long, default_value_t = 3)]
    max_chunks: usize,

    /// Sampling temperature for the first attempt on each chunk.
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Max tokens the model may generate per chunk.
    #[arg(long, default_value_t = 2048)]
    max_tokens: usize,

    /// Retries per chunk after the first failed attempt.
    #[arg(long, default_value_t = 1)]
    max_retries: u32,

    /// Per-completion-call timeout in seconds.
    #[arg(long, default_value_t = 60)]
    api_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "DOCRISK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCRISK_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors and the report itself.
    #[arg(short, long, env = "DOCRISK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List mode ────────────────────────────────────────────────────────
    if cli.list {
        return list_reports(&cli);
    }

    // ── Read input ───────────────────────────────────────────────────────
    let input = cli.input.clone().context("No input file given")?;
    let bytes = std::fs::read(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let doc_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let config = build_config(&cli)?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let analysis = if show_progress {
        run_with_progress(bytes, &doc_name, config).await?
    } else {
        analyze_document(&bytes, &doc_name, &config)
            .await
            .context("Analysis failed")?
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&analysis).context("Failed to serialise analysis")?
        );
    } else {
        print_report(&analysis);
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .max_chunks(cli.max_chunks)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .user_id(cli.user.clone())
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(provider) = build_provider(cli)? {
        builder = builder.provider(provider);
    }
    if cli.save {
        let store = SqliteReportStore::open(&cli.db)
            .with_context(|| format!("Failed to open report store at {}", cli.db.display()))?;
        builder = builder.store(Arc::new(store));
    }

    builder.build().context("Invalid configuration")
}

/// Build an explicit provider when the CLI overrides key or endpoint.
///
/// With neither flag set, returns `None` and the library resolves one from
/// `GROQ_API_KEY` itself. An endpoint without a key is allowed: local
/// OpenAI-compatible servers ignore the Authorization header.
fn build_provider(cli: &Cli) -> Result<Option<Arc<dyn CompletionProvider>>> {
    if cli.api_key.is_none() && cli.base_url.is_none() {
        return Ok(None);
    }

    let provider = GroqProvider::with_options(
        cli.api_key.clone().unwrap_or_default(),
        cli.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        cli.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        cli.api_timeout,
    )
    .context("Failed to build completion client")?;

    Ok(Some(Arc::new(provider)))
}

// ── Progress rendering ───────────────────────────────────────────────────────

/// Drive the event stream and render it as a terminal progress bar.
async fn run_with_progress(
    bytes: Vec<u8>,
    doc_name: &str,
    config: AnalysisConfig,
) -> Result<Analysis> {
    let bar = ProgressBar::new(0);
    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(spinner_style);
    bar.set_prefix("Reading");
    bar.set_message("Extracting text…");
    bar.enable_steady_tick(Duration::from_millis(80));

    let mut events = analyze_document_with_progress(bytes, doc_name, config);
    let mut outcome: Option<Analysis> = None;

    while let Some(event) = events.next().await {
        match event {
            ProgressEvent::Ingest { doc_name, size } => {
                bar.println(format!(
                    "{} {}",
                    cyan("◆"),
                    bold(&format!("Analyzing {doc_name} ({} KiB)…", size / 1024))
                ));
            }
            ProgressEvent::Extract { pages, chars } => {
                bar.println(format!(
                    "  {} extracted {} chars from {} pages",
                    green("✓"),
                    chars,
                    pages
                ));
            }
            ProgressEvent::Analyze { chunk, total } => {
                if chunk == 1 {
                    activate_bar(&bar, total);
                } else {
                    bar.inc(1);
                }
                bar.set_message(format!("chunk {chunk}/{total}"));
            }
            ProgressEvent::Done { analysis } => {
                bar.inc(1);
                bar.finish_and_clear();
                eprintln!(
                    "{} {} chunks analyzed in {}ms",
                    green("✔"),
                    bold(&analysis.chunks_analyzed.to_string()),
                    analysis.duration_ms
                );
                outcome = Some(analysis);
            }
            ProgressEvent::Error { message } => {
                bar.finish_and_clear();
                anyhow::bail!("Analysis failed: {message}");
            }
        }
    }

    outcome.context("Event stream ended without a result")
}

/// Switch from spinner-only style to a full progress bar once the chunk
/// budget is known.
fn activate_bar(bar: &ProgressBar, total: usize) {
    let progress_style = ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:.bold}  \
         [{bar:42.green/238}] {pos:>2}/{len} chunks  \
         ⏱ {elapsed_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

    bar.set_length(total as u64);
    bar.set_style(progress_style);
    bar.set_prefix("Analyzing");
}

// ── Report rendering ─────────────────────────────────────────────────────────

fn print_report(analysis: &Analysis) {
    let report = &analysis.report;

    println!(
        "{}",
        bold(&format!(
            "{}  ({} pages, {} chunks analyzed)",
            analysis.doc_name, analysis.pages, analysis.chunks_analyzed
        ))
    );
    println!("Overall risk: {} / 100", bold(&format!("{:.2}", report.overall_risk)));
    println!();
    println!("{}", report.summary);

    if report.flags.is_empty() {
        println!();
        println!("{} no flags raised", green("✔"));
        return;
    }

    println!();
    println!("{}", bold(&format!("Flags ({}):", report.flags.len())));
    for (i, flag) in report.flags.iter().enumerate() {
        println!(
            "  {}. {} {}",
            i + 1,
            severity_badge(flag.severity),
            bold(&flag.title)
        );
        if !flag.why_it_matters.is_empty() {
            println!("     {}", flag.why_it_matters);
        }
        if !flag.recommendation.is_empty() {
            println!("     {} {}", cyan("fix:"), flag.recommendation);
        }
        for evidence in &flag.evidence {
            println!(
                "     {}",
                dim(&format!("p.{} \u{201c}{}\u{201d}", evidence.page, evidence.quote))
            );
        }
    }
}

fn severity_badge(severity: u8) -> String {
    let label = format!("[SEV {severity}]");
    match severity {
        4 | 5 => red(&label),
        3 => yellow(&label),
        _ => dim(&label),
    }
}

// ── List mode ────────────────────────────────────────────────────────────────

fn list_reports(cli: &Cli) -> Result<()> {
    let store = SqliteReportStore::open(&cli.db)
        .with_context(|| format!("Failed to open report store at {}", cli.db.display()))?;
    let reports = store
        .list_by_user(&cli.user, cli.limit)
        .context("Failed to list reports")?;

    if reports.is_empty() {
        println!("No stored reports for user '{}'", cli.user);
        return Ok(());
    }

    println!("{}", bold(&format!("{} report(s) for {}:", reports.len(), cli.user)));
    for stored in &reports {
        println!(
            "  #{:<4} {}  risk {:>6.2}  {} flag(s)  {}",
            stored.id,
            dim(&format_timestamp(stored.created_at_ms)),
            stored.report.overall_risk,
            stored.report.flags.len(),
            bold(&stored.doc_name),
        );
    }
    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
