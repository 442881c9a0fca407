//! CLI binary for densum.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummaryConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use densum::{
    summarize_files, word_stream, RunProgress, RunProgressCallback, RunState, SummaryConfig,
    WordBudget,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────

/// Terminal progress callback: a live bar over the per-document phase plus
/// per-document log lines, then a spinner message for the merge pass.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos}/{len} documents  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Summarizing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, name: &str, tokens: usize) {
        self.bar.set_message(format!("{name} ({tokens} tokens)"));
    }

    fn on_document_complete(&self, _index: usize, name: &str, tokens: usize) {
        self.bar.println(format!(
            "  {} {:<32} {}",
            green("✓"),
            name,
            dim(&format!("{tokens} tokens out")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, _index: usize, name: &str, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };
        self.bar
            .println(format!("  {} {:<32} {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_merge_start(&self, documents: usize, tokens: usize) {
        self.bar.set_prefix("Merging");
        self.bar
            .set_message(format!("{documents} summaries, {tokens} tokens"));
    }

    fn on_state_change(&self, state: RunState) {
        if matches!(state, RunState::Done | RunState::Failed) {
            self.bar.finish_and_clear();
        }
    }

    fn on_run_complete(&self, summarized: usize, failed: usize) {
        if failed == 0 {
            eprintln!(
                "{} {} documents summarized",
                green("✔"),
                bold(&summarized.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents summarized  ({} failed)",
                if summarized == 0 { red("✘") } else { cyan("⚠") },
                bold(&summarized.to_string()),
                summarized + failed,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize one PDF (densification trail to stdout)
  densum report.pdf

  # Several PDFs merged into one cross-document summary
  densum q1.pdf q2.pdf q3.pdf --category "Quarterly Report"

  # Tighter budget, more iterations
  densum paper.pdf --max-words 256 --iterations 7 --entity-range 3

  # Full run record as JSON
  densum report.pdf --json > run.json

  # Reveal the summary word by word
  densum report.pdf --pace-ms 50

ENVIRONMENT VARIABLES:
  DENSUM_COMPLETION_URL   Completion endpoint URL
  DENSUM_AGENT_ID         Target agent identifier
  DENSUM_API_KEY          Bearer token for the endpoint

SETUP:
  1. export DENSUM_COMPLETION_URL=https://api.example.com/chat/completions
  2. export DENSUM_AGENT_ID=... DENSUM_API_KEY=...
  3. densum document.pdf
"#;

/// Entity-dense PDF summarization via chain-of-density prompting.
#[derive(Parser, Debug)]
#[command(
    name = "densum",
    version,
    about = "Generate increasingly dense, entity-rich summaries of PDF documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to summarize, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the final summary to this file instead of stdout.
    #[arg(short, long, env = "DENSUM_OUTPUT")]
    output: Option<PathBuf>,

    /// Subject category the prompt refers to the source material as.
    #[arg(long, env = "DENSUM_CATEGORY", default_value = "Article")]
    category: String,

    /// Word cap per summary iteration: 128, 256, 512, or 1024.
    #[arg(long, env = "DENSUM_MAX_WORDS", default_value_t = 512,
          value_parser = parse_word_budget_words)]
    max_words: usize,

    /// Descriptive entities introduced per densification step.
    #[arg(long, env = "DENSUM_ENTITY_RANGE", default_value_t = 5)]
    entity_range: usize,

    /// Densification steps after the initial summary.
    #[arg(long, env = "DENSUM_ITERATIONS", default_value_t = 5)]
    iterations: usize,

    /// Completion endpoint URL.
    #[arg(long, env = "DENSUM_COMPLETION_URL")]
    url: String,

    /// Target agent identifier sent with every request.
    #[arg(long, env = "DENSUM_AGENT_ID", default_value = "")]
    agent_id: String,

    /// Bearer token for the completion endpoint.
    #[arg(long, env = "DENSUM_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Per-completion-call timeout in seconds.
    #[arg(long, env = "DENSUM_API_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Output the full run record (outcomes, stats, merge article) as JSON.
    #[arg(long, env = "DENSUM_JSON")]
    json: bool,

    /// Reveal the summary word by word with this many milliseconds between
    /// words. 0 prints everything at once.
    #[arg(long, env = "DENSUM_PACE_MS", default_value_t = 0)]
    pace_ms: u64,

    /// Disable the progress bar.
    #[arg(long, env = "DENSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DENSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary itself.
    #[arg(short, long, env = "DENSUM_QUIET")]
    quiet: bool,
}

/// Validate `--max-words` against the fixed budget set.
fn parse_word_budget_words(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if WordBudget::from_words(n).is_none() {
        return Err(format!("max words must be one of 128, 256, 512, 1024 (got {n})"));
    }
    Ok(n)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let budget = WordBudget::from_words(cli.max_words)
        .context("max words must be one of 128, 256, 512, 1024")?;

    let progress: Option<RunProgress> = if show_progress {
        Some(CliProgressCallback::new() as RunProgress)
    } else {
        None
    };

    let mut builder = SummaryConfig::builder()
        .word_budget(budget)
        .entity_range(cli.entity_range)
        .content_category(cli.category.as_str())
        .iterations(cli.iterations)
        .completion_url(cli.url.as_str())
        .agent_id(cli.agent_id.as_str())
        .api_key(cli.api_key.as_str())
        .api_timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = summarize_files(&cli.inputs, &config)
        .await
        .context("summarization failed")?;

    // ── Present ──────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    let trail = output.final_trail();

    if let Some(ref path) = cli.output {
        std::fs::write(path, &trail)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {} → {}",
                green("✔"),
                dim(&format!("{} final tokens", output.stats.final_tokens)),
                bold(&path.display().to_string()),
            );
        }
    } else if trail.is_empty() {
        if !cli.quiet {
            if output.final_summary.is_none() {
                eprintln!("{} no documents could be summarized", cyan("⚠"));
            } else {
                eprintln!(
                    "{} the merge output contained no denser_summary records",
                    cyan("⚠")
                );
            }
        }
    } else if cli.pace_ms > 0 {
        // Pacing is a presentation choice; the library hands us words, the
        // CLI decides the rhythm.
        let mut stream = word_stream(trail);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        while let Some(word) = stream.next().await {
            write!(handle, "{word} ").context("failed to write to stdout")?;
            handle.flush().ok();
            tokio::time::sleep(Duration::from_millis(cli.pace_ms)).await;
        }
        writeln!(handle).ok();
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(trail.as_bytes())
            .context("failed to write to stdout")?;
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Summarized {}/{} documents in {}ms ({} final tokens)",
            output.stats.summarized_documents,
            output.stats.total_documents,
            output.stats.total_ms,
            output.stats.final_tokens,
        );
    }

    Ok(())
}
