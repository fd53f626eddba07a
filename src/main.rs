//! refsweep - find resources that nothing references.
//!
//! Usage:
//!   refsweep unused --corpus CORPUS --kind ITM   List unused items
//!   refsweep kinds                               List checkable kinds
//!   refsweep --help                              Show help

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use refsweep_core::{CorpusManifest, LiteralScriptCompiler, ScanConfig, TypeTag};
use refsweep_report::{ScanStatus, UnusedReport};
use refsweep_scan::{CancellationToken, ScanProgress, UnusedScanner};

#[derive(Parser)]
#[command(
    name = "refsweep",
    version,
    about = "Find unused resources in a game resource corpus",
    long_about = "refsweep inspects every resource that can carry references and \
                  reports the resources of one kind that nothing points at."
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List unused resources of one kind
    Unused {
        /// Corpus manifest (JSON)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Resource kind to check (e.g. ITM, SPL, WAV)
        #[arg(short, long)]
        kind: String,

        /// Maximum number of concurrent jobs (0 = number of CPUs)
        #[arg(short, long, default_value = "0")]
        jobs: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also save the report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not print progress to stderr
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the kinds that can be checked
    Kinds,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Unused {
            corpus,
            kind,
            jobs,
            format,
            output,
            quiet,
        } => run_unused(&corpus, &kind, jobs, format, output.as_deref(), quiet),
        Command::Kinds => {
            for kind in TypeTag::checkable() {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run an unused-resource check and print the result.
fn run_unused(
    corpus: &Path,
    kind: &str,
    jobs: usize,
    format: OutputFormat,
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let config = ScanConfig::builder()
        .target_kind(kind)
        .concurrency_limit(jobs)
        .build()
        .map_err(|e| eyre!("{e}"))?;

    let (store, strings) = CorpusManifest::from_path(corpus)
        .wrap_err("Failed to load corpus")?
        .into_parts();
    let store = Arc::new(store);
    debug!(resources = store.len(), "Corpus loaded");

    eprintln!(
        "Checking {} usage in {}...",
        config.target_kind,
        corpus.display()
    );

    let scanner = UnusedScanner::new(
        store.clone(),
        Arc::new(LiteralScriptCompiler::new()),
        Arc::new(strings),
    );
    let printer = (!quiet).then(|| {
        let rx = scanner.subscribe();
        thread::spawn(move || print_progress(rx))
    });

    let result = scanner.run(&config, &CancellationToken::new());
    // Closes the progress channel.
    drop(scanner);
    if let Some(printer) = printer {
        printer
            .join()
            .map_err(|_| eyre!("Progress reporter panicked"))?;
    }

    let status = ScanStatus::from_result(result, store.as_ref());
    let Some(report) = status.report() else {
        if status.is_failed() {
            bail!(status.message());
        }
        eprintln!("{}", status.message());
        return Ok(());
    };

    match format {
        OutputFormat::Text => print_report(report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if let Some(path) = output {
        report.save(path)?;
        eprintln!("Result saved to {}", path.display());
    }

    Ok(())
}

/// Print progress updates until the scanner goes away.
fn print_progress(mut rx: broadcast::Receiver<ScanProgress>) {
    let mut furthest = 0;
    loop {
        match rx.blocking_recv() {
            Ok(progress) => {
                // Workers may report out of order.
                if progress.completed < furthest {
                    continue;
                }
                furthest = progress.completed;
                eprint!("\r{} ({:.0}%)", progress.note(), progress.percentage());
                let _ = std::io::stderr().flush();
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
    if furthest > 0 {
        eprintln!();
    }
}

fn print_report(report: &UnusedReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", report.summary());
    println!(" {}", report.stats_line());
    println!("{}", "─".repeat(60));
    println!();

    for entry in &report.entries {
        if entry.search_string.is_empty() {
            println!("  {}", entry.resource);
        } else {
            let name = entry.resource.to_string();
            println!("  {name:<16} {}", entry.search_string);
        }
    }

    if report.stats.has_failures() {
        println!();
        println!(
            " {} resource(s) could not be fully inspected; some entries may be in use",
            report.stats.load_failures + report.stats.script_failures
        );
    }
}
