use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rowmatch_common::{load_config, AppConfig, DiscrepancyReport, SourceId};
use rowmatch_core::{rows_from_path, CsvOptions, DiscrepancyTracker, RowSeq};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowmatch")]
#[command(author = "RowMatch Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Content-based comparison of delimited data files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two or more delimited files by row content
    Compare {
        /// Input files (two or more)
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        /// Field delimiter (single ASCII character)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Skip the first record of each file as a header row
        #[arg(long)]
        headers: bool,

        /// Compare the first record of each file like any other row
        #[arg(long, conflicts_with = "headers")]
        no_headers: bool,

        /// Fail on records whose field counts differ within one file
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Disable ANSI colors in output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() {
    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            files,
            delimiter,
            headers,
            no_headers,
            strict,
            json,
            no_color,
        } => {
            if let Err(e) = run_compare(files, delimiter, headers, no_headers, strict, json, no_color) {
                error!("Comparison failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_compare(
    files: Vec<PathBuf>,
    delimiter: Option<char>,
    headers: bool,
    no_headers: bool,
    strict: bool,
    json: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    for file in &files {
        if !file.is_file() {
            bail!("Input is not a readable file: {}", file.display());
        }
    }

    let loaded = load_config(false)?;
    let mut config = loaded.config;
    apply_overrides(&mut config, delimiter, headers, no_headers, strict);

    let options = CsvOptions::from_config(&config)?;

    info!("Comparing {} files", files.len());

    let mut sources: Vec<(SourceId, RowSeq)> = Vec::with_capacity(files.len());
    for file in &files {
        let id = SourceId::new(file.display().to_string());
        if sources.iter().any(|(existing, _)| existing == &id) {
            bail!("Duplicate input file: {}", file.display());
        }

        let rows = rows_from_path(file, &options)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        sources.push((id, rows));
    }

    let mut tracker = DiscrepancyTracker::new(sources).run()?;
    let rounds = tracker.rounds();
    let report = tracker.results();

    if json {
        let output = serde_json::to_string_pretty(&build_json_report(&files, rounds, report))?;
        println!("{output}");
        return Ok(());
    }

    render_text_report(report, rounds, no_color);
    Ok(())
}

fn apply_overrides(
    config: &mut AppConfig,
    delimiter: Option<char>,
    headers: bool,
    no_headers: bool,
    strict: bool,
) {
    if let Some(delimiter) = delimiter {
        config.delimiter = delimiter;
    }
    if headers {
        config.has_headers = true;
    } else if no_headers {
        config.has_headers = false;
    }
    if strict {
        config.flexible = false;
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sources: Vec<String>,
    summary: JsonSummary,
    comparison: &'a DiscrepancyReport,
}

#[derive(Serialize)]
struct JsonSummary {
    sources: usize,
    rounds: usize,
    unmatched_rows: usize,
    matched: bool,
}

fn build_json_report<'a>(
    files: &[PathBuf],
    rounds: usize,
    report: &'a DiscrepancyReport,
) -> JsonReport<'a> {
    JsonReport {
        sources: files.iter().map(|f| f.display().to_string()).collect(),
        summary: JsonSummary {
            sources: report.source_count(),
            rounds,
            unmatched_rows: report.unmatched_rows(),
            matched: report.is_fully_matched(),
        },
        comparison: report,
    }
}

fn render_text_report(report: &DiscrepancyReport, rounds: usize, no_color: bool) {
    let use_color = !no_color && std::io::stdout().is_terminal();
    let (green, yellow, reset) = if use_color {
        ("\x1b[32m", "\x1b[33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    println!("\n{}", "=".repeat(80));
    println!("Comparison Results");
    println!("{}", "=".repeat(80));

    if report.is_fully_matched() {
        println!("{}All sources match.{}", green, reset);
    } else {
        for (source, rows) in report.iter() {
            println!("{}", source);
            if rows.is_empty() {
                println!("  (no unmatched rows)");
                continue;
            }
            for (step, values) in rows {
                println!(
                    "  {}[step {:>4}]{}  {}",
                    yellow,
                    step,
                    reset,
                    values.join(", ")
                );
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("Summary:");
    println!("  Sources:         {}", report.source_count());
    println!("  Rounds:          {}", rounds);
    println!("  Unmatched rows:  {}", report.unmatched_rows());
    println!("{}", "=".repeat(80));
}
