use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use pas_validator_core::{
    default_sample_date_cutoff, validate_files_with_progress, ProgressHandler, ValidationOptions,
};

mod report;

use report::{ReportSummary, ValidationReport};

#[derive(Debug, Parser)]
#[command(name = "pas-validator")]
#[command(about = "Validates PAS oil, water and gas analysis records")]
struct Args {
    /// Specification lookup table (CSV)
    #[arg(short = 's', long = "spec")]
    spec: PathBuf,

    /// Record file with one mnemonic per header column
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Record kind code: OAN, WAN or GAN
    #[arg(short = 'k', long = "kind")]
    kind: String,

    /// Write the JSON report to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Field delimiter of the record file; `\t` or `tab` for tabs
    #[arg(short = 'd', long = "delimiter", default_value = "tab")]
    delimiter: String,

    /// Samples dated after this day must report separator pressure and temperature
    #[arg(short = 'c', long = "cutoff-date", alias = "cutoff_date")]
    cutoff_date: Option<String>,

    #[arg(short = 'p', long = "pretty")]
    pretty: bool,

    /// Worker threads; 0 uses one per core
    #[arg(long = "threads", default_value_t = 0)]
    threads: usize,

    #[arg(long = "no-progress", alias = "no_progress")]
    no_progress: bool,

    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("configure worker threads")?;
    }

    let options = ValidationOptions {
        delimiter: parse_delimiter(&args.delimiter)?,
        sample_date_cutoff: args
            .cutoff_date
            .as_deref()
            .map(parse_cutoff_date)
            .transpose()?,
    };
    info!(
        "validating {} as {} against {}",
        args.input.display(),
        args.kind,
        args.spec.display()
    );

    let progress_handler = (!args.no_progress).then(IndicatifHandler::new);
    let started_at = Instant::now();
    let outcome = validate_files_with_progress(
        &args.spec,
        &args.input,
        &args.kind,
        &options,
        progress_handler
            .as_ref()
            .map(|handler| handler as &dyn ProgressHandler),
    );
    if let Some(handler) = &progress_handler {
        handler.finish();
    }
    let elapsed = started_at.elapsed();
    info!(
        "{} records validated in {:?}: {} passed, {} failed",
        outcome.records.len(),
        elapsed,
        outcome.passed_count(),
        outcome.failed_count()
    );

    let summary = ReportSummary::new(&args.spec, &args.input)
        .with_record_kind(outcome.kind)
        .with_sample_date_cutoff(
            options
                .sample_date_cutoff
                .unwrap_or_else(default_sample_date_cutoff),
        )
        .with_validation_time_seconds(elapsed.as_secs_f64())
        .with_threads(rayon::current_num_threads());
    let report = ValidationReport::from_outcome(&outcome, summary);
    match args.output.as_ref() {
        Some(path) => {
            report.write_json_with_format(path, args.pretty)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", report.to_json(args.pretty)?),
    }

    if outcome.notices.has_errors() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_cutoff_date(value: &str) -> anyhow::Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("--cutoff-date cannot be empty");
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .with_context(|| format!("invalid --cutoff-date {}", value))
}

fn parse_delimiter(value: &str) -> anyhow::Result<u8> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        other => match other.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => bail!("--delimiter must be a single ASCII character, got {:?}", value),
        },
    }
}

struct IndicatifHandler {
    validation_pb: ProgressBar,
    failed: AtomicUsize,
}

impl IndicatifHandler {
    fn new() -> Self {
        let validation_pb = ProgressBar::new(0);
        validation_pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {percent}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        validation_pb.set_message("Waiting to validate...");
        Self {
            validation_pb,
            failed: AtomicUsize::new(0),
        }
    }

    fn finish(&self) {
        let failed = self.failed.load(Ordering::Relaxed);
        self.validation_pb
            .finish_with_message(format!("Validation complete, {} failed", failed));
    }
}

impl ProgressHandler for IndicatifHandler {
    fn on_start_record(&self, row: u64) {
        self.validation_pb.set_message(format!("Row {}", row));
    }

    fn on_finish_record(&self, _row: u64, passed: bool) {
        if !passed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn set_total_records(&self, count: usize) {
        self.validation_pb.set_length(count as u64);
        self.validation_pb.set_message("Starting validation...");
    }

    fn increment_record_progress(&self) {
        self.validation_pb.inc(1);
    }
}
