// Declare modules
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod formatter;
pub mod models;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use self::cli::Cli;
use self::config::{resolve_config, DEFAULT_CONFIG};
use self::error::BlueprintError;
use self::formatter::OutputGenerator;
use self::models::{BlueprintConfig, ScanResult, WriteReport};
use self::scanner::Scanner;

/// What a completed run produced, for the summary.
#[derive(Debug)]
pub struct Outcome {
    pub scan: ScanResult,
    pub report: WriteReport,
    /// Categories with accepted files that `category_order` leaves out.
    pub unlisted: Vec<(String, usize)>,
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    if args.print_default_config {
        print!("{}", DEFAULT_CONFIG);
        return Ok(());
    }

    // 2. Resolve Configuration (fatal before any traversal)
    let config = resolve_config(&args)?;

    if config.core_file_patterns.is_empty() {
        log::warn!("💡 Tip: No core_file_patterns configured; the blueprint will be empty.");
    }

    // 3. Scan + Write
    let started = Instant::now();
    let outcome = build_blueprint(&args.project_path, &args.output, &config)?;

    // 4. Summary
    log_summary(&outcome, &config, &args.output, started.elapsed());

    Ok(())
}

/// Scans `root` and writes the blueprint to `output`.
///
/// The output file is created only after the scan succeeds, and is always
/// written (possibly empty) once it does.
pub fn build_blueprint(root: &Path, output: &Path, config: &BlueprintConfig) -> Result<Outcome> {
    // A previous blueprint inside the tree must not end up in the next one.
    let scanner = Scanner::new(root, config)?.with_excluded_path(fs::canonicalize(output).ok());

    log::info!("🚀 Scanning project: {}", scanner.root().display());
    let scan = scanner.scan();

    let generator = OutputGenerator::new(config);
    let file = File::create(output)
        .map_err(|e| BlueprintError::OutputCreate(output.to_path_buf(), e))?;
    let mut sink = BufWriter::new(file);

    log::info!("[*] Aggregating blueprint files...");
    let report = generator
        .write(&scan, &mut sink)
        .with_context(|| format!("Failed to write blueprint to {}", output.display()))?;
    sink.flush()
        .with_context(|| format!("Failed to write blueprint to {}", output.display()))?;

    let unlisted = generator.unlisted_categories(&scan);
    Ok(Outcome {
        scan,
        report,
        unlisted,
    })
}

/// Skips from both passes, grouped by reason.
fn skip_counts(outcome: &Outcome) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for skipped in outcome.scan.skipped.iter().chain(&outcome.report.failed) {
        *counts.entry(skipped.reason.kind()).or_insert(0) += 1;
    }
    counts
}

fn log_summary(outcome: &Outcome, config: &BlueprintConfig, output: &Path, elapsed: Duration) {
    let scan = &outcome.scan;
    let report = &outcome.report;

    log::info!("✅ Scan complete in {:.2}s", elapsed.as_secs_f64());
    log::info!("📁 Files scanned: {}", scan.total_files_scanned);
    log::info!(
        "   ignored: {}, unclassified: {}, pruned directories: {}",
        scan.ignored_files,
        scan.unclassified_files,
        scan.pruned_dirs
    );
    log::info!("   accepted after checks: {}", scan.accepted_count());
    for (kind, count) in skip_counts(outcome) {
        log::info!("   skipped ({}): {}", kind, count);
    }
    log::info!("🎯 Files captured: {}", report.total_captured());
    log::info!("💾 Output file: {}", output.display());

    for category in &config.category_order {
        if let Some((_, count)) = report
            .captured_by_category
            .iter()
            .find(|(name, _)| name == category)
        {
            log::info!("  - {}: {} files", category, count);
        }
    }
    for (category, count) in &outcome.unlisted {
        log::warn!(
            "⚠️ {} file(s) in category '{}' omitted: not listed in category_order",
            count,
            category
        );
    }
}
