use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::calendar::Frequency;
use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::{GridVariable, RegionSet};
use crate::processors::{
    ConvertProcessor, FileAuditor, LapseRateCorrector, Reconciler, SizeAuditor, SyntheticElevation,
};
use crate::readers::{ArchiveScanner, ScannedFile};
use crate::writers::{ParquetWriter, ReportWriter};

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose, cli.quiet);
    let quiet = cli.quiet;

    match cli.command {
        Commands::Scan {
            data_dir,
            output_dir,
            vars,
            freq,
            start,
            end,
            min_size,
        } => {
            ensure_data_dir(&data_dir)?;
            let variables = parse_variables(&vars)?;
            let frequency: Frequency = freq.parse()?;
            let dates = parse_date_range(&start, &end)?;

            let mut handles = Vec::new();
            for variable in variables {
                let data_dir = data_dir.clone();
                let output_dir = output_dir.clone();
                handles.push(tokio::spawn(async move {
                    scan_variable(variable, frequency, dates, min_size, &data_dir, &output_dir)
                }));
            }
            for handle in handles {
                let summary = handle.await??;
                if !quiet {
                    println!("{}", summary);
                }
            }
        }

        Commands::Audit {
            data_dir,
            output_dir,
            vars,
            zero_ratio_threshold,
            format,
            compression,
            max_workers,
        } => {
            ensure_data_dir(&data_dir)?;
            let variables = parse_variables(&vars)?;
            let silent = quiet || variables.len() > 1;

            let mut handles = Vec::new();
            for variable in variables {
                let data_dir = data_dir.clone();
                let output_dir = output_dir.clone();
                let format = format.clone();
                let compression = compression.clone();
                handles.push(tokio::spawn(async move {
                    audit_variable(
                        variable,
                        zero_ratio_threshold,
                        &format,
                        &compression,
                        max_workers,
                        &data_dir,
                        &output_dir,
                        silent,
                    )
                }));
            }
            for handle in handles {
                let summary = handle.await??;
                if !quiet {
                    println!("{}", summary);
                }
            }
        }

        Commands::Sizes {
            data_dir,
            output_dir,
            vars,
            min_size,
        } => {
            ensure_data_dir(&data_dir)?;
            let variables = parse_variables(&vars)?;

            let mut handles = Vec::new();
            for variable in variables {
                let data_dir = data_dir.clone();
                let output_dir = output_dir.clone();
                handles.push(tokio::spawn(async move {
                    size_variable(variable, min_size, &data_dir, &output_dir)
                }));
            }
            for handle in handles {
                let summary = handle.await??;
                if !quiet {
                    println!("{}", summary);
                }
            }
        }

        Commands::Convert {
            data_dir,
            output_dir,
            var,
            freq,
            start,
            end,
            points,
            lapse_rate,
            reference_elevation,
            seed,
            raw_sentinels,
            max_workers,
        } => {
            ensure_data_dir(&data_dir)?;
            let variable: GridVariable = var.parse()?;
            let frequency: Frequency = freq.parse()?;
            let dates = parse_date_range(&start, &end)?;
            let regions = match points {
                Some(path) => RegionSet::from_csv(&path)?,
                None => RegionSet::korean_admin_regions(),
            };

            let listing = ArchiveScanner::new(variable).scan(&data_dir)?;
            let range = Reconciler::new(variable, frequency).resolve_range(&listing, dates)?;
            let selected: Vec<ScannedFile> = listing
                .by_timestamp()
                .into_values()
                .filter(|entry| range.contains(entry.timestamp))
                .cloned()
                .collect();

            info!(
                variable = %variable,
                files = selected.len(),
                points = regions.len(),
                "starting conversion batch"
            );

            let corrector = LapseRateCorrector::new()
                .with_lapse_rate(lapse_rate)
                .with_reference_elevation(reference_elevation);
            let processor = ConvertProcessor::new(regions, &output_dir)
                .with_max_workers(max_workers)
                .with_corrector(corrector)
                .with_elevation(Box::new(SyntheticElevation::new(seed)))
                .with_raw_sentinels(raw_sentinels)
                .with_silent(quiet);

            let report = processor.convert_all(variable, &selected)?;

            let writer = ReportWriter::new(&output_dir)?;
            writer.write_failures(&report.failures)?;
            let summary_path = writer.write_batch_summary(&report.to_summary())?;

            if !quiet {
                println!("{}", processor.generate_summary(&report));
                if report.failures.is_empty() {
                    println!("✅ Converted {} snapshots", report.records.len());
                } else {
                    println!(
                        "⚠️  {} of {} units failed; see convert_failures.csv",
                        report.failures.len(),
                        report.total
                    );
                }
                println!("Batch summary: {}", summary_path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    // A second init (tests, repeated calls) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn ensure_data_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(ProcessingError::Config(format!(
            "data directory not found: {}",
            path.display()
        )));
    }
    Ok(())
}

fn parse_variables(tokens: &[String]) -> Result<Vec<GridVariable>> {
    if tokens.is_empty() {
        return Ok(GridVariable::all().to_vec());
    }
    tokens.iter().map(|token| token.parse()).collect()
}

fn parse_date_range(
    start: &Option<String>,
    end: &Option<String>,
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")?;
            Ok(Some((start, end)))
        }
        (None, None) => Ok(None),
        _ => Err(ProcessingError::Config(
            "supply both --start and --end, or neither".to_string(),
        )),
    }
}

fn scan_variable(
    variable: GridVariable,
    frequency: Frequency,
    dates: Option<(NaiveDate, NaiveDate)>,
    min_size: Option<u64>,
    data_dir: &Path,
    output_dir: &Path,
) -> Result<String> {
    let listing = ArchiveScanner::new(variable).scan(data_dir)?;

    let mut reconciler = Reconciler::new(variable, frequency);
    if let Some(bytes) = min_size {
        reconciler = reconciler.with_min_size(bytes);
    }
    let range = reconciler.resolve_range(&listing, dates)?;
    let report = reconciler.reconcile(&range, &listing, data_dir);

    let writer = ReportWriter::new(output_dir)?;
    let missing_path = writer.write_missing(variable, &report.missing)?;
    writer.write_missing_monthly(variable, &report.monthly)?;

    let mut summary = reconciler.generate_summary(&report);
    summary.push_str(&format!("Missing-date report: {}\n", missing_path.display()));
    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn audit_variable(
    variable: GridVariable,
    zero_ratio_threshold: f64,
    format: &str,
    compression: &str,
    max_workers: usize,
    data_dir: &Path,
    output_dir: &Path,
    silent: bool,
) -> Result<String> {
    let listing = ArchiveScanner::new(variable).scan(data_dir)?;

    let auditor = FileAuditor::new(max_workers)
        .with_zero_ratio_threshold(zero_ratio_threshold)
        .with_silent(silent);
    let report = auditor.audit(variable, &listing)?;

    let writer = ReportWriter::new(output_dir)?;
    let mut summary = auditor.generate_summary(&report);

    match format.to_lowercase().as_str() {
        "parquet" => {
            let path = writer.audit_parquet_path(variable);
            let parquet = ParquetWriter::new().with_compression(compression)?;
            parquet.write_records(&report.records, &path)?;
            if !report.records.is_empty() {
                summary.push_str(&format!("\n{}\n", parquet.get_file_info(&path)?.summary()));
            }
        }
        "csv" => {
            writer.write_audit(variable, &report.records)?;
        }
        other => {
            return Err(ProcessingError::Config(format!(
                "Unsupported format: {}",
                other
            )))
        }
    }
    writer.write_audit_anomalous(variable, &report.anomalous)?;
    writer.write_audit_monthly(variable, &report.monthly)?;

    Ok(summary)
}

fn size_variable(
    variable: GridVariable,
    min_size: u64,
    data_dir: &Path,
    output_dir: &Path,
) -> Result<String> {
    let listing = ArchiveScanner::new(variable).scan(data_dir)?;

    let auditor = SizeAuditor::new(min_size);
    let report = auditor.audit(variable, &listing);

    let writer = ReportWriter::new(output_dir)?;
    writer.write_sizes(variable, &report.records)?;
    writer.write_sizes_undersized(variable, &report.undersized)?;

    Ok(auditor.generate_summary(&report))
}
