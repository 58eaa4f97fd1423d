use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::warn;

use crate::error::{ProcessingError, Result};
use crate::models::{AuditRecord, GridVariable, MonthlyCount, SizeRecord, UnitFailure};
use crate::processors::reconciler::monthly_counts;
use crate::readers::{ArchiveListing, GridReader, ScannedFile};
use crate::utils::constants::{default_worker_count, DEFAULT_ZERO_RATIO_THRESHOLD};
use crate::utils::format::format_size;
use crate::utils::progress::ProgressReporter;

/// Value-distribution audit over one variable's snapshot files.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub variable: GridVariable,
    /// One record per readable file, sorted by timestamp.
    pub records: Vec<AuditRecord>,
    /// Records whose zero ratio reached the threshold.
    pub anomalous: Vec<AuditRecord>,
    /// Monthly counts of anomalous records.
    pub monthly: Vec<MonthlyCount>,
    /// Files that could not be read. Never aborts the batch.
    pub failures: Vec<UnitFailure>,
}

impl AuditReport {
    pub fn no_valid_data_count(&self) -> usize {
        self.records.iter().filter(|r| r.no_valid_data).count()
    }
}

/// Opens every snapshot in a listing and summarizes its raw value
/// distribution on a bounded worker pool. Results are sorted by timestamp
/// after the parallel phase so output never depends on scheduling.
pub struct FileAuditor {
    max_workers: usize,
    zero_ratio_threshold: f64,
    silent: bool,
}

impl FileAuditor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            zero_ratio_threshold: DEFAULT_ZERO_RATIO_THRESHOLD,
            silent: false,
        }
    }

    pub fn with_zero_ratio_threshold(mut self, threshold: f64) -> Self {
        self.zero_ratio_threshold = threshold;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn audit(&self, variable: GridVariable, listing: &ArchiveListing) -> Result<AuditReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| {
                ProcessingError::Config(format!("failed to create thread pool: {}", e))
            })?;

        let progress = ProgressReporter::new(
            listing.entries.len() as u64,
            &format!("Auditing {} files", variable.display_name()),
            self.silent,
        );
        let processed = Arc::new(AtomicUsize::new(0));

        let outcomes: Vec<std::result::Result<AuditRecord, UnitFailure>> = pool.install(|| {
            listing
                .entries
                .par_iter()
                .map(|entry| {
                    let outcome = audit_file(entry);
                    processed.fetch_add(1, Ordering::Relaxed);
                    progress.increment(1);
                    outcome
                })
                .collect()
        });

        progress.finish_with_message(&format!(
            "Audited {} files",
            processed.load(Ordering::Relaxed)
        ));

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(failure) => {
                    warn!(file = %failure.path, reason = %failure.reason, "audit unit failed");
                    failures.push(failure);
                }
            }
        }

        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.filename.cmp(&b.filename)));
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        let anomalous: Vec<AuditRecord> = records
            .iter()
            .filter(|r| r.zero_ratio >= self.zero_ratio_threshold)
            .cloned()
            .collect();
        let monthly = monthly_counts(anomalous.iter().map(|r| r.date));

        Ok(AuditReport {
            variable,
            records,
            anomalous,
            monthly,
            failures,
        })
    }

    pub fn generate_summary(&self, report: &AuditReport) -> String {
        let mut summary = String::new();
        summary.push_str(&format!(
            "=== Value Audit: {} ===\n",
            report.variable.display_name()
        ));
        summary.push_str(&format!("Files audited: {}\n", report.records.len()));
        summary.push_str(&format!(
            "Anomalous (zero ratio >= {:.2}): {}\n",
            self.zero_ratio_threshold,
            report.anomalous.len()
        ));
        summary.push_str(&format!(
            "No valid data: {}\n",
            report.no_valid_data_count()
        ));
        summary.push_str(&format!("Failed to read: {}\n", report.failures.len()));

        if !report.failures.is_empty() {
            summary.push_str("\nFailures:\n");
            for failure in report.failures.iter().take(10) {
                summary.push_str(&format!("  {}: {}\n", failure.path, failure.reason));
            }
            if report.failures.len() > 10 {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    report.failures.len() - 10
                ));
            }
        }

        summary
    }
}

impl Default for FileAuditor {
    fn default() -> Self {
        Self::new(default_worker_count())
    }
}

/// Audit one snapshot file. Statistics are over raw stored samples; the
/// scale factor is deliberately not applied here.
fn audit_file(entry: &ScannedFile) -> std::result::Result<AuditRecord, UnitFailure> {
    let snapshot = match GridReader::new().read(&entry.path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return Err(UnitFailure {
                path: entry.path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    let stats = snapshot.stats();
    let (no_valid_data, reason) = if stats.no_valid_data() {
        (true, Some("All values invalid (-9990)".to_string()))
    } else {
        (false, None)
    };

    Ok(AuditRecord {
        date: entry.timestamp,
        size_bytes: entry.size,
        filename: file_name_of(entry),
        min: stats.min,
        max: stats.max,
        no_valid_data,
        zero_ratio: stats.zero_ratio,
        negative_ratio: stats.negative_ratio,
        reason,
    })
}

/// Size listing over one variable's snapshot files.
///
/// Works purely from directory metadata; files are never opened.
pub struct SizeAuditor {
    min_size: u64,
}

#[derive(Debug, Clone)]
pub struct SizeReport {
    pub variable: GridVariable,
    /// One record per file, sorted by file name.
    pub records: Vec<SizeRecord>,
    /// Files strictly below the minimum expected size.
    pub undersized: Vec<SizeRecord>,
}

impl SizeAuditor {
    pub fn new(min_size: u64) -> Self {
        Self { min_size }
    }

    pub fn audit(&self, variable: GridVariable, listing: &ArchiveListing) -> SizeReport {
        let mut records: Vec<SizeRecord> = listing
            .entries
            .iter()
            .map(|entry| SizeRecord {
                filename: file_name_of(entry),
                size_bytes: entry.size,
                size_human: format_size(entry.size),
                path: entry.path.display().to_string(),
            })
            .collect();
        records.sort_by(|a, b| a.filename.cmp(&b.filename).then_with(|| a.path.cmp(&b.path)));

        let undersized = records
            .iter()
            .filter(|r| r.size_bytes < self.min_size)
            .cloned()
            .collect();

        SizeReport {
            variable,
            records,
            undersized,
        }
    }

    pub fn generate_summary(&self, report: &SizeReport) -> String {
        let total_bytes: u64 = report.records.iter().map(|r| r.size_bytes).sum();
        let mut summary = String::new();
        summary.push_str(&format!(
            "=== Size Listing: {} ===\n",
            report.variable.display_name()
        ));
        summary.push_str(&format!("Files listed: {}\n", report.records.len()));
        summary.push_str(&format!("Total size: {}\n", format_size(total_bytes)));
        summary.push_str(&format!(
            "Undersized (< {}): {}\n",
            format_size(self.min_size),
            report.undersized.len()
        ));
        summary
    }
}

fn file_name_of(entry: &ScannedFile) -> String {
    entry
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileTimestamp;
    use crate::readers::ArchiveScanner;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_grid(path: &Path, scale: f64, values: &[f64]) {
        let ny = 1;
        let nx = values.len();
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("ny", ny).unwrap();
        file.add_dimension("nx", nx).unwrap();
        file.add_attribute("grid_size", 0.05f64).unwrap();
        file.add_attribute("grid_nx", nx as i32).unwrap();
        file.add_attribute("grid_ny", ny as i32).unwrap();
        file.add_attribute("map_slon", 124.0f64).unwrap();
        file.add_attribute("map_slat", 33.0f64).unwrap();
        let mut var = file.add_variable::<f64>("data", &["ny", "nx"]).unwrap();
        var.put_attribute("data_scale", scale).unwrap();
        var.put_values(values, ..).unwrap();
    }

    fn scan(dir: &Path) -> ArchiveListing {
        ArchiveScanner::new(GridVariable::Temperature)
            .scan(dir)
            .unwrap()
    }

    #[test]
    fn test_audit_flags_all_sentinel_files() {
        let dir = TempDir::new().unwrap();
        write_grid(
            &dir.path().join("sfc_grid_ta_202001010200.nc"),
            10.0,
            &[-9990.0, -9990.0],
        );
        write_grid(
            &dir.path().join("sfc_grid_ta_202001010100.nc"),
            10.0,
            &[150.0, -30.0],
        );

        let report = FileAuditor::new(2)
            .with_silent(true)
            .audit(GridVariable::Temperature, &scan(dir.path()))
            .unwrap();

        assert_eq!(report.records.len(), 2);
        // Sorted by timestamp regardless of scheduling.
        assert_eq!(report.records[0].date.to_string(), "202001010100");
        assert!(!report.records[0].no_valid_data);
        assert_eq!(report.records[0].min, Some(-30.0));
        assert_eq!(report.records[0].max, Some(150.0));

        let dead = &report.records[1];
        assert!(dead.no_valid_data);
        assert_eq!(dead.min, None);
        assert_eq!(dead.reason.as_deref(), Some("All values invalid (-9990)"));
        assert_eq!(report.no_valid_data_count(), 1);
    }

    #[test]
    fn test_audit_zero_ratio_threshold_is_inclusive() {
        let dir = TempDir::new().unwrap();
        // 3 zeros out of 10 valid: exactly at the 0.3 threshold.
        let mut values = vec![1.0; 10];
        values[0] = 0.0;
        values[1] = 0.0;
        values[2] = 0.0;
        write_grid(&dir.path().join("sfc_grid_ta_202001010100.nc"), 10.0, &values);
        write_grid(
            &dir.path().join("sfc_grid_ta_202002010100.nc"),
            10.0,
            &[1.0, 2.0],
        );

        let report = FileAuditor::new(1)
            .with_silent(true)
            .audit(GridVariable::Temperature, &scan(dir.path()))
            .unwrap();

        assert_eq!(report.anomalous.len(), 1);
        assert_eq!(report.anomalous[0].zero_ratio, 0.3);
        assert_eq!(
            report.monthly,
            vec![MonthlyCount {
                year: 2020,
                month: 1,
                count: 1
            }]
        );
    }

    #[test]
    fn test_corrupt_file_fails_unit_not_batch() {
        let dir = TempDir::new().unwrap();
        write_grid(
            &dir.path().join("sfc_grid_ta_202001010100.nc"),
            10.0,
            &[1.0, 2.0],
        );
        fs::write(dir.path().join("sfc_grid_ta_202001010200.nc"), b"not netcdf").unwrap();

        let report = FileAuditor::new(2)
            .with_silent(true)
            .audit(GridVariable::Temperature, &scan(dir.path()))
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.contains("202001010200"));

        let summary = FileAuditor::new(2).generate_summary(&report);
        assert!(summary.contains("Files audited: 1"));
        assert!(summary.contains("Failed to read: 1"));
    }

    #[test]
    fn test_audit_is_deterministic_across_runs() {
        let dir = TempDir::new().unwrap();
        for hour in 1..=6 {
            write_grid(
                &dir.path().join(format!("sfc_grid_ta_2020010106{:02}.nc", hour)),
                10.0,
                &[hour as f64, 0.0],
            );
        }

        let listing = scan(dir.path());
        let first = FileAuditor::new(3)
            .with_silent(true)
            .audit(GridVariable::Temperature, &listing)
            .unwrap();
        let second = FileAuditor::new(1)
            .with_silent(true)
            .audit(GridVariable::Temperature, &listing)
            .unwrap();

        assert_eq!(first.records, second.records);
    }

    #[test]
    fn test_size_audit_partition_and_boundary() {
        let entries = vec![
            ScannedFile {
                path: PathBuf::from("b/sfc_grid_ta_202001010200.nc"),
                size: 48128,
                timestamp: FileTimestamp::parse("202001010200").unwrap(),
            },
            ScannedFile {
                path: PathBuf::from("a/sfc_grid_ta_202001010100.nc"),
                size: 1024,
                timestamp: FileTimestamp::parse("202001010100").unwrap(),
            },
        ];
        let listing = ArchiveListing {
            entries,
            unparseable: vec![],
        };

        let report = SizeAuditor::new(48128).audit(GridVariable::Temperature, &listing);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].filename, "sfc_grid_ta_202001010100.nc");
        assert_eq!(report.records[0].size_human, "1.0KB");

        // A file exactly at the minimum is not undersized.
        assert_eq!(report.undersized.len(), 1);
        assert_eq!(report.undersized[0].size_bytes, 1024);

        let summary = SizeAuditor::new(48128).generate_summary(&report);
        assert!(summary.contains("Undersized (< 47.0KB): 1"));
    }
}
