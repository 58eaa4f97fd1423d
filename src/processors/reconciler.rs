use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::calendar::{ExpectedRange, Frequency};
use crate::error::{ProcessingError, Result};
use crate::models::{FileTimestamp, GridVariable, MissingReason, MissingRecord, MonthlyCount};
use crate::readers::ArchiveListing;
use crate::utils::filename::archive_relative_path;

/// Completeness report for one variable over one expected range.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingReport {
    pub variable: GridVariable,
    pub frequency: Frequency,
    pub expected: usize,
    pub observed: usize,
    pub missing: Vec<MissingRecord>,
    pub monthly: Vec<MonthlyCount>,
    pub unparseable: usize,
}

impl MissingReport {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Reconciles the expected snapshot sequence against scanned archive files.
///
/// The decision is pure: it works entirely from the listing the scanner
/// produced and never re-reads the filesystem, so reconciling the same
/// listing twice yields identical reports.
pub struct Reconciler {
    variable: GridVariable,
    frequency: Frequency,
    min_size: Option<u64>,
}

impl Reconciler {
    pub fn new(variable: GridVariable, frequency: Frequency) -> Self {
        Self {
            variable,
            frequency,
            min_size: None,
        }
    }

    /// Also treat files smaller than `bytes` as missing, reported as
    /// undersized rather than absent.
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size = Some(bytes);
        self
    }

    /// Resolve the range to reconcile: explicit dates when given, otherwise
    /// the observed minimum and maximum timestamps of the listing.
    pub fn resolve_range(
        &self,
        listing: &ArchiveListing,
        dates: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ExpectedRange> {
        match dates {
            Some((start, end)) => ExpectedRange::from_dates(start, end, self.frequency),
            None => {
                let (first, last) = listing.bounds().ok_or_else(|| {
                    ProcessingError::MissingData(format!(
                        "no {} grid files found; supply an explicit start/end range",
                        self.variable
                    ))
                })?;
                ExpectedRange::from_instants(first, last, self.frequency)
            }
        }
    }

    /// Walk the expected instants and classify each as observed or missing.
    /// Observed files outside the range are ignored.
    pub fn reconcile(
        &self,
        range: &ExpectedRange,
        listing: &ArchiveListing,
        data_dir: &Path,
    ) -> MissingReport {
        let observed = listing.by_timestamp();
        let mut missing = Vec::new();
        let mut observed_in_range = 0usize;

        for instant in range.instants() {
            match observed.get(&instant) {
                Some(entry) => match self.min_size {
                    Some(threshold) if entry.size < threshold => {
                        missing.push(self.record(
                            instant,
                            MissingReason::Undersized,
                            entry.path.display().to_string(),
                        ));
                    }
                    _ => observed_in_range += 1,
                },
                None => {
                    let path = data_dir.join(archive_relative_path(self.variable, instant));
                    missing.push(self.record(
                        instant,
                        MissingReason::Absent,
                        path.display().to_string(),
                    ));
                }
            }
        }

        let monthly = monthly_counts(missing.iter().map(|r| r.missing_date));

        info!(
            variable = %self.variable,
            expected = range.len(),
            missing = missing.len(),
            "completeness reconciliation finished"
        );

        MissingReport {
            variable: self.variable,
            frequency: range.frequency(),
            expected: range.len(),
            observed: observed_in_range,
            missing,
            monthly,
            unparseable: listing.unparseable.len(),
        }
    }

    pub fn generate_summary(&self, report: &MissingReport) -> String {
        let mut summary = String::new();
        summary.push_str(&format!(
            "=== Completeness Report: {} ({}) ===\n",
            report.variable.display_name(),
            report.frequency.label()
        ));
        summary.push_str(&format!("Expected snapshots: {}\n", report.expected));
        summary.push_str(&format!("Observed snapshots: {}\n", report.observed));

        let missing_pct = if report.expected > 0 {
            report.missing.len() as f64 / report.expected as f64 * 100.0
        } else {
            0.0
        };
        summary.push_str(&format!(
            "Missing snapshots: {} ({:.1}%)\n",
            report.missing.len(),
            missing_pct
        ));

        let absent = report
            .missing
            .iter()
            .filter(|r| r.reason == MissingReason::Absent)
            .count();
        summary.push_str(&format!("  Absent: {}\n", absent));
        summary.push_str(&format!("  Undersized: {}\n", report.missing.len() - absent));

        if report.unparseable > 0 {
            summary.push_str(&format!(
                "Unparseable file names skipped: {}\n",
                report.unparseable
            ));
        }

        if !report.monthly.is_empty() {
            summary.push_str("\nWorst months:\n");
            let mut months = report.monthly.clone();
            months.sort_by(|a, b| b.count.cmp(&a.count));
            for bucket in months.iter().take(5) {
                summary.push_str(&format!(
                    "  {}-{:02}: {} missing\n",
                    bucket.year, bucket.month, bucket.count
                ));
            }
        }

        summary
    }

    fn record(&self, timestamp: FileTimestamp, reason: MissingReason, path: String) -> MissingRecord {
        MissingRecord {
            variable: self.variable,
            missing_date: timestamp,
            year: timestamp.year(),
            month: timestamp.month(),
            day: timestamp.day(),
            path,
            reason,
        }
    }
}

/// Group timestamps into sorted year-month buckets.
pub fn monthly_counts(timestamps: impl Iterator<Item = FileTimestamp>) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for ts in timestamps {
        *buckets.entry((ts.year(), ts.month())).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month), count)| MonthlyCount { year, month, count })
        .collect()
}
