use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{FileTimestamp, GridVariable};

/// Why an expected snapshot is reported missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingReason {
    /// No file with the expected timestamp exists anywhere in the archive.
    Absent,
    /// A file exists but is smaller than the configured minimum size.
    Undersized,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::Absent => f.write_str("absent"),
            MissingReason::Undersized => f.write_str("undersized"),
        }
    }
}

/// One row of the completeness report. `path` is the location the snapshot
/// was expected at (or found at, for undersized files).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRecord {
    pub variable: GridVariable,
    pub missing_date: FileTimestamp,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub path: String,
    pub reason: MissingReason,
}

/// Count of records falling in one year-month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// One row of the value-distribution audit. Statistics are taken over the
/// raw stored samples, before any scale factor is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub date: FileTimestamp,
    pub size_bytes: u64,
    pub filename: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub no_valid_data: bool,
    pub zero_ratio: f64,
    pub negative_ratio: f64,
    pub reason: Option<String>,
}

/// One row of the file-size listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub path: String,
}

/// A unit that failed inside a batch without aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    pub path: String,
    pub reason: String,
}

/// Successful conversion of one snapshot into its derived outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertRecord {
    pub timestamp: FileTimestamp,
    pub source: String,
    pub obs_path: String,
    pub mkprism_path: String,
    pub point_count: usize,
    pub valid_points: usize,
}

/// Aggregate outcome of a conversion batch, written alongside the
/// per-failure listing as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub variable: GridVariable,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<UnitFailure>,
}
