use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::models::{
    AuditRecord, BatchSummary, GridVariable, MissingRecord, MonthlyCount, SizeRecord, UnitFailure,
};

/// Writes tabular report artifacts under one output directory.
///
/// File names embed the variable token so runs over several variables land
/// side by side. Re-running overwrites; artifacts carry no state between runs.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn write_missing(
        &self,
        variable: GridVariable,
        records: &[MissingRecord],
    ) -> Result<PathBuf> {
        self.write_csv(
            &format!("missing_dates_{}.csv", variable.file_token()),
            records,
        )
    }

    pub fn write_missing_monthly(
        &self,
        variable: GridVariable,
        counts: &[MonthlyCount],
    ) -> Result<PathBuf> {
        self.write_csv(
            &format!("missing_dates_{}_monthly.csv", variable.file_token()),
            counts,
        )
    }

    pub fn write_audit(
        &self,
        variable: GridVariable,
        records: &[AuditRecord],
    ) -> Result<PathBuf> {
        self.write_csv(&format!("audit_{}_files.csv", variable.file_token()), records)
    }

    pub fn write_audit_anomalous(
        &self,
        variable: GridVariable,
        records: &[AuditRecord],
    ) -> Result<PathBuf> {
        self.write_csv(
            &format!("audit_{}_anomalous.csv", variable.file_token()),
            records,
        )
    }

    pub fn write_audit_monthly(
        &self,
        variable: GridVariable,
        counts: &[MonthlyCount],
    ) -> Result<PathBuf> {
        self.write_csv(
            &format!("audit_{}_monthly.csv", variable.file_token()),
            counts,
        )
    }

    /// Destination for the Parquet flavor of the full audit listing.
    pub fn audit_parquet_path(&self, variable: GridVariable) -> PathBuf {
        self.output_dir
            .join(format!("audit_{}_files.parquet", variable.file_token()))
    }

    pub fn write_sizes(&self, variable: GridVariable, records: &[SizeRecord]) -> Result<PathBuf> {
        self.write_csv(&format!("sizes_{}_all.csv", variable.file_token()), records)
    }

    pub fn write_sizes_undersized(
        &self,
        variable: GridVariable,
        records: &[SizeRecord],
    ) -> Result<PathBuf> {
        self.write_csv(
            &format!("sizes_{}_undersized.csv", variable.file_token()),
            records,
        )
    }

    pub fn write_failures(&self, failures: &[UnitFailure]) -> Result<PathBuf> {
        self.write_csv("convert_failures.csv", failures)
    }

    pub fn write_batch_summary(&self, summary: &BatchSummary) -> Result<PathBuf> {
        let path = self.output_dir.join("convert_summary.json");
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    fn write_csv<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}
