use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::warn;

use crate::error::{ProcessingError, Result};
use crate::models::{BatchSummary, ConvertRecord, GridVariable, RegionSet, UnitFailure};
use crate::processors::corrector::{ElevationSource, LapseRateCorrector, SyntheticElevation};
use crate::processors::resampler::Resampler;
use crate::readers::{GridReader, ScannedFile};
use crate::utils::constants::default_worker_count;
use crate::utils::filename::{mkprism_file_name, obs_file_name};
use crate::utils::progress::ProgressReporter;
use crate::writers::derived_writer;

/// Outcome of converting one variable's snapshot batch.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub variable: GridVariable,
    pub total: usize,
    /// One record per converted snapshot, sorted by timestamp.
    pub records: Vec<ConvertRecord>,
    pub failures: Vec<UnitFailure>,
}

impl ConvertReport {
    pub fn to_summary(&self) -> BatchSummary {
        BatchSummary {
            variable: self.variable,
            total: self.total,
            succeeded: self.records.len(),
            failed: self.failures.len(),
            failures: self.failures.clone(),
        }
    }
}

/// Converts snapshot files into derived products: a per-point `obs` extract
/// and an elevation-corrected `mkprism` grid per input file.
///
/// Units are independent. A failed unit removes its own partial output and
/// is reported; the batch keeps going.
pub struct ConvertProcessor {
    max_workers: usize,
    regions: RegionSet,
    corrector: LapseRateCorrector,
    elevation: Box<dyn ElevationSource>,
    output_dir: PathBuf,
    raw_sentinels: bool,
    silent: bool,
}

impl ConvertProcessor {
    pub fn new(regions: RegionSet, output_dir: &Path) -> Self {
        Self {
            max_workers: default_worker_count(),
            regions,
            corrector: LapseRateCorrector::new(),
            elevation: Box::new(SyntheticElevation::new(0)),
            output_dir: output_dir.to_path_buf(),
            raw_sentinels: false,
            silent: false,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_corrector(mut self, corrector: LapseRateCorrector) -> Self {
        self.corrector = corrector;
        self
    }

    pub fn with_elevation(mut self, elevation: Box<dyn ElevationSource>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_raw_sentinels(mut self, raw_sentinels: bool) -> Self {
        self.raw_sentinels = raw_sentinels;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn convert_all(
        &self,
        variable: GridVariable,
        entries: &[ScannedFile],
    ) -> Result<ConvertReport> {
        fs::create_dir_all(&self.output_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| {
                ProcessingError::Config(format!("failed to create thread pool: {}", e))
            })?;

        let progress = ProgressReporter::new(
            entries.len() as u64,
            &format!("Converting {} files", variable.display_name()),
            self.silent,
        );

        let outcomes: Vec<std::result::Result<ConvertRecord, UnitFailure>> = pool.install(|| {
            entries
                .par_iter()
                .map(|entry| {
                    let outcome = self.convert_one(variable, entry);
                    progress.increment(1);
                    outcome
                })
                .collect()
        });

        progress.finish_with_message(&format!("Converted {} files", entries.len()));

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(failure) => {
                    warn!(file = %failure.path, reason = %failure.reason, "convert unit failed");
                    failures.push(failure);
                }
            }
        }

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ConvertReport {
            variable,
            total: entries.len(),
            records,
            failures,
        })
    }

    fn convert_one(
        &self,
        variable: GridVariable,
        entry: &ScannedFile,
    ) -> std::result::Result<ConvertRecord, UnitFailure> {
        let fail = |reason: String| UnitFailure {
            path: entry.path.display().to_string(),
            reason,
        };

        let snapshot = GridReader::new()
            .read(&entry.path)
            .map_err(|e| fail(e.to_string()))?;

        let samples = Resampler::new(&snapshot.geometry).sample(&snapshot, &self.regions);
        let valid_points = samples.iter().filter(|s| s.value.is_some()).count();

        let source = entry
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let obs_path = self
            .output_dir
            .join(obs_file_name(variable, entry.timestamp));
        derived_writer::write_obs(&obs_path, variable, &samples, &source, self.raw_sentinels)
            .map_err(|e| fail(e.to_string()))?;

        // The two products of a unit land together or not at all.
        let mkprism_path = self
            .output_dir
            .join(mkprism_file_name(variable, entry.timestamp));
        let written = self
            .corrector
            .correct(
                &snapshot.scaled_values(),
                &self.elevation.elevations(&snapshot.geometry),
            )
            .and_then(|corrected| {
                derived_writer::write_mkprism(
                    &mkprism_path,
                    variable,
                    &snapshot.geometry,
                    &corrected,
                    self.corrector.lapse_rate(),
                    self.corrector.reference_elevation(),
                )
            });
        if let Err(e) = written {
            let _ = fs::remove_file(&obs_path);
            let _ = fs::remove_file(&mkprism_path);
            return Err(fail(e.to_string()));
        }

        Ok(ConvertRecord {
            timestamp: entry.timestamp,
            source,
            obs_path: obs_path.display().to_string(),
            mkprism_path: mkprism_path.display().to_string(),
            point_count: samples.len(),
            valid_points,
        })
    }

    pub fn generate_summary(&self, report: &ConvertReport) -> String {
        let mut summary = String::new();
        summary.push_str(&format!(
            "=== Conversion Report: {} ===\n",
            report.variable.display_name()
        ));
        summary.push_str(&format!("Files processed: {}\n", report.total));
        summary.push_str(&format!("Succeeded: {}\n", report.records.len()));
        summary.push_str(&format!("Failed: {}\n", report.failures.len()));
        summary.push_str(&format!("Points per file: {}\n", self.regions.len()));

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GridGeometry, Region};
    use crate::processors::corrector::UniformElevation;
    use crate::readers::ArchiveScanner;
    use tempfile::TempDir;

    fn write_grid(path: &Path, scale: f64, values: &[f64]) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("ny", 2).unwrap();
        file.add_dimension("nx", 2).unwrap();
        file.add_attribute("grid_size", 0.05f64).unwrap();
        file.add_attribute("grid_nx", 2i32).unwrap();
        file.add_attribute("grid_ny", 2i32).unwrap();
        file.add_attribute("map_slon", 124.0f64).unwrap();
        file.add_attribute("map_slat", 33.0f64).unwrap();
        let mut var = file.add_variable::<f64>("data", &["ny", "nx"]).unwrap();
        var.put_attribute("data_scale", scale).unwrap();
        var.put_values(values, ..).unwrap();
    }

    fn corner_regions() -> RegionSet {
        RegionSet::new(vec![
            Region::new("SW", 33.0, 124.0),
            Region::new("NE", 33.05, 124.05),
        ])
        .unwrap()
    }

    fn processor(regions: RegionSet, output_dir: &Path) -> ConvertProcessor {
        ConvertProcessor::new(regions, output_dir)
            .with_max_workers(2)
            .with_silent(true)
            .with_elevation(Box::new(UniformElevation(500.0)))
    }

    #[test]
    fn test_convert_writes_both_products() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        // Row-major 2x2: SW corner = raw 150, NE corner = raw 0.
        write_grid(
            &input.path().join("sfc_grid_ta_202001010100.nc"),
            10.0,
            &[150.0, -9990.0, 30.0, 0.0],
        );
        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(input.path())
            .unwrap();

        let report = processor(corner_regions(), output.path())
            .convert_all(GridVariable::Temperature, &listing.entries)
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.failures.len(), 0);
        let record = &report.records[0];
        assert_eq!(record.point_count, 2);
        assert_eq!(record.valid_points, 2);
        assert_eq!(record.source, "sfc_grid_ta_202001010100.nc");

        let obs = netcdf::open(output.path().join("obs_ta_202001010100.nc")).unwrap();
        let values = obs
            .variable("temperature")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();
        assert_eq!(values, vec![15.0, 0.0]);

        // Uniform elevation at the reference leaves values unchanged.
        let mkprism = netcdf::open(output.path().join("mkprism_ta_202001010100.nc")).unwrap();
        let grid = mkprism
            .variable("temperature")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();
        assert_eq!(grid[0], 15.0);
        assert!(grid[1].is_nan());
        assert_eq!(grid[3], 0.0);
    }

    #[test]
    fn test_corrupt_unit_reported_batch_continues() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_grid(
            &input.path().join("sfc_grid_ta_202001010100.nc"),
            10.0,
            &[1.0, 2.0, 3.0, 4.0],
        );
        fs::write(
            input.path().join("sfc_grid_ta_202001010200.nc"),
            b"not netcdf",
        )
        .unwrap();
        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(input.path())
            .unwrap();

        let report = processor(corner_regions(), output.path())
            .convert_all(GridVariable::Temperature, &listing.entries)
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(output.path().join("obs_ta_202001010100.nc").exists());
        assert!(!output.path().join("obs_ta_202001010200.nc").exists());

        let summary = report.to_summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_failed_unit_removes_partial_obs() {
        struct BadElevation;
        impl ElevationSource for BadElevation {
            fn elevations(&self, _geometry: &GridGeometry) -> Vec<f64> {
                vec![1.0]
            }
        }

        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_grid(
            &input.path().join("sfc_grid_ta_202001010100.nc"),
            10.0,
            &[1.0, 2.0, 3.0, 4.0],
        );
        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(input.path())
            .unwrap();

        let report = processor(corner_regions(), output.path())
            .with_elevation(Box::new(BadElevation))
            .convert_all(GridVariable::Temperature, &listing.entries)
            .unwrap();

        assert_eq!(report.records.len(), 0);
        assert_eq!(report.failures.len(), 1);
        assert!(!output.path().join("obs_ta_202001010100.nc").exists());
        assert!(!output.path().join("mkprism_ta_202001010100.nc").exists());
    }

    #[test]
    fn test_summary_text() {
        let output = TempDir::new().unwrap();
        let processor = processor(corner_regions(), output.path());
        let report = ConvertReport {
            variable: GridVariable::Temperature,
            total: 3,
            records: vec![],
            failures: vec![UnitFailure {
                path: "a.nc".to_string(),
                reason: "boom".to_string(),
            }],
        };

        let summary = processor.generate_summary(&report);
        assert!(summary.contains("=== Conversion Report: Air Temperature ==="));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("a.nc: boom"));
    }
}
