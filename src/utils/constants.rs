/// Grid file naming
pub const GRID_FILE_PREFIX: &str = "sfc_grid";
pub const GRID_FILE_EXTENSION: &str = "nc";
pub const OBS_FILE_PREFIX: &str = "obs";
pub const MKPRISM_FILE_PREFIX: &str = "mkprism";

/// Archive directory layout under the data root
pub const ARCHIVE_SUBDIRS: [&str; 2] = ["org", "sgd"];

/// Compact timestamp token embedded in file names (YYYYMMDDHHMM)
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";
pub const COMPACT_TIMESTAMP_LEN: usize = 12;

/// NetCDF variable and attribute names inside grid files
pub const GRID_DATA_VARIABLE: &str = "data";
pub const ATTR_DATA_SCALE: &str = "data_scale";
pub const ATTR_GRID_SIZE: &str = "grid_size";
pub const ATTR_GRID_NX: &str = "grid_nx";
pub const ATTR_GRID_NY: &str = "grid_ny";
pub const ATTR_MAP_SLON: &str = "map_slon";
pub const ATTR_MAP_SLAT: &str = "map_slat";

/// Missing-value sentinel stored in raw grid samples
pub const MISSING_SENTINEL: f64 = -9990.0;

/// Audit thresholds
pub const DEFAULT_ZERO_RATIO_THRESHOLD: f64 = 0.3;
pub const DEFAULT_MIN_FILE_SIZE: u64 = 47 * 1024;

/// Lapse-rate correction defaults
pub const DEFAULT_LAPSE_RATE: f64 = -6.5;
pub const DEFAULT_REFERENCE_ELEVATION: f64 = 500.0;
pub const SYNTHETIC_ELEVATION_MIN: f64 = 400.0;
pub const SYNTHETIC_ELEVATION_MAX: f64 = 600.0;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const WORKER_CORE_RATIO: usize = 4;

/// Default worker count: one worker per four cores, at least one.
pub fn default_worker_count() -> usize {
    (num_cpus::get() / WORKER_CORE_RATIO).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_worker_count_at_least_one() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn test_min_file_size_is_47_kib() {
        assert_eq!(DEFAULT_MIN_FILE_SIZE, 48128);
    }
}
