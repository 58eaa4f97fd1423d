use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{FileTimestamp, GridVariable};
use crate::utils::constants::GRID_FILE_EXTENSION;
use crate::utils::filename::{timestamp_token, variable_prefix};

/// One archive file whose name parsed cleanly.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size: u64,
    pub timestamp: FileTimestamp,
}

/// Result of walking an archive for one variable.
#[derive(Debug, Default)]
pub struct ArchiveListing {
    /// Parsed files, sorted by timestamp then path.
    pub entries: Vec<ScannedFile>,
    /// Files matching the variable's name pattern whose timestamp token
    /// did not parse. Reported, never silently dropped.
    pub unparseable: Vec<PathBuf>,
}

impl ArchiveListing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest and latest observed timestamps.
    pub fn bounds(&self) -> Option<(FileTimestamp, FileTimestamp)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Best entry per timestamp. When duplicates exist in different
    /// directories the largest file wins.
    pub fn by_timestamp(&self) -> BTreeMap<FileTimestamp, &ScannedFile> {
        let mut map: BTreeMap<FileTimestamp, &ScannedFile> = BTreeMap::new();
        for entry in &self.entries {
            map.entry(entry.timestamp)
                .and_modify(|held| {
                    if entry.size > held.size {
                        *held = entry;
                    }
                })
                .or_insert(entry);
        }
        map
    }
}

/// Recursive directory walker collecting one variable's snapshot files.
///
/// Only the file name matters: `sfc_grid_{var}_{YYYYMMDDHHMM}.nc` anywhere
/// below the root is picked up, so reorganized archives keep working.
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    variable: GridVariable,
}

impl ArchiveScanner {
    pub fn new(variable: GridVariable) -> Self {
        Self { variable }
    }

    pub fn scan(&self, root: &Path) -> Result<ArchiveListing> {
        let prefix = variable_prefix(self.variable);
        let suffix = format!(".{}", GRID_FILE_EXTENSION);
        let mut entries = Vec::new();
        let mut unparseable = Vec::new();

        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for dir_entry in fs::read_dir(&dir)? {
                let dir_entry = dir_entry?;
                let path = dir_entry.path();
                if dir_entry.file_type()?.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if !name.starts_with(&prefix) || !name.ends_with(&suffix) {
                    continue;
                }

                let token = timestamp_token(name).unwrap_or("");
                match FileTimestamp::parse(token) {
                    Ok(timestamp) => {
                        let size = dir_entry.metadata()?.len();
                        entries.push(ScannedFile {
                            path,
                            size,
                            timestamp,
                        });
                    }
                    Err(_) => {
                        warn!(
                            file = %path.display(),
                            "skipping grid file with unparseable timestamp token"
                        );
                        unparseable.push(path);
                    }
                }
            }
        }

        entries.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.path.cmp(&b.path))
        });
        unparseable.sort();

        debug!(
            variable = %self.variable,
            files = entries.len(),
            unparseable = unparseable.len(),
            "archive scan complete"
        );

        Ok(ArchiveListing {
            entries,
            unparseable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str, bytes: usize) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        file.write_all(&vec![0u8; bytes]).unwrap();
    }

    #[test]
    fn test_scan_finds_nested_files_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "org/sgd/2020/01/02/sfc_grid_ta_202001020100.nc", 10);
        touch(dir.path(), "org/sgd/2020/01/01/sfc_grid_ta_202001010100.nc", 10);

        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(dir.path())
            .unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing.entries[0].timestamp.to_string(), "202001010100");
        assert_eq!(listing.entries[1].timestamp.to_string(), "202001020100");
        assert!(listing.unparseable.is_empty());
    }

    #[test]
    fn test_scan_ignores_other_variables() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sfc_grid_ta_202001010100.nc", 10);
        touch(dir.path(), "sfc_grid_rn_day_202001010100.nc", 10);
        touch(dir.path(), "notes.txt", 10);

        let listing = ArchiveScanner::new(GridVariable::DailyRainfall)
            .scan(dir.path())
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert!(listing.entries[0]
            .path
            .to_string_lossy()
            .contains("rn_day"));
    }

    #[test]
    fn test_scan_records_unparseable_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "sfc_grid_ta_202001010100.nc", 10);
        // Ten digits and garbage: both match the glob shape but not the token rule.
        touch(dir.path(), "sfc_grid_ta_2020010101.nc", 10);
        touch(dir.path(), "sfc_grid_ta_banana.nc", 10);

        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(dir.path())
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing.unparseable.len(), 2);
    }

    #[test]
    fn test_bounds_and_duplicate_resolution() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/sfc_grid_ta_202001010100.nc", 10);
        touch(dir.path(), "b/sfc_grid_ta_202001010100.nc", 64);
        touch(dir.path(), "a/sfc_grid_ta_202001010300.nc", 10);

        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(dir.path())
            .unwrap();

        let (first, last) = listing.bounds().unwrap();
        assert_eq!(first.to_string(), "202001010100");
        assert_eq!(last.to_string(), "202001010300");

        let by_ts = listing.by_timestamp();
        assert_eq!(by_ts.len(), 2);
        let dup = by_ts[&first];
        assert_eq!(dup.size, 64);
    }

    #[test]
    fn test_scan_empty_listing() {
        let dir = TempDir::new().unwrap();
        let listing = ArchiveScanner::new(GridVariable::Temperature)
            .scan(dir.path())
            .unwrap();
        assert!(listing.is_empty());
        assert!(listing.bounds().is_none());
    }
}
