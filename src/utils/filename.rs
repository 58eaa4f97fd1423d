use std::path::PathBuf;

use chrono::Datelike;

use crate::models::{FileTimestamp, GridVariable};
use crate::utils::constants::{
    ARCHIVE_SUBDIRS, GRID_FILE_EXTENSION, GRID_FILE_PREFIX, MKPRISM_FILE_PREFIX, OBS_FILE_PREFIX,
};

/// File name of a surface-grid snapshot: `sfc_grid_{var}_{YYYYMMDDHHMM}.nc`
pub fn grid_file_name(variable: GridVariable, timestamp: FileTimestamp) -> String {
    format!(
        "{}_{}_{}.{}",
        GRID_FILE_PREFIX,
        variable.file_token(),
        timestamp,
        GRID_FILE_EXTENSION
    )
}

/// Leading portion shared by all snapshot file names of one variable,
/// up to and including the underscore before the timestamp token.
pub fn variable_prefix(variable: GridVariable) -> String {
    format!("{}_{}_", GRID_FILE_PREFIX, variable.file_token())
}

/// Expected location of a snapshot relative to the archive root,
/// following the `org/sgd/YYYY/MM/DD/` layout.
pub fn archive_relative_path(variable: GridVariable, timestamp: FileTimestamp) -> PathBuf {
    let date = timestamp.datetime().date();
    let mut path = PathBuf::new();
    for dir in ARCHIVE_SUBDIRS {
        path.push(dir);
    }
    path.push(date.year().to_string());
    path.push(format!("{:02}", date.month()));
    path.push(format!("{:02}", date.day()));
    path.push(grid_file_name(variable, timestamp));
    path
}

/// File name of a per-point observation extract: `obs_{var}_{YYYYMMDDHHMM}.nc`
pub fn obs_file_name(variable: GridVariable, timestamp: FileTimestamp) -> String {
    format!(
        "{}_{}_{}.{}",
        OBS_FILE_PREFIX,
        variable.file_token(),
        timestamp,
        GRID_FILE_EXTENSION
    )
}

/// File name of an elevation-corrected grid: `mkprism_{var}_{YYYYMMDDHHMM}.nc`
pub fn mkprism_file_name(variable: GridVariable, timestamp: FileTimestamp) -> String {
    format!(
        "{}_{}_{}.{}",
        MKPRISM_FILE_PREFIX,
        variable.file_token(),
        timestamp,
        GRID_FILE_EXTENSION
    )
}

/// Candidate timestamp token of a grid file name: the text between the last
/// underscore and the extension. Returns `None` when the name has no
/// extension or no underscore; the token itself is not validated here.
pub fn timestamp_token(file_name: &str) -> Option<&str> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if extension != GRID_FILE_EXTENSION {
        return None;
    }
    let (_, token) = stem.rsplit_once('_')?;
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(token: &str) -> FileTimestamp {
        FileTimestamp::parse(token).unwrap()
    }

    #[test]
    fn test_grid_file_name() {
        let name = grid_file_name(GridVariable::Temperature, ts("202001011200"));
        assert_eq!(name, "sfc_grid_ta_202001011200.nc");

        let name = grid_file_name(GridVariable::DailyRainfall, ts("202001011200"));
        assert_eq!(name, "sfc_grid_rn_day_202001011200.nc");
    }

    #[test]
    fn test_archive_relative_path() {
        let path = archive_relative_path(GridVariable::Temperature, ts("202012310100"));
        assert_eq!(
            path,
            PathBuf::from("org/sgd/2020/12/31/sfc_grid_ta_202012310100.nc")
        );
    }

    #[test]
    fn test_derived_file_names() {
        assert_eq!(
            obs_file_name(GridVariable::Temperature, ts("202001010000")),
            "obs_ta_202001010000.nc"
        );
        assert_eq!(
            mkprism_file_name(GridVariable::Temperature, ts("202001010000")),
            "mkprism_ta_202001010000.nc"
        );
    }

    #[test]
    fn test_timestamp_token() {
        assert_eq!(
            timestamp_token("sfc_grid_ta_202001011200.nc"),
            Some("202001011200")
        );
        // Multi-underscore variable tokens still yield the last segment.
        assert_eq!(
            timestamp_token("sfc_grid_rn_day_202001011200.nc"),
            Some("202001011200")
        );
        assert_eq!(timestamp_token("sfc_grid_ta_banana.nc"), Some("banana"));
        assert_eq!(timestamp_token("no_extension"), None);
        assert_eq!(timestamp_token("wrong.csv"), None);
        assert_eq!(timestamp_token("nounderscore.nc"), None);
    }
}
