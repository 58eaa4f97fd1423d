use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// A named extraction point for grid-to-point resampling.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Region {
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(alias = "lat")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[serde(alias = "lon")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Region {
    pub fn new(label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            label: label.into(),
            latitude,
            longitude,
        }
    }
}

/// Validated collection of extraction points with unique labels.
#[derive(Debug, Clone)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Build a region set, rejecting empty input, invalid coordinates and
    /// duplicate labels.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        if regions.is_empty() {
            return Err(ProcessingError::Config(
                "region set must contain at least one point".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for region in &regions {
            region.validate()?;
            if !seen.insert(region.label.clone()) {
                return Err(ProcessingError::Config(format!(
                    "duplicate region label '{}'",
                    region.label
                )));
            }
        }

        Ok(Self { regions })
    }

    /// Representative points for the 17 first-level administrative divisions
    /// of South Korea. This is the default extraction set.
    pub fn korean_admin_regions() -> Self {
        let regions = vec![
            Region::new("Seoul", 37.5665, 126.9780),
            Region::new("Busan", 35.1796, 129.0756),
            Region::new("Daegu", 35.8714, 128.6014),
            Region::new("Incheon", 37.4563, 126.7052),
            Region::new("Gwangju", 35.1595, 126.8526),
            Region::new("Daejeon", 36.3504, 127.3845),
            Region::new("Ulsan", 35.5384, 129.3114),
            Region::new("Sejong", 36.4802, 127.2890),
            Region::new("Gyeonggi", 37.4138, 127.5183),
            Region::new("Gangwon", 37.8228, 128.1555),
            Region::new("Chungbuk", 36.6357, 127.4912),
            Region::new("Chungnam", 36.6588, 126.6728),
            Region::new("Jeonbuk", 35.7175, 127.1530),
            Region::new("Jeonnam", 34.8679, 126.9910),
            Region::new("Gyeongbuk", 36.5760, 128.5056),
            Region::new("Gyeongnam", 35.4606, 128.2132),
            Region::new("Jeju", 33.4996, 126.5312),
        ];
        Self { regions }
    }

    /// Load extraction points from a CSV file with header
    /// `label,latitude,longitude` (`lat`/`lon` also accepted).
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut regions = Vec::new();
        for record in reader.deserialize() {
            let region: Region = record?;
            regions.push(region);
        }
        Self::new(regions)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_set_has_17_unique_regions() {
        let set = RegionSet::korean_admin_regions();
        assert_eq!(set.len(), 17);

        // The built-in set must satisfy its own constructor rules.
        let rebuilt = RegionSet::new(set.regions().to_vec());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_region_validation() {
        let region = Region::new("Seoul", 37.5665, 126.9780);
        assert!(region.validate().is_ok());

        let invalid = Region::new("Nowhere", 91.0, 126.9780);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_set() {
        assert!(RegionSet::new(vec![]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let result = RegionSet::new(vec![
            Region::new("Seoul", 37.5665, 126.9780),
            Region::new("Seoul", 35.1796, 129.0756),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_longitude() {
        let result = RegionSet::new(vec![Region::new("Bad", 37.0, 200.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "label,latitude,longitude").unwrap();
        writeln!(file, "Seoul,37.5665,126.9780").unwrap();
        writeln!(file, "Jeju,33.4996,126.5312").unwrap();
        file.flush().unwrap();

        let set = RegionSet::from_csv(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.regions()[0].label, "Seoul");
    }

    #[test]
    fn test_from_csv_accepts_short_headers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "label,lat,lon").unwrap();
        writeln!(file, "Seoul,37.5665,126.9780").unwrap();
        file.flush().unwrap();

        let set = RegionSet::from_csv(file.path()).unwrap();
        assert_eq!(set.regions()[0].latitude, 37.5665);
    }

    #[test]
    fn test_from_csv_rejects_bad_coordinates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "label,latitude,longitude").unwrap();
        writeln!(file, "Broken,123.0,126.9780").unwrap();
        file.flush().unwrap();

        assert!(RegionSet::from_csv(file.path()).is_err());
    }
}
