use crate::error::{ProcessingError, Result};
use crate::utils::constants::MISSING_SENTINEL;

/// Uniform rectilinear mesh described by a grid file's global attributes.
///
/// Axis values follow `origin + index * spacing` in degrees. Samples are
/// stored row-major with latitude as the slow dimension, so cell `(iy, ix)`
/// lives at flat index `iy * nx + ix`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub nx: usize,
    pub ny: usize,
    pub spacing: f64,
    pub origin_lon: f64,
    pub origin_lat: f64,
}

impl GridGeometry {
    pub fn new(nx: usize, ny: usize, spacing: f64, origin_lon: f64, origin_lat: f64) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(ProcessingError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                nx, ny
            )));
        }
        if spacing <= 0.0 {
            return Err(ProcessingError::Config(format!(
                "grid spacing must be positive, got {}",
                spacing
            )));
        }
        Ok(Self {
            nx,
            ny,
            spacing,
            origin_lon,
            origin_lat,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    pub fn lon_at(&self, ix: usize) -> f64 {
        self.origin_lon + ix as f64 * self.spacing
    }

    pub fn lat_at(&self, iy: usize) -> f64 {
        self.origin_lat + iy as f64 * self.spacing
    }

    pub fn flat_index(&self, iy: usize, ix: usize) -> usize {
        iy * self.nx + ix
    }
}

/// One decoded grid snapshot: mesh geometry, scale divisor and raw samples.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    pub geometry: GridGeometry,
    pub scale: f64,
    pub raw: Vec<f64>,
}

impl GridSnapshot {
    pub fn new(geometry: GridGeometry, scale: f64, raw: Vec<f64>) -> Result<Self> {
        if scale == 0.0 {
            return Err(ProcessingError::Config(
                "data_scale must be non-zero".to_string(),
            ));
        }
        if raw.len() != geometry.cell_count() {
            return Err(ProcessingError::Config(format!(
                "sample count {} does not match {}x{} grid",
                raw.len(),
                geometry.ny,
                geometry.nx
            )));
        }
        Ok(Self {
            geometry,
            scale,
            raw,
        })
    }

    /// Scale one raw sample into physical units. The sentinel is masked
    /// before the division so it can never leak through as `-999.0`.
    pub fn scaled(&self, raw: f64) -> Option<f64> {
        if raw == MISSING_SENTINEL {
            None
        } else {
            Some(raw / self.scale)
        }
    }

    /// All samples in physical units; sentinel cells become `None`.
    pub fn scaled_values(&self) -> Vec<Option<f64>> {
        self.raw.iter().map(|&v| self.scaled(v)).collect()
    }

    pub fn stats(&self) -> GridStats {
        GridStats::from_raw(&self.raw)
    }
}

/// Distribution summary over the raw (unscaled) samples of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStats {
    pub total: usize,
    pub valid: usize,
    pub sentinel: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub zero_count: usize,
    pub negative_count: usize,
    pub zero_ratio: f64,
    pub negative_ratio: f64,
}

impl GridStats {
    /// Summarize raw samples. Validity is a single test: a sample is valid
    /// unless it equals the missing-value sentinel.
    pub fn from_raw(values: &[f64]) -> Self {
        let total = values.len();
        let mut sentinel = 0usize;
        let mut zero_count = 0usize;
        let mut negative_count = 0usize;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;

        for &value in values {
            if value == MISSING_SENTINEL {
                sentinel += 1;
                continue;
            }
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
            if value == 0.0 {
                zero_count += 1;
            }
            if value < 0.0 {
                negative_count += 1;
            }
        }

        let valid = total - sentinel;
        let (zero_ratio, negative_ratio) = if valid > 0 {
            (
                zero_count as f64 / valid as f64,
                negative_count as f64 / valid as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total,
            valid,
            sentinel,
            min,
            max,
            zero_count,
            negative_count,
            zero_ratio,
            negative_ratio,
        }
    }

    pub fn no_valid_data(&self) -> bool {
        self.valid == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn geometry(nx: usize, ny: usize) -> GridGeometry {
        GridGeometry::new(nx, ny, 0.05, 124.0, 33.0).unwrap()
    }

    #[test]
    fn test_stats_mixed_values() {
        let stats = GridStats::from_raw(&[-9990.0, 0.0, 0.0, 5.0, -3.0, -9990.0]);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.valid, 4);
        assert_eq!(stats.sentinel, 2);
        assert_eq!(stats.valid + stats.sentinel, stats.total);
        assert_eq!(stats.min, Some(-3.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.zero_ratio, 0.5);
        assert_eq!(stats.negative_ratio, 0.25);
        assert!(!stats.no_valid_data());
    }

    #[test]
    fn test_stats_all_sentinel() {
        let stats = GridStats::from_raw(&[-9990.0, -9990.0, -9990.0]);
        assert!(stats.no_valid_data());
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.zero_ratio, 0.0);
        assert_eq!(stats.negative_ratio, 0.0);
    }

    #[test]
    fn test_stats_empty_input() {
        let stats = GridStats::from_raw(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.no_valid_data());
    }

    #[test]
    fn test_geometry_axes_are_linspace() {
        let geometry = GridGeometry::new(3, 2, 0.5, 126.0, 33.0).unwrap();
        assert_eq!(geometry.lon_at(0), 126.0);
        assert_eq!(geometry.lon_at(2), 127.0);
        assert_eq!(geometry.lat_at(1), 33.5);
        assert_eq!(geometry.flat_index(1, 2), 5);
    }

    #[test]
    fn test_geometry_rejects_degenerate_mesh() {
        assert!(GridGeometry::new(0, 2, 0.5, 126.0, 33.0).is_err());
        assert!(GridGeometry::new(3, 2, 0.0, 126.0, 33.0).is_err());
        assert!(GridGeometry::new(3, 2, -0.5, 126.0, 33.0).is_err());
    }

    #[test]
    fn test_snapshot_scaling_masks_sentinel_first() {
        let snapshot =
            GridSnapshot::new(geometry(2, 1), 10.0, vec![255.0, -9990.0]).unwrap();
        assert_eq!(snapshot.scaled_values(), vec![Some(25.5), None]);
    }

    #[test]
    fn test_snapshot_rejects_shape_mismatch() {
        assert!(GridSnapshot::new(geometry(2, 2), 10.0, vec![1.0, 2.0]).is_err());
        assert!(GridSnapshot::new(geometry(2, 1), 0.0, vec![1.0, 2.0]).is_err());
    }
}
