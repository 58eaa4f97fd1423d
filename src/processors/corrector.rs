use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ProcessingError, Result};
use crate::models::GridGeometry;
use crate::utils::constants::{
    DEFAULT_LAPSE_RATE, DEFAULT_REFERENCE_ELEVATION, SYNTHETIC_ELEVATION_MAX,
    SYNTHETIC_ELEVATION_MIN,
};

/// Supplies one elevation value per grid cell, in meters, flat row-major.
pub trait ElevationSource: Send + Sync {
    fn elevations(&self, geometry: &GridGeometry) -> Vec<f64>;
}

/// Seeded uniform-random elevation field in a fixed band.
///
/// The seed pins the field: the same seed over the same grid shape always
/// produces identical elevations, so corrected outputs are reproducible
/// across runs and worker counts.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticElevation {
    seed: u64,
    min: f64,
    max: f64,
}

impl SyntheticElevation {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min: SYNTHETIC_ELEVATION_MIN,
            max: SYNTHETIC_ELEVATION_MAX,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

impl ElevationSource for SyntheticElevation {
    fn elevations(&self, geometry: &GridGeometry) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..geometry.cell_count())
            .map(|_| rng.random_range(self.min..self.max))
            .collect()
    }
}

/// Constant elevation everywhere. At the reference elevation the correction
/// vanishes, which makes this the natural source for tests.
#[derive(Debug, Clone, Copy)]
pub struct UniformElevation(pub f64);

impl ElevationSource for UniformElevation {
    fn elevations(&self, geometry: &GridGeometry) -> Vec<f64> {
        vec![self.0; geometry.cell_count()]
    }
}

/// Lapse-rate elevation correction:
/// `corrected = value + lapse_rate * (elevation - reference) / 1000`,
/// lapse rate in units per kilometer, elevations in meters.
#[derive(Debug, Clone, Copy)]
pub struct LapseRateCorrector {
    lapse_rate: f64,
    reference_elevation: f64,
}

impl LapseRateCorrector {
    pub fn new() -> Self {
        Self {
            lapse_rate: DEFAULT_LAPSE_RATE,
            reference_elevation: DEFAULT_REFERENCE_ELEVATION,
        }
    }

    pub fn with_lapse_rate(mut self, per_km: f64) -> Self {
        self.lapse_rate = per_km;
        self
    }

    pub fn with_reference_elevation(mut self, meters: f64) -> Self {
        self.reference_elevation = meters;
        self
    }

    pub fn lapse_rate(&self) -> f64 {
        self.lapse_rate
    }

    pub fn reference_elevation(&self) -> f64 {
        self.reference_elevation
    }

    pub fn correct_value(&self, value: f64, elevation: f64) -> f64 {
        value + self.lapse_rate * (elevation - self.reference_elevation) / 1000.0
    }

    /// Correct a full grid of scaled values against its elevation field.
    /// Sentinel cells (`None`) stay `None`; no fabricated values.
    pub fn correct(
        &self,
        values: &[Option<f64>],
        elevations: &[f64],
    ) -> Result<Vec<Option<f64>>> {
        if values.len() != elevations.len() {
            return Err(ProcessingError::Config(format!(
                "elevation field has {} cells but grid has {}",
                elevations.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(elevations)
            .map(|(value, &elevation)| value.map(|v| self.correct_value(v, elevation)))
            .collect())
    }
}

impl Default for LapseRateCorrector {
    fn default() -> Self {
        Self::new()
    }
}
