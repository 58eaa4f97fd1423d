use crate::models::{GridGeometry, GridSnapshot, Region, RegionSet};

/// Nearest-cell lookup over a uniform mesh.
///
/// On a uniform rectilinear grid the Euclidean nearest cell factorizes into
/// independent per-axis rounding, so no search structure is needed. Exact
/// half-way ties round toward the lower index on each axis, which makes the
/// winner the lowest row-major flat index among the tied cells; lookups are
/// deterministic under any worker interleaving.
#[derive(Debug, Clone)]
pub struct NearestIndex {
    geometry: GridGeometry,
}

impl NearestIndex {
    pub fn new(geometry: &GridGeometry) -> Self {
        Self {
            geometry: *geometry,
        }
    }

    /// Flat row-major index of the cell nearest to `(latitude, longitude)`.
    /// Points outside the mesh clamp to the border cells.
    pub fn nearest_flat(&self, latitude: f64, longitude: f64) -> usize {
        let ix = nearest_axis(
            (longitude - self.geometry.origin_lon) / self.geometry.spacing,
            self.geometry.nx,
        );
        let iy = nearest_axis(
            (latitude - self.geometry.origin_lat) / self.geometry.spacing,
            self.geometry.ny,
        );
        self.geometry.flat_index(iy, ix)
    }
}

/// Round a fractional axis position to the nearest index, half-way cases
/// toward the lower index, clamped to the axis.
fn nearest_axis(position: f64, len: usize) -> usize {
    let rounded = (position - 0.5).ceil();
    if rounded <= 0.0 {
        0
    } else {
        (rounded as usize).min(len - 1)
    }
}

/// One region resampled from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSample {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub flat_index: usize,
    /// Raw stored sample at the nearest cell.
    pub raw: f64,
    /// Scaled physical value; `None` when the cell holds the sentinel.
    pub value: Option<f64>,
}

/// Grid-to-point resampler bound to one snapshot's geometry.
///
/// The index is built once per snapshot and reused for every region.
pub struct Resampler {
    index: NearestIndex,
}

impl Resampler {
    pub fn new(geometry: &GridGeometry) -> Self {
        Self {
            index: NearestIndex::new(geometry),
        }
    }

    pub fn sample(&self, snapshot: &GridSnapshot, regions: &RegionSet) -> Vec<PointSample> {
        regions
            .regions()
            .iter()
            .map(|region| self.sample_one(snapshot, region))
            .collect()
    }

    pub fn sample_one(&self, snapshot: &GridSnapshot, region: &Region) -> PointSample {
        let flat_index = self.index.nearest_flat(region.latitude, region.longitude);
        let raw = snapshot.raw[flat_index];
        PointSample {
            label: region.label.clone(),
            latitude: region.latitude,
            longitude: region.longitude,
            flat_index,
            raw,
            value: snapshot.scaled(raw),
        }
    }
}
