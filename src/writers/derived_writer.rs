use std::path::Path;

use chrono::Utc;

use crate::error::{ProcessingError, Result};
use crate::models::{GridGeometry, GridVariable};
use crate::processors::PointSample;

/// Writes the per-point extraction file (`obs`).
///
/// One record per requested point along a `station` dimension, with the
/// sampled quantity named after the variable. Invalid cells become NaN
/// unless `raw_sentinels` asks for the stored sentinel values instead.
pub fn write_obs(
    path: &Path,
    variable: GridVariable,
    samples: &[PointSample],
    source: &str,
    raw_sentinels: bool,
) -> Result<()> {
    let labels: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();
    let latitudes: Vec<f64> = samples.iter().map(|s| s.latitude).collect();
    let longitudes: Vec<f64> = samples.iter().map(|s| s.longitude).collect();
    let values: Vec<f64> = samples
        .iter()
        .map(|s| {
            if raw_sentinels {
                s.raw
            } else {
                s.value.unwrap_or(f64::NAN)
            }
        })
        .collect();

    let mut file = netcdf::create(path)?;
    file.add_dimension("station", samples.len())?;

    file.add_attribute("variable", variable.file_token())?;
    file.add_attribute("source", source)?;
    file.add_attribute("stations", labels.join(",").as_str())?;
    file.add_attribute("created", Utc::now().to_rfc3339().as_str())?;

    let mut lat = file.add_variable::<f64>("latitude", &["station"])?;
    lat.put_attribute("units", "degrees_north")?;
    lat.put_values(&latitudes, ..)?;

    let mut lon = file.add_variable::<f64>("longitude", &["station"])?;
    lon.put_attribute("units", "degrees_east")?;
    lon.put_values(&longitudes, ..)?;

    let mut data = file.add_variable::<f64>(variable.quantity(), &["station"])?;
    data.put_attribute("units", variable.units())?;
    data.put_values(&values, ..)?;

    Ok(())
}

/// Writes the corrected full-grid file (`mkprism`).
///
/// Same geometry attributes as the source snapshot so downstream readers
/// can treat it interchangeably, plus the correction parameters used.
pub fn write_mkprism(
    path: &Path,
    variable: GridVariable,
    geometry: &GridGeometry,
    corrected: &[Option<f64>],
    lapse_rate: f64,
    reference_elevation: f64,
) -> Result<()> {
    if corrected.len() != geometry.cell_count() {
        return Err(ProcessingError::Config(format!(
            "corrected grid has {} values but geometry expects {}",
            corrected.len(),
            geometry.cell_count()
        )));
    }
    let values: Vec<f64> = corrected.iter().map(|v| v.unwrap_or(f64::NAN)).collect();

    let mut file = netcdf::create(path)?;
    file.add_dimension("ny", geometry.ny)?;
    file.add_dimension("nx", geometry.nx)?;

    file.add_attribute("grid_size", geometry.spacing)?;
    file.add_attribute("grid_nx", geometry.nx as i32)?;
    file.add_attribute("grid_ny", geometry.ny as i32)?;
    file.add_attribute("map_slon", geometry.origin_lon)?;
    file.add_attribute("map_slat", geometry.origin_lat)?;
    file.add_attribute("lapse_rate", lapse_rate)?;
    file.add_attribute("reference_elevation", reference_elevation)?;
    file.add_attribute("created", Utc::now().to_rfc3339().as_str())?;

    let mut data = file.add_variable::<f64>(variable.quantity(), &["ny", "nx"])?;
    data.put_attribute("units", variable.units())?;
    data.put_values(&values, ..)?;

    Ok(())
}
