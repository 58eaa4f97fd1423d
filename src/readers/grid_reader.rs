use std::path::Path;

use netcdf::AttributeValue;

use crate::error::{ProcessingError, Result};
use crate::models::{GridGeometry, GridSnapshot};
use crate::utils::constants::{
    ATTR_DATA_SCALE, ATTR_GRID_NX, ATTR_GRID_NY, ATTR_GRID_SIZE, ATTR_MAP_SLAT, ATTR_MAP_SLON,
    GRID_DATA_VARIABLE,
};

/// Decoder for surface-grid NetCDF snapshots.
///
/// Metadata defects are hard errors: a missing `data` variable, a missing or
/// non-numeric geometry attribute, a zero scale factor or a dimension
/// mismatch all fail the file as [`ProcessingError::FileInvalid`]. Nothing
/// is guessed or defaulted. Raw samples are returned untouched; scaling and
/// sentinel masking happen on [`GridSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct GridReader;

impl GridReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<GridSnapshot> {
        let file = netcdf::open(path)
            .map_err(|e| ProcessingError::file_invalid(path, e.to_string()))?;

        let variable = file.variable(GRID_DATA_VARIABLE).ok_or_else(|| {
            ProcessingError::file_invalid(
                path,
                format!("missing '{}' variable", GRID_DATA_VARIABLE),
            )
        })?;

        let dims = variable.dimensions();
        if dims.len() != 2 {
            return Err(ProcessingError::file_invalid(
                path,
                format!(
                    "'{}' has {} dimensions, expected 2",
                    GRID_DATA_VARIABLE,
                    dims.len()
                ),
            ));
        }
        let ny = dims[0].len();
        let nx = dims[1].len();

        let scale = variable_f64(&variable, ATTR_DATA_SCALE).ok_or_else(|| {
            ProcessingError::file_invalid(
                path,
                format!("missing or non-numeric '{}' attribute", ATTR_DATA_SCALE),
            )
        })?;
        if scale == 0.0 {
            return Err(ProcessingError::file_invalid(
                path,
                format!("'{}' attribute is zero", ATTR_DATA_SCALE),
            ));
        }

        let spacing = required_global(&file, path, ATTR_GRID_SIZE)?;
        let attr_nx = required_global(&file, path, ATTR_GRID_NX)? as usize;
        let attr_ny = required_global(&file, path, ATTR_GRID_NY)? as usize;
        let origin_lon = required_global(&file, path, ATTR_MAP_SLON)?;
        let origin_lat = required_global(&file, path, ATTR_MAP_SLAT)?;

        if attr_nx != nx || attr_ny != ny {
            return Err(ProcessingError::file_invalid(
                path,
                format!(
                    "geometry attributes claim {}x{} but '{}' is {}x{}",
                    attr_ny, attr_nx, GRID_DATA_VARIABLE, ny, nx
                ),
            ));
        }

        let geometry = GridGeometry::new(nx, ny, spacing, origin_lon, origin_lat)
            .map_err(|e| ProcessingError::file_invalid(path, e.to_string()))?;

        let raw = variable
            .get_values::<f64, _>(..)
            .map_err(|e| ProcessingError::file_invalid(path, e.to_string()))?;

        GridSnapshot::new(geometry, scale, raw)
            .map_err(|e| ProcessingError::file_invalid(path, e.to_string()))
    }
}

fn required_global(file: &netcdf::File, path: &Path, name: &str) -> Result<f64> {
    global_f64(file, name).ok_or_else(|| {
        ProcessingError::file_invalid(
            path,
            format!("missing or non-numeric global attribute '{}'", name),
        )
    })
}

fn global_f64(file: &netcdf::File, name: &str) -> Option<f64> {
    file.attribute(name)
        .and_then(|attr| attr.value().ok())
        .and_then(numeric)
}

fn variable_f64(variable: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    variable
        .attribute_value(name)
        .and_then(|value| value.ok())
        .and_then(numeric)
}

fn numeric(value: AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(v as f64),
        AttributeValue::Int(v) => Some(v as f64),
        AttributeValue::Uint(v) => Some(v as f64),
        AttributeValue::Short(v) => Some(v as f64),
        AttributeValue::Ushort(v) => Some(v as f64),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Schar(v) => Some(v as f64),
        AttributeValue::Uchar(v) => Some(v as f64),
        _ => None,
    }
}
