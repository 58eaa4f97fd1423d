use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProcessingError;

/// Surface-grid variables carried by the archive, identified by the token
/// embedded in file names (`sfc_grid_{token}_...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridVariable {
    /// Air temperature (ta)
    Temperature,
    /// Daily accumulated rainfall (rn_day)
    DailyRainfall,
    /// Relative humidity (hm)
    Humidity,
    /// Wind speed at 10 m (ws_10m)
    WindSpeed,
}

impl GridVariable {
    /// All variables the archive carries, in file-token order.
    pub fn all() -> [GridVariable; 4] {
        [
            GridVariable::Temperature,
            GridVariable::DailyRainfall,
            GridVariable::Humidity,
            GridVariable::WindSpeed,
        ]
    }

    pub fn from_file_token(token: &str) -> Option<Self> {
        match token {
            "ta" => Some(GridVariable::Temperature),
            "rn_day" => Some(GridVariable::DailyRainfall),
            "hm" => Some(GridVariable::Humidity),
            "ws_10m" => Some(GridVariable::WindSpeed),
            _ => None,
        }
    }

    pub fn file_token(&self) -> &'static str {
        match self {
            GridVariable::Temperature => "ta",
            GridVariable::DailyRainfall => "rn_day",
            GridVariable::Humidity => "hm",
            GridVariable::WindSpeed => "ws_10m",
        }
    }

    /// Quantity name used for variables in derived NetCDF files.
    pub fn quantity(&self) -> &'static str {
        match self {
            GridVariable::Temperature => "temperature",
            GridVariable::DailyRainfall => "precipitation",
            GridVariable::Humidity => "humidity",
            GridVariable::WindSpeed => "wind_speed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GridVariable::Temperature => "Air Temperature",
            GridVariable::DailyRainfall => "Daily Rainfall",
            GridVariable::Humidity => "Relative Humidity",
            GridVariable::WindSpeed => "Wind Speed (10m)",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            GridVariable::Temperature => "°C",
            GridVariable::DailyRainfall => "mm",
            GridVariable::Humidity => "%",
            GridVariable::WindSpeed => "m/s",
        }
    }
}

impl fmt::Display for GridVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_token())
    }
}

impl FromStr for GridVariable {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_file_token(s).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "unknown grid variable '{}' (expected ta, rn_day, hm or ws_10m)",
                s
            ))
        })
    }
}

impl Serialize for GridVariable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.file_token())
    }
}

impl<'de> Deserialize<'de> for GridVariable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
