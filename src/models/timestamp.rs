use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProcessingError;
use crate::utils::constants::{COMPACT_TIMESTAMP_FORMAT, COMPACT_TIMESTAMP_LEN};

/// Snapshot timestamp as encoded in grid file names: exactly twelve ASCII
/// digits, `YYYYMMDDHHMM`. Shorter digit runs, stray characters and calendar
/// impossibilities are all rejected at parse time, so a value of this type
/// always names a real instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileTimestamp(NaiveDateTime);

impl FileTimestamp {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    pub fn parse(token: &str) -> Result<Self, ProcessingError> {
        if token.len() != COMPACT_TIMESTAMP_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProcessingError::InvalidTimestamp(token.to_string()));
        }
        let datetime = NaiveDateTime::parse_from_str(token, COMPACT_TIMESTAMP_FORMAT)
            .map_err(|_| ProcessingError::InvalidTimestamp(token.to_string()))?;
        Ok(Self(datetime))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDateTime> for FileTimestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }
}

impl fmt::Display for FileTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(COMPACT_TIMESTAMP_FORMAT))
    }
}

impl FromStr for FileTimestamp {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FileTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token).map_err(serde::de::Error::custom)
    }
}
