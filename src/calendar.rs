use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ProcessingError, Result};
use crate::models::FileTimestamp;

/// Snapshot cadence of an archive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Hourly,
    Daily,
}

impl Frequency {
    pub fn step(&self) -> Duration {
        match self {
            Frequency::Hourly => Duration::hours(1),
            Frequency::Daily => Duration::days(1),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hour" | "hourly" => Ok(Frequency::Hourly),
            "day" | "daily" => Ok(Frequency::Daily),
            other => Err(ProcessingError::InvalidFormat(format!(
                "unknown frequency '{}' (expected 'hour' or 'day')",
                other
            ))),
        }
    }
}

/// Inclusive sequence of expected snapshot instants.
///
/// The date-driven form follows the archive's day convention: an hourly
/// range over days D0..D1 runs from D0 01:00 through (D1+1) 00:00, so every
/// calendar day owns the 24 stamps ending at the following midnight. A
/// daily range runs from D0 00:00 through D1 00:00, one stamp per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedRange {
    first: NaiveDateTime,
    last: NaiveDateTime,
    frequency: Frequency,
}

impl ExpectedRange {
    /// Build a range from calendar dates using the day convention above.
    /// Fails fast when `start` is after `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Result<Self> {
        if start > end {
            return Err(ProcessingError::Config(format!(
                "range start {} is after end {}",
                start, end
            )));
        }

        let (first, last) = match frequency {
            Frequency::Hourly => (
                start.and_time(NaiveTime::MIN) + Duration::hours(1),
                end.and_time(NaiveTime::MIN) + Duration::days(1),
            ),
            Frequency::Daily => (
                start.and_time(NaiveTime::MIN),
                end.and_time(NaiveTime::MIN),
            ),
        };

        Ok(Self {
            first,
            last,
            frequency,
        })
    }

    /// Bound the sequence by two observed instants instead of dates. Used
    /// when reconciling without an explicit range.
    pub fn from_instants(
        first: FileTimestamp,
        last: FileTimestamp,
        frequency: Frequency,
    ) -> Result<Self> {
        if first > last {
            return Err(ProcessingError::Config(format!(
                "range start {} is after end {}",
                first, last
            )));
        }
        Ok(Self {
            first: first.datetime(),
            last: last.datetime(),
            frequency,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn first(&self) -> FileTimestamp {
        FileTimestamp::new(self.first)
    }

    pub fn last(&self) -> FileTimestamp {
        FileTimestamp::new(self.last)
    }

    /// Number of instants the sequence yields. Never zero.
    pub fn len(&self) -> usize {
        let step = self.frequency.step().num_seconds();
        let span = (self.last - self.first).num_seconds();
        (span / step) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn instants(&self) -> Instants {
        Instants {
            next: Some(self.first),
            last: self.last,
            step: self.frequency.step(),
        }
    }

    /// Whether `timestamp` is one of the instants of this sequence.
    pub fn contains(&self, timestamp: FileTimestamp) -> bool {
        let dt = timestamp.datetime();
        if dt < self.first || dt > self.last {
            return false;
        }
        (dt - self.first).num_seconds() % self.frequency.step().num_seconds() == 0
    }
}

/// Iterator over the instants of an [`ExpectedRange`].
pub struct Instants {
    next: Option<NaiveDateTime>,
    last: NaiveDateTime,
    step: Duration,
}

impl Iterator for Instants {
    type Item = FileTimestamp;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let upcoming = current + self.step;
        self.next = if upcoming <= self.last {
            Some(upcoming)
        } else {
            None
        };
        Some(FileTimestamp::new(current))
    }
}
