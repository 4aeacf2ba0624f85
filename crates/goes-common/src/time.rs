//! Scan time handling for GOES ABI products.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoesError;

/// Nominal scan start at minute resolution, as used in ABI object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanTime(DateTime<Utc>);

impl ScanTime {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        // Object keys carry minutes only.
        let truncated = datetime
            .with_second(0)
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(datetime);
        Self(truncated)
    }

    /// Parse a compact `YYYYMMDDHHMM` timestamp.
    pub fn parse(s: &str) -> Result<Self, GoesError> {
        let s = s.trim();
        if s.len() != 12 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GoesError::InvalidScanTime(s.to_string()));
        }

        let field = |range: std::ops::Range<usize>| -> u32 {
            // All bytes are ASCII digits, so the slice always parses.
            s[range].parse().unwrap_or(0)
        };

        let date = NaiveDate::from_ymd_opt(field(0..4) as i32, field(4..6), field(6..8))
            .ok_or_else(|| GoesError::InvalidScanTime(s.to_string()))?;
        let datetime = date
            .and_hms_opt(field(8..10), field(10..12), 0)
            .ok_or_else(|| GoesError::InvalidScanTime(s.to_string()))?;

        Ok(Self(Utc.from_utc_datetime(&datetime)))
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Day of year, 1-based.
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Compact form used on the command line: `YYYYMMDDHHMM`.
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d%H%M").to_string()
    }
}

impl fmt::Display for ScanTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compact())
    }
}

impl FromStr for ScanTime {
    type Err = GoesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScanTime {
    type Error = GoesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ScanTime> for String {
    fn from(t: ScanTime) -> Self {
        t.compact()
    }
}

/// Parse the `time_coverage_start` global attribute of an ABI file,
/// e.g. "2021-07-07T10:00:21.6Z".
pub fn parse_coverage_start(s: &str) -> Result<DateTime<Utc>, GoesError> {
    let s = s.trim();
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    Err(GoesError::InvalidCoverageTime(s.to_string()))
}
