use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::Ticks;
use crate::error::{ComtradeError, Result};

/// `d/M/yyyy,H:mm:ss[.ffffff]` with an optional `:ms` suffix, whitespace removed
static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?<first>\d{1,2})/(?<second>\d{1,2})/(?<year>\d{1,4}),(?<hour>\d{1,2}):(?<minute>\d{1,2}):(?<seconds>\d{1,2}(?:\.\d*)?)(?::(?<millis>\d+(?:\.\d*)?))?$",
    )
    .expect("timestamp pattern is valid")
});

/// A configuration date-time (start or trigger time)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub value: Ticks,
}

impl Timestamp {
    pub fn new(value: Ticks) -> Self {
        Timestamp { value }
    }

    /// Parse a COMTRADE date-time line.
    ///
    /// Fractional seconds may be written as a decimal fraction or as a fourth
    /// colon-separated millisecond field. Day/month order is ambiguous in the
    /// wild, so `d/M` is tried first and `M/d` second.
    pub fn parse(line: &str) -> Result<Self> {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        let invalid = || ComtradeError::invalid_value("timestamp", &compact, line);

        let captures = TIMESTAMP_REGEX.captures(&compact).ok_or_else(invalid)?;
        let number = |name: &str| -> Result<u32> {
            captures[name].parse::<u32>().map_err(|_| invalid())
        };

        let first = number("first")?;
        let second = number("second")?;
        let year = number("year")? as i32;
        let hour = number("hour")?;
        let minute = number("minute")?;

        let mut seconds: f64 = captures["seconds"].parse().map_err(|_| invalid())?;
        if let Some(millis) = captures.name("millis") {
            let millis: f64 = millis.as_str().parse().map_err(|_| invalid())?;
            seconds += millis / 1000.0;
        }

        // Fractions are kept to microsecond resolution
        let total_micros = (seconds * 1_000_000.0).round() as u64;
        let whole_seconds = (total_micros / 1_000_000) as u32;
        let micros = (total_micros % 1_000_000) as u32;

        let date = NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
            .ok_or_else(invalid)?;
        let time =
            NaiveTime::from_hms_micro_opt(hour, minute, whole_seconds, micros).ok_or_else(invalid)?;

        Ok(Timestamp {
            value: Ticks::from_datetime(NaiveDateTime::new(date, time)),
        })
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        self.value.to_datetime()
    }
}

impl From<Ticks> for Timestamp {
    fn from(value: Ticks) -> Self {
        Timestamp { value }
    }
}

impl FromStr for Timestamp {
    type Err = ComtradeError;

    fn from_str(s: &str) -> Result<Self> {
        Timestamp::parse(s)
    }
}

impl fmt::Display for Timestamp {
    /// `dd/MM/yyyy,HH:mm:ss.ffffff`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format("%d/%m/%Y,%H:%M:%S%.6f")),
            None => write!(f, "01/01/0001,00:00:00.000000"),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
