use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A point in time (or a span) counted in 100 ns ticks.
///
/// Absolute values count from 0001-01-01T00:00:00, matching the tick
/// convention of the tools that commonly produce COMTRADE records.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(transparent)]
pub struct Ticks(pub i64);

impl Ticks {
    pub const PER_MICROSECOND: i64 = 10;
    pub const PER_MILLISECOND: i64 = 10_000;
    pub const PER_SECOND: i64 = 10_000_000;
    pub const PER_MINUTE: i64 = 60 * Self::PER_SECOND;
    pub const PER_HOUR: i64 = 60 * Self::PER_MINUTE;
    pub const PER_DAY: i64 = 24 * Self::PER_HOUR;

    /// Ticks between 0001-01-01 and the Unix epoch
    pub const UNIX_EPOCH: Ticks = Ticks(621_355_968_000_000_000);

    pub const fn new(value: i64) -> Self {
        Ticks(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Span covering `seconds`, rounded to the nearest tick
    pub fn from_seconds(seconds: f64) -> Self {
        Ticks((seconds * Self::PER_SECOND as f64).round() as i64)
    }

    /// Span covering `microseconds`, rounded to the nearest tick
    pub fn from_microseconds(microseconds: f64) -> Self {
        Ticks((microseconds * Self::PER_MICROSECOND as f64).round() as i64)
    }

    pub fn from_milliseconds(milliseconds: f64) -> Self {
        Ticks((milliseconds * Self::PER_MILLISECOND as f64).round() as i64)
    }

    pub fn to_seconds(self) -> f64 {
        self.0 as f64 / Self::PER_SECOND as f64
    }

    pub fn to_microseconds(self) -> f64 {
        self.0 as f64 / Self::PER_MICROSECOND as f64
    }

    pub fn to_milliseconds(self) -> f64 {
        self.0 as f64 / Self::PER_MILLISECOND as f64
    }

    /// Absolute tick count for a calendar date-time
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let utc = datetime.and_utc();
        let seconds = utc.timestamp();
        let sub_ticks = (utc.timestamp_subsec_nanos() / 100) as i64;
        Ticks(Self::UNIX_EPOCH.0 + seconds * Self::PER_SECOND + sub_ticks)
    }

    /// Calendar date-time for an absolute tick count, if representable
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        let since_epoch = self.0 - Self::UNIX_EPOCH.0;
        let seconds = since_epoch.div_euclid(Self::PER_SECOND);
        let nanos = (since_epoch.rem_euclid(Self::PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(seconds, nanos).map(|dt| dt.naive_utc())
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S%.7f")),
            None => write!(f, "{} ticks", self.0),
        }
    }
}

impl From<i64> for Ticks {
    fn from(value: i64) -> Self {
        Ticks(value)
    }
}

impl From<Ticks> for i64 {
    fn from(ticks: Ticks) -> Self {
        ticks.0
    }
}

impl Add for Ticks {
    type Output = Ticks;

    fn add(self, rhs: Ticks) -> Ticks {
        Ticks(self.0 + rhs.0)
    }
}

impl AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Ticks) {
        self.0 += rhs.0;
    }
}

impl Sub for Ticks {
    type Output = Ticks;

    fn sub(self, rhs: Ticks) -> Ticks {
        Ticks(self.0 - rhs.0)
    }
}

impl SubAssign for Ticks {
    fn sub_assign(&mut self, rhs: Ticks) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(Ticks::from_seconds(1.0), Ticks(10_000_000));
        assert_eq!(Ticks::from_microseconds(1.0), Ticks(10));
        assert_eq!(Ticks::from_milliseconds(2.5), Ticks(25_000));
        assert_eq!(Ticks::from_seconds(7.0 / 1000.0), Ticks(70_000));
        assert_eq!(Ticks(15).to_microseconds(), 1.5);
        assert_eq!(Ticks::PER_HOUR, 36_000_000_000);
    }

    #[test]
    fn test_datetime_round_trip() {
        let datetime = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(13, 45, 10, 123_456)
            .unwrap();
        let ticks = Ticks::from_datetime(datetime);
        assert_eq!(ticks.to_datetime(), Some(datetime));
    }

    #[test]
    fn test_epoch_constants() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Ticks::from_datetime(epoch), Ticks::UNIX_EPOCH);

        let first = NaiveDate::from_ymd_opt(1, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Ticks::from_datetime(first), Ticks(0));
    }

    #[test]
    fn test_arithmetic() {
        let mut ticks = Ticks(100) + Ticks(50);
        ticks -= Ticks(25);
        assert_eq!(ticks, Ticks(125));
        assert_eq!(Ticks(10) - Ticks(20), Ticks(-10));
    }
}
