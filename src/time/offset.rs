use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::Ticks;
use crate::error::{ComtradeError, Result};

/// A UTC offset in the COMTRADE `[+/-]HhMM` grammar, or `x` for "not applicable"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeOffset {
    hours: i32,
    minutes: i32,
    /// Kept separately so that `-0h30` survives a round trip
    negative: bool,
    pub not_applicable: bool,
}

impl TimeOffset {
    pub fn new(hours: i32, minutes: i32) -> Result<Self> {
        let mut offset = TimeOffset::default();
        offset.set_hours(hours)?;
        offset.set_minutes(minutes)?;
        Ok(offset)
    }

    pub fn not_applicable() -> Self {
        TimeOffset {
            not_applicable: true,
            ..TimeOffset::default()
        }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let token = line.trim();
        if token.eq_ignore_ascii_case("x") {
            return Ok(TimeOffset::not_applicable());
        }

        let invalid = || ComtradeError::invalid_value("UTC offset, expected [+/-]HhMM", token, line);
        let parts: Vec<&str> = token.split('h').collect();
        let (hours_text, minutes_text) = match parts.as_slice() {
            [hours] => (*hours, None),
            [hours, minutes] => (*hours, Some(*minutes)),
            _ => return Err(invalid()),
        };

        let hours: i32 = hours_text.trim().parse().map_err(|_| invalid())?;
        let minutes: i32 = match minutes_text {
            Some(text) => text.trim().parse().map_err(|_| invalid())?,
            None => 0,
        };

        let mut offset = TimeOffset::new(hours, minutes)?;
        offset.negative = hours_text.trim_start().starts_with('-');
        Ok(offset)
    }

    pub fn hours(&self) -> i32 {
        self.hours
    }

    pub fn set_hours(&mut self, hours: i32) -> Result<()> {
        if hours.abs() > 23 {
            return Err(ComtradeError::OffsetOutOfRange {
                component: "hours",
                value: hours,
            });
        }
        self.hours = hours;
        self.negative = hours < 0;
        Ok(())
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    pub fn set_minutes(&mut self, minutes: i32) -> Result<()> {
        if !(0..=59).contains(&minutes) {
            return Err(ComtradeError::OffsetOutOfRange {
                component: "minutes",
                value: minutes,
            });
        }
        self.minutes = minutes;
        Ok(())
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Signed offset; zero when not applicable
    pub fn tick_offset(&self) -> Ticks {
        if self.not_applicable {
            return Ticks(0);
        }
        let magnitude =
            self.hours.abs() as i64 * Ticks::PER_HOUR + self.minutes as i64 * Ticks::PER_MINUTE;
        Ticks(if self.negative { -magnitude } else { magnitude })
    }
}

impl FromStr for TimeOffset {
    type Err = ComtradeError;

    fn from_str(s: &str) -> Result<Self> {
        TimeOffset::parse(s)
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not_applicable {
            return write!(f, "x");
        }
        let sign = if self.negative && self.hours == 0 { "-" } else { "" };
        write!(f, "{}{}h{:02}", sign, self.hours, self.minutes)
    }
}

impl Serialize for TimeOffset {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_not_applicable() {
        let offset = TimeOffset::parse("x").unwrap();
        assert!(offset.not_applicable);
        assert_eq!(offset.tick_offset(), Ticks(0));
        assert_eq!(offset.to_string(), "x");
        assert!(TimeOffset::parse("X").unwrap().not_applicable);
    }

    #[test]
    fn test_parse_hours_and_minutes() {
        let offset = TimeOffset::parse("-5h30").unwrap();
        assert_eq!(offset.hours(), -5);
        assert_eq!(offset.minutes(), 30);
        assert_eq!(
            offset.tick_offset(),
            Ticks(-(5 * Ticks::PER_HOUR + 30 * Ticks::PER_MINUTE))
        );
        assert_eq!(offset.to_string(), "-5h30");
    }

    #[test]
    fn test_parse_hours_only() {
        let offset = TimeOffset::parse("+3").unwrap();
        assert_eq!(offset.hours(), 3);
        assert_eq!(offset.tick_offset(), Ticks(3 * Ticks::PER_HOUR));
        assert_eq!(offset.to_string(), "3h00");
    }

    #[test]
    fn test_negative_zero_hours_round_trip() {
        let offset = TimeOffset::parse("-0h30").unwrap();
        assert_eq!(offset.tick_offset(), Ticks(-30 * Ticks::PER_MINUTE));
        assert_eq!(offset.to_string(), "-0h30");
    }

    #[test]
    fn test_out_of_range_components() {
        assert!(TimeOffset::parse("24h00").is_err());
        assert!(TimeOffset::parse("1h60").is_err());
        assert!(TimeOffset::parse("1h-5").is_err());
        assert!(TimeOffset::parse("1h2h3").is_err());
        assert!(TimeOffset::parse("abc").is_err());
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(TimeOffset::default().to_string(), "0h00");
    }
}
