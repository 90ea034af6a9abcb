use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{ComtradeError, Result};

/// Format revisions of IEEE C37.111
pub const VERSION_1991: u16 = 1991;
pub const VERSION_1999: u16 = 1999;
pub const VERSION_2013: u16 = 2013;

/// Encoding of the data file / DAT section
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Deserialize, Display, EnumString, PartialEq, Eq, Hash, Serialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    #[strum(serialize = "ASCII")]
    Ascii,
    #[default]
    #[strum(serialize = "BINARY")]
    Binary,
    #[strum(serialize = "BINARY32")]
    Binary32,
    #[strum(serialize = "FLOAT32")]
    Float32,
}

impl FileType {
    /// Bytes per analog value in a binary record; ASCII has no fixed width
    pub fn analog_value_size(&self) -> usize {
        match self {
            FileType::Ascii => 0,
            FileType::Binary => 2,
            FileType::Binary32 | FileType::Float32 => 4,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, FileType::Float32)
    }
}

/// Time quality of the recording clock, written as one hex digit
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum TimeQualityIndicatorCode {
    #[default]
    Locked = 0x0,
    UnlockedPoint000000001Seconds = 0x1,
    UnlockedPoint00000001Seconds = 0x2,
    UnlockedPoint0000001Seconds = 0x3,
    UnlockedPoint000001Seconds = 0x4,
    UnlockedPoint00001Seconds = 0x5,
    UnlockedPoint0001Seconds = 0x6,
    UnlockedPoint001Seconds = 0x7,
    UnlockedPoint01Seconds = 0x8,
    UnlockedPoint1Seconds = 0x9,
    Unlocked1Second = 0xA,
    Unlocked10Seconds = 0xB,
    Failure = 0xF,
}

impl TryFrom<u8> for TimeQualityIndicatorCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        use TimeQualityIndicatorCode::*;
        Ok(match value {
            0x0 => Locked,
            0x1 => UnlockedPoint000000001Seconds,
            0x2 => UnlockedPoint00000001Seconds,
            0x3 => UnlockedPoint0000001Seconds,
            0x4 => UnlockedPoint000001Seconds,
            0x5 => UnlockedPoint00001Seconds,
            0x6 => UnlockedPoint0001Seconds,
            0x7 => UnlockedPoint001Seconds,
            0x8 => UnlockedPoint01Seconds,
            0x9 => UnlockedPoint1Seconds,
            0xA => Unlocked1Second,
            0xB => Unlocked10Seconds,
            0xF => Failure,
            other => return Err(other),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum LeapSecondIndicator {
    #[default]
    NoLeapSecondAdjustment = 0,
    LeapSecondWasAdded = 1,
    LeapSecondWasSubtracted = 2,
    NoLeapSecondCapacity = 3,
}

impl TryFrom<u8> for LeapSecondIndicator {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(LeapSecondIndicator::NoLeapSecondAdjustment),
            1 => Ok(LeapSecondIndicator::LeapSecondWasAdded),
            2 => Ok(LeapSecondIndicator::LeapSecondWasSubtracted),
            3 => Ok(LeapSecondIndicator::NoLeapSecondCapacity),
            other => Err(other),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub enum CoordinateFormat {
    Rectangular,
    #[default]
    Polar,
}

/// What an analog (or expanded digital) channel measures.
///
/// Declaration order is significant: the set of valid analog kinds is kept
/// sorted by it and binary-searched.
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Deserialize, Display, EnumString, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum SignalKind {
    Angle,
    Magnitude,
    Frequency,
    DfDt,
    Status,
    Digital,
    #[default]
    Analog,
    Calculation,
    Statistic,
    Alarm,
    Quality,
    Unknown,
}

/// Kinds an analog channel may carry, sorted
pub const VALID_ANALOG_SIGNAL_KINDS: [SignalKind; 7] = [
    SignalKind::Angle,
    SignalKind::Magnitude,
    SignalKind::Frequency,
    SignalKind::DfDt,
    SignalKind::Analog,
    SignalKind::Calculation,
    SignalKind::Statistic,
];

impl SignalKind {
    pub fn is_valid_analog(&self) -> bool {
        VALID_ANALOG_SIGNAL_KINDS.binary_search(self).is_ok()
    }
}

/// Synchrophasor measurement types, as used to describe channels when
/// building a schema from point metadata
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Deserialize, Display, EnumString, PartialEq, Eq, Hash, Serialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    /// Current phase magnitude
    #[strum(serialize = "IPHM")]
    Iphm = 1,
    /// Current phase angle
    #[strum(serialize = "IPHA")]
    Ipha = 2,
    /// Voltage phase magnitude
    #[strum(serialize = "VPHM")]
    Vphm = 3,
    /// Voltage phase angle
    #[strum(serialize = "VPHA")]
    Vpha = 4,
    /// Frequency
    #[strum(serialize = "FREQ")]
    Freq = 5,
    /// Rate of change of frequency
    #[strum(serialize = "DFDT")]
    Dfdt = 6,
    /// Generic analog value
    #[strum(serialize = "ALOG")]
    Alog = 7,
    /// Status flags
    #[strum(serialize = "FLAG")]
    Flag = 8,
    /// Digital value
    #[strum(serialize = "DIGI")]
    Digi = 9,
    /// Calculated value
    #[strum(serialize = "CALC")]
    Calc = 10,
    /// Statistic
    #[strum(serialize = "STAT")]
    Stat = 11,
    /// Alarm
    #[strum(serialize = "ALRM")]
    Alrm = 12,
    /// Quality flags
    #[strum(serialize = "QUAL")]
    Qual = 13,
    #[default]
    #[strum(serialize = "NONE")]
    None = -1,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub enum SignalQuantity {
    #[default]
    Voltage,
    Current,
}

/// Accepted field counts for one kind of configuration line.
///
/// Strict validation accepts exactly `min` (the pre-1999 shape) or `max`
/// (the 1999+ shape); relaxed validation accepts anything from `min` up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldCount {
    pub min: usize,
    pub max: usize,
}

impl FieldCount {
    pub fn accepts(&self, count: usize, relaxed: bool) -> bool {
        if relaxed {
            count >= self.min
        } else {
            count == self.min || count == self.max
        }
    }

    /// Shape written for `version`
    pub fn emitted(&self, version: u16) -> usize {
        if version >= VERSION_1999 {
            self.max
        } else {
            self.min
        }
    }

    pub fn describe(&self) -> String {
        if self.min == self.max {
            self.min.to_string()
        } else {
            format!("{} or {}", self.min, self.max)
        }
    }

    pub(crate) fn check(&self, what: &'static str, line: &str, count: usize, relaxed: bool) -> Result<()> {
        if self.accepts(count, relaxed) {
            if relaxed && count != self.min && count != self.max {
                tracing::warn!(
                    "Accepting {} line with {} fields (expected {}): {}",
                    what,
                    count,
                    self.describe(),
                    line
                );
            }
            return Ok(());
        }
        Err(ComtradeError::FieldCount {
            what,
            expected: self.describe(),
            actual: count,
            line: line.to_string(),
        })
    }
}

/// `An,ch_id,ph,ccbm,uu,a,b,skew,min,max[,primary,secondary,PS]`
pub const fn analog_field_count() -> FieldCount {
    FieldCount { min: 10, max: 13 }
}

/// `Dn,ch_id[,ph,ccbm],y`
pub const fn digital_field_count() -> FieldCount {
    FieldCount { min: 3, max: 5 }
}

/// Channel name of the form `station:channel`, or a bare `channel`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundName {
    station: String,
    channel: String,
}

impl CompoundName {
    pub fn parse(value: &str) -> Self {
        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [station, channel] => CompoundName {
                station: station.trim().to_string(),
                channel: channel.trim().to_string(),
            },
            _ => CompoundName {
                station: String::new(),
                channel: parts[0].trim().to_string(),
            },
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn set_station(&mut self, station: &str) {
        self.station = station.replace(':', "_").trim().to_string();
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn set_channel(&mut self, channel: &str) {
        self.channel = channel.replace(':', "_").trim().to_string();
    }
}

impl std::fmt::Display for CompoundName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.station.trim().is_empty() {
            write!(f, "{}", self.channel)
        } else {
            write!(f, "{}:{}", self.station, self.channel)
        }
    }
}

impl Serialize for CompoundName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Trim and cut a configuration text field to at most `limit` characters
pub(crate) fn truncate_field(value: &str, limit: usize) -> String {
    value.trim().chars().take(limit).collect()
}

/// Format a number the way configuration files expect it: invariant
/// culture, shortest round-trip digits, exponent only for extreme magnitudes
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1e-5..1e15).contains(&magnitude) {
        let text = format!("{:E}", value);
        match text.split_once('E') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}E{}{:0>2}", mantissa, sign, digits)
            }
            None => text,
        }
    } else {
        format!("{}", value)
    }
}

/// Parse an invariant-culture number from a configuration field
pub(crate) fn parse_number(what: &'static str, field: &str, line: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| ComtradeError::invalid_value(what, field.trim(), line))
}

pub(crate) fn parse_integer<T: std::str::FromStr>(what: &'static str, field: &str, line: &str) -> Result<T> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| ComtradeError::invalid_value(what, field.trim(), line))
}
