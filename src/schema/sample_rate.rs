use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{format_number, parse_integer, parse_number, FieldCount};
use crate::error::Result;

/// One sampling-rate region: `samp,endsamp`
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SampleRate {
    /// Samples per second, zero when the rate is unspecified
    pub rate: f64,
    /// Last sample number of the region, inclusive
    pub end_sample: i64,
}

impl SampleRate {
    pub fn new(rate: f64, end_sample: i64) -> Self {
        SampleRate { rate, end_sample }
    }

    /// Substitute used when a configuration declares no rates
    pub fn placeholder() -> Self {
        SampleRate {
            rate: 0.0,
            end_sample: 1,
        }
    }

    pub fn parse(line: &str, relaxed: bool) -> Result<Self> {
        let parts: Vec<&str> = line.split(',').collect();
        FieldCount { min: 2, max: 2 }.check("sample rate", line, parts.len(), relaxed)?;

        Ok(SampleRate {
            rate: parse_number("sample rate", parts[0], line)?,
            end_sample: parse_integer("end sample", parts[1], line)?,
        })
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_number(self.rate), self.end_sample)
    }
}
