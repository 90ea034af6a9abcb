//! Angle unit types and conversion utilities.
//!
//! Phase-angle channels record their angles in whatever unit the recording
//! device chose ("Degrees", "Rads", "grad", ...). This module infers the unit
//! from a channel's units string and converts between units so that decoded
//! angles can be presented consistently.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

/// Unit in which an angle is expressed
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Deserialize, Display, EnumString, PartialEq, Eq, Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
    Grads,
    ArcMinutes,
    ArcSeconds,
    AngularMil,
}

impl AngleUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            AngleUnit::Radians => "rad",
            AngleUnit::Degrees => "°",
            AngleUnit::Grads => "grad",
            AngleUnit::ArcMinutes => "′",
            AngleUnit::ArcSeconds => "″",
            AngleUnit::AngularMil => "mil",
        }
    }

    /// Number of this unit in one radian
    pub fn per_radian(&self) -> f64 {
        match self {
            AngleUnit::Radians => 1.0,
            AngleUnit::Degrees => 180.0 / PI,
            AngleUnit::Grads => 200.0 / PI,
            AngleUnit::ArcMinutes => 10_800.0 / PI,
            AngleUnit::ArcSeconds => 648_000.0 / PI,
            // NATO mil: 6400 per full turn
            AngleUnit::AngularMil => 3_200.0 / PI,
        }
    }

    /// Infer the angle unit from a channel's units string.
    ///
    /// An exact (case-insensitive) unit name wins, then common prefixes are
    /// tried; anything unrecognised is treated as radians.
    pub fn from_units(units: &str) -> AngleUnit {
        let units = units.trim();
        if let Ok(unit) = AngleUnit::from_str(units) {
            return unit;
        }

        let lower = units.to_ascii_lowercase();
        let starts_with_any = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));

        if starts_with_any(&["deg"]) {
            AngleUnit::Degrees
        } else if starts_with_any(&["grad", "gon"]) {
            AngleUnit::Grads
        } else if starts_with_any(&["arcm", "min", "moa"]) {
            AngleUnit::ArcMinutes
        } else if starts_with_any(&["arcs", "sec"]) {
            AngleUnit::ArcSeconds
        } else if starts_with_any(&["ang", "mil"]) {
            AngleUnit::AngularMil
        } else {
            AngleUnit::Radians
        }
    }
}

/// An angle, stored in radians
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct Angle(pub f64);

impl Angle {
    /// Create an angle from a value expressed in `unit`
    pub fn from_unit(value: f64, unit: AngleUnit) -> Angle {
        Angle(value / unit.per_radian())
    }

    /// Express this angle in `unit`
    pub fn to_unit(self, unit: AngleUnit) -> f64 {
        self.0 * unit.per_radian()
    }

    pub fn radians(self) -> f64 {
        self.0
    }
}

/// Convert an angle value between two units
pub fn convert_angle(value: f64, from: AngleUnit, to: AngleUnit) -> f64 {
    if from == to {
        return value;
    }
    Angle::from_unit(value, from).to_unit(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "Expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_from_units_exact_names() {
        assert_eq!(AngleUnit::from_units("Degrees"), AngleUnit::Degrees);
        assert_eq!(AngleUnit::from_units("radians"), AngleUnit::Radians);
        assert_eq!(AngleUnit::from_units("ARCSECONDS"), AngleUnit::ArcSeconds);
    }

    #[test]
    fn test_from_units_prefixes() {
        assert_eq!(AngleUnit::from_units("deg"), AngleUnit::Degrees);
        assert_eq!(AngleUnit::from_units("gon"), AngleUnit::Grads);
        assert_eq!(AngleUnit::from_units("grd"), AngleUnit::Radians);
        assert_eq!(AngleUnit::from_units("MOA"), AngleUnit::ArcMinutes);
        assert_eq!(AngleUnit::from_units("sec"), AngleUnit::ArcSeconds);
        assert_eq!(AngleUnit::from_units("mils"), AngleUnit::AngularMil);
        // Units of non-angle channels fall back to radians
        assert_eq!(AngleUnit::from_units("Rads"), AngleUnit::Radians);
        assert_eq!(AngleUnit::from_units("A"), AngleUnit::Radians);
        assert_eq!(AngleUnit::from_units(""), AngleUnit::Radians);
    }

    #[test]
    fn test_angle_conversions() {
        assert_close(Angle(PI).to_unit(AngleUnit::Degrees), 180.0);
        assert_close(Angle(PI).to_unit(AngleUnit::Grads), 200.0);
        assert_close(Angle(PI).to_unit(AngleUnit::AngularMil), 3200.0);
        assert_close(Angle::from_unit(90.0, AngleUnit::Degrees).radians(), PI / 2.0);
        assert_close(convert_angle(1.0, AngleUnit::Degrees, AngleUnit::ArcMinutes), 60.0);
        assert_close(convert_angle(1.0, AngleUnit::ArcMinutes, AngleUnit::ArcSeconds), 60.0);
        assert_close(convert_angle(-45.0, AngleUnit::Degrees, AngleUnit::Degrees), -45.0);
    }
}
