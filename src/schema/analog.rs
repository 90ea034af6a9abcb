use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

use super::types::{
    analog_field_count, format_number, parse_integer, parse_number, truncate_field, CompoundName,
    CoordinateFormat, SignalKind, SignalQuantity, VERSION_1999,
};
use crate::error::{ComtradeError, Result};
use crate::units::{convert_angle, AngleUnit};

pub const DEFAULT_CURRENT_MAGNITUDE_MULTIPLIER: f64 = 0.05;
pub const DEFAULT_VOLTAGE_MAGNITUDE_MULTIPLIER: f64 = 5.77362;
pub const DEFAULT_PHASE_ANGLE_MULTIPLIER: f64 = 1.0e-4;
pub const DEFAULT_FREQUENCY_MULTIPLIER: f64 = 0.001;
pub const DEFAULT_DFDT_MULTIPLIER: f64 = 0.01;
pub const DEFAULT_ANALOG_MULTIPLIER: f64 = 0.04;

const MAX_CIRCUIT_COMPONENT_LENGTH: usize = 64;
const MAX_UNITS_LENGTH: usize = 32;

/// Map a phase designation character onto the ANSI/IEEE set `A B C P - 0`
pub fn normalize_phase_designation(designation: char) -> Option<char> {
    match designation.to_ascii_uppercase() {
        'A' | 'R' | '1' => Some('A'),
        'B' | 'S' | '2' => Some('B'),
        'C' | 'T' | '3' => Some('C'),
        'P' | '+' => Some('P'),
        'N' | '-' => Some('-'),
        'Z' | '0' => Some('0'),
        _ => None,
    }
}

/// Split an analog phase-id token into signal kind, coordinate format and
/// phase designation
pub fn decode_phase_id(token: &str) -> (SignalKind, CoordinateFormat, Option<char>) {
    let token = token.trim();
    let mut chars = token.chars();

    let Some(first) = chars.next() else {
        return (SignalKind::Analog, CoordinateFormat::Polar, None);
    };
    if token.eq_ignore_ascii_case("F") {
        return (SignalKind::Frequency, CoordinateFormat::Polar, None);
    }
    if token.eq_ignore_ascii_case("df") {
        return (SignalKind::DfDt, CoordinateFormat::Polar, None);
    }

    let designation = normalize_phase_designation(first);
    let (kind, format) = match chars.next().map(|c| c.to_ascii_lowercase()) {
        Some('r') => (SignalKind::Magnitude, CoordinateFormat::Rectangular),
        Some('i') => (SignalKind::Angle, CoordinateFormat::Rectangular),
        Some('m') => (SignalKind::Magnitude, CoordinateFormat::Polar),
        Some('a') => (SignalKind::Angle, CoordinateFormat::Polar),
        _ => (SignalKind::Analog, CoordinateFormat::Polar),
    };
    (kind, format, designation)
}

/// Inverse of [`decode_phase_id`]
pub fn encode_phase_id(kind: SignalKind, format: CoordinateFormat, designation: Option<char>) -> String {
    match (kind, format, designation) {
        (SignalKind::Magnitude, CoordinateFormat::Rectangular, Some(phase)) => format!("{}r", phase),
        (SignalKind::Magnitude, CoordinateFormat::Polar, Some(phase)) => format!("{}m", phase),
        (SignalKind::Angle, CoordinateFormat::Rectangular, Some(phase)) => format!("{}i", phase),
        (SignalKind::Angle, CoordinateFormat::Polar, Some(phase)) => format!("{}a", phase),
        (SignalKind::Frequency, _, _) => "F".to_string(),
        (SignalKind::DfDt, _, _) => "df".to_string(),
        (_, _, phase) => phase.map(String::from).unwrap_or_default(),
    }
}

/// One analog channel definition:
/// `An,ch_id,ph,ccbm,uu,a,b,skew,min,max[,primary,secondary,PS]`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalogChannel {
    pub index: usize,
    name: CompoundName,
    phase_designation: Option<char>,
    signal_kind: SignalKind,
    pub coordinate_format: CoordinateFormat,
    pub signal_quantity: SignalQuantity,
    nominal_frequency: f64,
    circuit_component: String,
    units: String,
    /// `a`: physical value = raw * multiplier + adder
    pub multiplier: f64,
    /// `b`
    pub adder: f64,
    /// Time skew from the start of the sample period, in microseconds
    pub skew: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub primary_ratio: f64,
    pub secondary_ratio: f64,
    scaling_identifier: char,
    #[serde(skip)]
    version: u16,
    #[serde(skip)]
    target_floating_point: bool,
}

impl AnalogChannel {
    pub fn new(version: u16, target_floating_point: bool) -> Self {
        let (multiplier, min_value, max_value) = if target_floating_point {
            (1.0, f32::MIN as f64, f32::MAX as f64)
        } else {
            (DEFAULT_ANALOG_MULTIPLIER, -99999.0, 99998.0)
        };

        AnalogChannel {
            index: 0,
            name: CompoundName::default(),
            phase_designation: None,
            signal_kind: SignalKind::Analog,
            coordinate_format: CoordinateFormat::Polar,
            signal_quantity: SignalQuantity::Voltage,
            nominal_frequency: 60.0,
            circuit_component: String::new(),
            units: String::new(),
            multiplier,
            adder: 0.0,
            skew: 0.0,
            min_value,
            max_value,
            primary_ratio: 1.0,
            secondary_ratio: 1.0,
            scaling_identifier: 'P',
            version,
            target_floating_point,
        }
    }

    /// Parse one analog channel line of the configuration.
    ///
    /// `target_floating_point` must reflect the schema's file type, which is
    /// why analog lines are parsed only after the file type line.
    pub fn parse(line: &str, version: u16, target_floating_point: bool, relaxed: bool) -> Result<Self> {
        let parts: Vec<&str> = line.split(',').collect();
        analog_field_count().check("analog channel", line, parts.len(), relaxed)?;

        let mut channel = AnalogChannel::new(version, target_floating_point);
        channel.index = parse_integer("analog channel index", parts[0], line)?;
        channel.set_name(parts[1]);
        channel.set_units(parts[4]);
        channel.set_phase_id(parts[2]);
        channel.set_circuit_component(parts[3]);
        channel.multiplier = parse_number("analog multiplier", parts[5], line)?;
        channel.adder = parse_number("analog adder", parts[6], line)?;
        channel.skew = parse_number("analog skew", parts[7], line)?;
        channel.min_value = parse_number("analog minimum", parts[8], line)?;
        channel.max_value = parse_number("analog maximum", parts[9], line)?;

        if parts.len() >= 13 {
            channel.primary_ratio = parse_number("primary ratio", parts[10], line)?;
            channel.secondary_ratio = parse_number("secondary ratio", parts[11], line)?;
            let identifier = parts[12].trim().chars().next().unwrap_or(' ');
            channel
                .set_scaling_identifier(identifier)
                .map_err(|_| ComtradeError::invalid_value("scaling identifier", parts[12], line))?;
        }

        Ok(channel)
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn is_target_floating_point(&self) -> bool {
        self.target_floating_point
    }

    pub fn name(&self) -> String {
        self.name.to_string()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = CompoundName::parse(name);
    }

    pub fn station_name(&self) -> &str {
        self.name.station()
    }

    pub fn set_station_name(&mut self, station: &str) {
        self.name.set_station(station);
    }

    pub fn channel_name(&self) -> &str {
        self.name.channel()
    }

    pub fn set_channel_name(&mut self, channel: &str) {
        self.name.set_channel(channel);
    }

    pub fn phase_id(&self) -> String {
        encode_phase_id(self.signal_kind, self.coordinate_format, self.phase_designation)
    }

    pub fn set_phase_id(&mut self, token: &str) {
        let (kind, format, designation) = decode_phase_id(token);
        self.phase_designation = designation;
        self.apply_signal_kind(kind);
        self.coordinate_format = format;
    }

    pub fn phase_designation(&self) -> Option<char> {
        self.phase_designation
    }

    pub fn set_phase_designation(&mut self, designation: &str) {
        self.phase_designation = designation.trim().chars().next().and_then(normalize_phase_designation);
    }

    pub fn signal_kind(&self) -> SignalKind {
        self.signal_kind
    }

    /// Change the signal kind and reset scaling to that kind's defaults
    pub fn set_signal_kind(&mut self, kind: SignalKind) -> Result<()> {
        if !kind.is_valid_analog() {
            return Err(ComtradeError::InvalidSignalKind(kind));
        }
        self.apply_signal_kind(kind);
        Ok(())
    }

    fn apply_signal_kind(&mut self, kind: SignalKind) {
        self.signal_kind = kind;

        if self.target_floating_point {
            match kind {
                SignalKind::Angle => {
                    let unit = self.angle_unit();
                    self.min_value = convert_angle(-PI, AngleUnit::Radians, unit);
                    self.max_value = convert_angle(PI, AngleUnit::Radians, unit);
                }
                SignalKind::Frequency => {
                    self.min_value = self.nominal_frequency - 4.0;
                    self.max_value = self.nominal_frequency + 4.0;
                }
                _ => {}
            }
            return;
        }

        let (multiplier, adder) = match kind {
            SignalKind::Angle => (DEFAULT_PHASE_ANGLE_MULTIPLIER, 0.0),
            SignalKind::Magnitude => match self.signal_quantity {
                SignalQuantity::Current => (DEFAULT_CURRENT_MAGNITUDE_MULTIPLIER, 0.0),
                SignalQuantity::Voltage => (DEFAULT_VOLTAGE_MAGNITUDE_MULTIPLIER, 0.0),
            },
            SignalKind::Frequency => (DEFAULT_FREQUENCY_MULTIPLIER, self.nominal_frequency),
            SignalKind::DfDt => (DEFAULT_DFDT_MULTIPLIER, 0.0),
            _ => (DEFAULT_ANALOG_MULTIPLIER, 0.0),
        };
        self.multiplier = multiplier;
        self.adder = adder;
    }

    pub fn nominal_frequency(&self) -> f64 {
        self.nominal_frequency
    }

    /// Frequency channels record their deviation from nominal, so the adder
    /// follows the nominal frequency
    pub fn set_nominal_frequency(&mut self, frequency: f64) {
        self.nominal_frequency = frequency;
        if self.signal_kind == SignalKind::Frequency {
            self.adder = frequency;
        }
    }

    /// Record the nominal frequency while keeping a parsed adder
    pub(crate) fn store_nominal_frequency(&mut self, frequency: f64) {
        self.nominal_frequency = frequency;
    }

    pub fn circuit_component(&self) -> &str {
        &self.circuit_component
    }

    pub fn set_circuit_component(&mut self, component: &str) {
        self.circuit_component = truncate_field(component, MAX_CIRCUIT_COMPONENT_LENGTH);
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn set_units(&mut self, units: &str) {
        self.units = truncate_field(units, MAX_UNITS_LENGTH);
    }

    /// Angle unit implied by the units string
    pub fn angle_unit(&self) -> AngleUnit {
        AngleUnit::from_units(&self.units)
    }

    /// `P` when the scaling factors yield primary values, `S` for secondary
    pub fn scaling_identifier(&self) -> char {
        self.scaling_identifier
    }

    pub fn set_scaling_identifier(&mut self, identifier: char) -> Result<()> {
        let identifier = identifier.to_ascii_uppercase();
        if identifier != 'P' && identifier != 'S' {
            return Err(ComtradeError::InvalidScalingIdentifier(identifier));
        }
        self.scaling_identifier = identifier;
        Ok(())
    }

    pub fn physical_value(&self, raw: f64) -> f64 {
        raw * self.multiplier + self.adder
    }

    pub fn raw_value(&self, value: f64) -> f64 {
        (value - self.adder) / self.multiplier
    }
}

impl Default for AnalogChannel {
    fn default() -> Self {
        AnalogChannel::new(VERSION_1999, false)
    }
}

impl fmt::Display for AnalogChannel {
    /// The configuration line; ratio fields only from version 1999 on
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{}",
            self.index,
            self.name,
            self.phase_id(),
            self.circuit_component,
            self.units,
            format_number(self.multiplier),
            format_number(self.adder),
            format_number(self.skew),
            format_number(self.min_value),
            format_number(self.max_value)
        )?;
        if self.version >= VERSION_1999 {
            write!(
                f,
                ",{},{},{}",
                format_number(self.primary_ratio),
                format_number(self.secondary_ratio),
                self.scaling_identifier
            )?;
        }
        Ok(())
    }
}
