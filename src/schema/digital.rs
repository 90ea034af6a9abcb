use serde::Serialize;
use std::fmt;

use super::types::{digital_field_count, parse_integer, truncate_field, CompoundName, VERSION_1999};
use crate::error::Result;

/// Digital phase ids are nominally two characters, but three-character ids
/// such as `T10` are common
const MAX_PHASE_ID_LENGTH: usize = 3;
const MAX_CIRCUIT_COMPONENT_LENGTH: usize = 64;

/// One digital (status) channel definition: `Dn,ch_id[,ph,ccbm],y`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DigitalChannel {
    pub index: usize,
    name: CompoundName,
    phase_id: String,
    circuit_component: String,
    /// Resting state of the input
    pub normal_state: bool,
    #[serde(skip)]
    version: u16,
}

impl DigitalChannel {
    pub fn new(version: u16) -> Self {
        DigitalChannel {
            version,
            ..DigitalChannel::default()
        }
    }

    pub fn parse(line: &str, version: u16, relaxed: bool) -> Result<Self> {
        let parts: Vec<&str> = line.split(',').collect();
        digital_field_count().check("digital channel", line, parts.len(), relaxed)?;

        let mut channel = DigitalChannel::new(version);
        channel.index = parse_integer("digital channel index", parts[0], line)?;
        channel.set_name(parts[1]);

        let state = if parts.len() >= 5 {
            channel.set_phase_id(parts[2]);
            channel.set_circuit_component(parts[3]);
            parts[4]
        } else {
            parts[2]
        };
        channel.normal_state = parse_state(state);

        Ok(channel)
    }

    pub fn version(&self) -> u16 {
        self.version
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

    pub fn phase_id(&self) -> &str {
        &self.phase_id
    }

    pub fn set_phase_id(&mut self, phase_id: &str) {
        self.phase_id = truncate_field(phase_id, MAX_PHASE_ID_LENGTH);
    }

    pub fn circuit_component(&self) -> &str {
        &self.circuit_component
    }

    pub fn set_circuit_component(&mut self, component: &str) {
        self.circuit_component = truncate_field(component, MAX_CIRCUIT_COMPONENT_LENGTH);
    }
}

fn parse_state(token: &str) -> bool {
    let token = token.trim();
    token == "1" || token.eq_ignore_ascii_case("true")
}

impl fmt::Display for DigitalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.normal_state { "1" } else { "0" };
        if self.version >= VERSION_1999 {
            write!(
                f,
                "{},{},{},{},{}",
                self.index, self.name, self.phase_id, self.circuit_component, state
            )
        } else {
            write!(f, "{},{},{}", self.index, self.name, state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComtradeError;

    #[test]
    fn test_parse_five_fields() {
        let channel = DigitalChannel::parse("3,St1:BRK,T10,Breaker 52,1", 2013, false).unwrap();
        assert_eq!(channel.index, 3);
        assert_eq!(channel.name(), "St1:BRK");
        assert_eq!(channel.channel_name(), "BRK");
        assert_eq!(channel.phase_id(), "T10");
        assert_eq!(channel.circuit_component(), "Breaker 52");
        assert!(channel.normal_state);
        assert_eq!(channel.to_string(), "3,St1:BRK,T10,Breaker 52,1");
    }

    #[test]
    fn test_parse_legacy_three_fields() {
        let channel = DigitalChannel::parse("1,TRIP,0", 1991, false).unwrap();
        assert_eq!(channel.name(), "TRIP");
        assert!(!channel.normal_state);
        assert_eq!(channel.phase_id(), "");
        assert_eq!(channel.to_string(), "1,TRIP,0");
    }

    #[test]
    fn test_normal_state_tokens() {
        assert!(DigitalChannel::parse("1,A,,,true", 1999, false).unwrap().normal_state);
        assert!(DigitalChannel::parse("1,A,,, 1 ", 1999, false).unwrap().normal_state);
        assert!(!DigitalChannel::parse("1,A,,,x", 1999, false).unwrap().normal_state);
    }

    #[test]
    fn test_field_count_validation() {
        let err = DigitalChannel::parse("1,A,B,C", 1999, false).unwrap_err();
        assert!(matches!(err, ComtradeError::FieldCount { actual: 4, .. }));
        assert!(DigitalChannel::parse("1,A,B,C", 1999, true).is_ok());
        assert!(DigitalChannel::parse("1,A", 1999, true).is_err());
    }

    #[test]
    fn test_phase_id_truncated() {
        let mut channel = DigitalChannel::new(1999);
        channel.set_phase_id(" ABCDE ");
        assert_eq!(channel.phase_id(), "ABC");
    }

    #[test]
    fn test_version_gates_output() {
        let mut channel = DigitalChannel::parse("2,D2,B1,ccbm,0", 1999, false).unwrap();
        assert_eq!(channel.to_string(), "2,D2,B1,ccbm,0");
        channel.version = 1991;
        assert_eq!(channel.to_string(), "2,D2,0");
    }
}
