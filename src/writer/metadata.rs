use serde::{Deserialize, Serialize};

use crate::schema::SignalType;

/// Description of one measurement point, the input to
/// [`create_schema`](super::create_schema)
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct ChannelMetadata {
    pub name: String,
    pub signal_type: SignalType,
    pub is_digital: bool,
    pub units: Option<String>,
    pub circuit_component: Option<String>,
}

impl ChannelMetadata {
    pub fn analog(name: &str, signal_type: SignalType) -> Self {
        ChannelMetadata {
            name: name.to_string(),
            signal_type,
            ..Default::default()
        }
    }

    pub fn digital(name: &str, signal_type: SignalType) -> Self {
        ChannelMetadata {
            name: name.to_string(),
            signal_type,
            is_digital: true,
            ..Default::default()
        }
    }

    /// Status flags, then digital words, then quality flags follow all other
    /// points
    pub fn sort_key(&self) -> u8 {
        match self.signal_type {
            SignalType::Flag => 1,
            SignalType::Digi => 2,
            SignalType::Qual => 3,
            _ => 0,
        }
    }
}

/// Order points for schema construction; ties keep their input order
pub fn sort_metadata(metadata: &[ChannelMetadata]) -> Vec<&ChannelMetadata> {
    let mut sorted: Vec<&ChannelMetadata> = metadata.iter().collect();
    sorted.sort_by_key(|record| record.sort_key());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable() {
        let metadata = vec![
            ChannelMetadata::digital("QUAL", SignalType::Qual),
            ChannelMetadata::analog("VA", SignalType::Vphm),
            ChannelMetadata::digital("STAT", SignalType::Flag),
            ChannelMetadata::analog("IA", SignalType::Iphm),
            ChannelMetadata::digital("BRK", SignalType::Digi),
            ChannelMetadata::analog("F", SignalType::Freq),
        ];

        let names: Vec<&str> = sort_metadata(&metadata)
            .iter()
            .map(|record| record.name.as_str())
            .collect();
        assert_eq!(names, vec!["VA", "IA", "F", "STAT", "BRK", "QUAL"]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"[
            {"name": "IA", "signal_type": "IPHM", "units": "kA"},
            {"name": "BRK", "signal_type": "DIGI", "is_digital": true, "circuit_component": "CB1"}
        ]"#;

        let metadata: Vec<ChannelMetadata> = serde_json::from_str(json).unwrap();
        assert_eq!(metadata[0].signal_type, SignalType::Iphm);
        assert_eq!(metadata[0].units.as_deref(), Some("kA"));
        assert!(!metadata[0].is_digital);
        assert!(metadata[1].is_digital);
        assert_eq!(metadata[1].circuit_component.as_deref(), Some("CB1"));
    }
}
