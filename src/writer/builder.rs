//! Schema construction for synchrophasor exports.
//!
//! Points are described by [`ChannelMetadata`]; analog points map onto one
//! analog channel each while digital points expand into 16 bit channels.

use serde::{Deserialize, Serialize};

use super::metadata::{sort_metadata, ChannelMetadata};
use crate::schema::{
    AnalogChannel, DigitalChannel, FileType, SampleRate, Schema, SignalQuantity, SignalType,
    DEFAULT_ANALOG_MULTIPLIER, DEFAULT_CURRENT_MAGNITUDE_MULTIPLIER, DEFAULT_DFDT_MULTIPLIER,
    DEFAULT_FREQUENCY_MULTIPLIER, DEFAULT_PHASE_ANGLE_MULTIPLIER,
    DEFAULT_VOLTAGE_MAGNITUDE_MULTIPLIER, VERSION_1999,
};
use crate::time::{Ticks, Timestamp};

/// Names of the 16 FRACSEC bits: 4 time quality count bits, 4 status bits,
/// 8 reserved bits
const FRACSEC_CHANNEL_NAMES: [&str; 16] = [
    "TQ_CNT0", "TQ_CNT1", "TQ_CNT2", "TQ_CNT3", "TQ_LSPND", "TQ_LSOCC", "TQ_LSDIR", "TQ_RSV",
    "RESV1", "RESV2", "RESV3", "RESV4", "RESV5", "RESV6", "RESV7", "RESV8",
];

/// Sub-flags of a synchrophasor status word, in bit order
const STATUS_FLAG_NAMES: [&str; 16] = [
    "TRG1", "TRG2", "TRG3", "TRG4", "UNLK1", "UNLK2", "SEC1", "SEC2", "SEC3", "SEC4", "CFGCH",
    "PMUTR", "SORT", "SYNC", "PMUERR", "DTVLD",
];

/// Settings for [`create_schema`]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub station_name: String,
    pub device_id: String,
    /// Start and trigger time of the recording
    pub data_start_time: Ticks,
    /// End sample of the single sample rate region
    pub sample_count: i64,
    pub version: u16,
    pub file_type: FileType,
    pub time_factor: f64,
    pub sampling_rate: f64,
    pub nominal_frequency: f64,
    /// Prepend the FRACSEC digital channel block
    pub include_fracsec_definition: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        SchemaSettings {
            station_name: String::new(),
            device_id: String::new(),
            data_start_time: Ticks::default(),
            sample_count: 0,
            version: VERSION_1999,
            file_type: FileType::Binary,
            time_factor: 1.0,
            sampling_rate: 30.0,
            nominal_frequency: 60.0,
            include_fracsec_definition: true,
        }
    }
}

/// Build a schema for the given measurement points.
///
/// Analog points come first, then status flags, digital words and quality
/// flags. When enabled, the FRACSEC block is the first set of digital
/// channels.
pub fn create_schema(metadata: &[ChannelMetadata], settings: &SchemaSettings) -> Schema {
    let mut schema = Schema::new();
    schema.station_name = settings.station_name.clone();
    schema.device_id = settings.device_id.clone();
    schema.version = settings.version;
    schema.file_type = settings.file_type;
    schema.time_factor = settings.time_factor;
    schema.start_time = Timestamp::new(settings.data_start_time);
    schema.trigger_time = Timestamp::new(settings.data_start_time);
    schema.set_sample_rates(vec![SampleRate::new(settings.sampling_rate, settings.sample_count)]);

    let target_floating_point = settings.file_type.is_floating_point();
    let mut analog_channels = Vec::new();
    let mut digital_channels = Vec::new();

    if settings.include_fracsec_definition {
        for name in FRACSEC_CHANNEL_NAMES {
            let index = digital_channels.len() + 1;
            let mut channel = DigitalChannel::new(settings.version);
            channel.index = index;
            channel.set_name(name);
            channel.set_phase_id(&format!("T{}", index));
            digital_channels.push(channel);
        }
    }

    for record in sort_metadata(metadata) {
        if record.is_digital {
            push_digital_record(&mut digital_channels, record, settings.version);
        } else {
            let mut channel = analog_channel(record, settings, target_floating_point);
            channel.index = analog_channels.len() + 1;
            analog_channels.push(channel);
        }
    }

    tracing::debug!(
        "Built schema with {} analog and {} digital channels from {} points",
        analog_channels.len(),
        digital_channels.len(),
        metadata.len()
    );

    schema.analog_channels = analog_channels;
    schema.digital_channels = digital_channels;
    schema.set_nominal_frequency(settings.nominal_frequency);
    schema
}

fn push_digital_record(channels: &mut Vec<DigitalChannel>, record: &ChannelMetadata, version: u16) {
    let is_status = record.signal_type == SignalType::Flag;
    tracing::debug!(
        "Expanding digital point \"{}\" ({}) into 16 channels",
        record.name,
        record.signal_type
    );

    for bit in 0..16 {
        let mut channel = DigitalChannel::new(version);
        channel.index = channels.len() + 1;
        if is_status {
            channel.set_name(&format!("{}:{}", record.name, STATUS_FLAG_NAMES[bit]));
            channel.set_phase_id(&format!("S{:X}", bit));
        } else {
            channel.set_name(&record.name);
            channel.set_phase_id(&format!("B{:X}", bit));
            channel.set_circuit_component(record.circuit_component.as_deref().unwrap_or_default());
        }
        channels.push(channel);
    }
}

fn analog_channel(record: &ChannelMetadata, settings: &SchemaSettings, target_floating_point: bool) -> AnalogChannel {
    let (default_units, phase_id, multiplier) = match record.signal_type {
        SignalType::Iphm => (Some("A"), "Pm", DEFAULT_CURRENT_MAGNITUDE_MULTIPLIER),
        SignalType::Vphm => (Some("V"), "Pm", DEFAULT_VOLTAGE_MAGNITUDE_MULTIPLIER),
        SignalType::Ipha | SignalType::Vpha => (Some("Rads"), "Pa", DEFAULT_PHASE_ANGLE_MULTIPLIER),
        SignalType::Freq => (Some("Hz"), "F", DEFAULT_FREQUENCY_MULTIPLIER),
        SignalType::Dfdt => (Some("Hz/s"), "dF", DEFAULT_DFDT_MULTIPLIER),
        _ => (None, "", DEFAULT_ANALOG_MULTIPLIER),
    };

    let mut channel = AnalogChannel::new(settings.version, target_floating_point);
    channel.set_name(&record.name);
    channel.set_units(record.units.as_deref().or(default_units).unwrap_or_default());
    channel.set_nominal_frequency(settings.nominal_frequency);
    if record.signal_type == SignalType::Iphm {
        channel.signal_quantity = SignalQuantity::Current;
    }
    channel.set_phase_id(phase_id);
    channel.set_circuit_component(record.circuit_component.as_deref().unwrap_or_default());
    channel.multiplier = if target_floating_point { 1.0 } else { multiplier };
    channel
}
