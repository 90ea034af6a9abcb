pub mod analog;
pub mod configuration;
pub mod digital;
pub mod sample_rate;
pub mod types;

pub use analog::{
    decode_phase_id, encode_phase_id, AnalogChannel, DEFAULT_ANALOG_MULTIPLIER,
    DEFAULT_CURRENT_MAGNITUDE_MULTIPLIER, DEFAULT_DFDT_MULTIPLIER, DEFAULT_FREQUENCY_MULTIPLIER,
    DEFAULT_PHASE_ANGLE_MULTIPLIER, DEFAULT_VOLTAGE_MAGNITUDE_MULTIPLIER,
};
pub use configuration::{Schema, CRLF};
pub use digital::DigitalChannel;
pub use sample_rate::SampleRate;
pub use types::*;
