//! Sample record encoders.
//!
//! Value slices hold the analog values in physical units followed by the
//! digital values. Binary encoders expect one entry per 16-bit digital word;
//! the ASCII encoder takes either single 0/1 channel values or whole words,
//! which it expands into 16 channel tokens. A FRACSEC word, when given, is
//! written ahead of the first digital value.

use std::io::Write;

use crate::error::{ComtradeError, Result};
use crate::little_endian;
use crate::schema::{FileType, Schema};
use crate::time::Ticks;

use super::CRLF;

/// Write one record in the encoding the schema declares
pub fn write_record<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    match schema.file_type {
        FileType::Ascii => write_next_record_ascii(output, schema, timestamp, values, sample, fracsec),
        FileType::Binary => write_next_record_binary(output, schema, timestamp, values, sample, fracsec),
        FileType::Binary32 => write_next_record_binary32(output, schema, timestamp, values, sample, fracsec),
        FileType::Float32 => write_next_record_float32(output, schema, timestamp, values, sample, fracsec),
    }
}

pub fn write_next_record_ascii<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    check_file_type(schema, FileType::Ascii)?;
    let (analog, digital) = split_values(schema, values)?;

    let mut bits = Vec::with_capacity(schema.total_digital_channels());
    for value in digital {
        let word = *value as u16;
        if word < 2 {
            bits.push(word == 1);
        } else {
            bits.extend(word_bits(word));
        }
    }

    let line = encode_ascii(schema, timestamp, sample, analog, &bits, fracsec)?;
    output.write_all(line.as_bytes())?;
    Ok(())
}

pub fn write_next_record_binary<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_values(output, schema, FileType::Binary, timestamp, values, sample, fracsec)
}

pub fn write_next_record_binary32<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_values(output, schema, FileType::Binary32, timestamp, values, sample, fracsec)
}

pub fn write_next_record_float32<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_values(output, schema, FileType::Float32, timestamp, values, sample, fracsec)
}

/// ASCII record from analog values and one flag per digital channel
pub fn write_next_record_ascii_bits<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    analog_values: &[f64],
    digital_values: &[bool],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    check_file_type(schema, FileType::Ascii)?;
    check_analog_count(schema, analog_values)?;
    let line = encode_ascii(schema, timestamp, sample, analog_values, digital_values, fracsec)?;
    output.write_all(line.as_bytes())?;
    Ok(())
}

pub fn write_next_record_binary_bits<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    analog_values: &[f64],
    digital_values: &[bool],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_bits(output, schema, FileType::Binary, timestamp, analog_values, digital_values, sample, fracsec)
}

pub fn write_next_record_binary32_bits<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    analog_values: &[f64],
    digital_values: &[bool],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_bits(output, schema, FileType::Binary32, timestamp, analog_values, digital_values, sample, fracsec)
}

pub fn write_next_record_float32_bits<W: Write>(
    output: &mut W,
    schema: &Schema,
    timestamp: Ticks,
    analog_values: &[f64],
    digital_values: &[bool],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    write_binary_bits(output, schema, FileType::Float32, timestamp, analog_values, digital_values, sample, fracsec)
}

/// Pack channel flags into words, bit `j` of word `k` holding channel `16k + j`
pub fn pack_digital_words(digital_values: &[bool]) -> Vec<u16> {
    digital_values
        .chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, set)| **set)
                .fold(0u16, |word, (bit, _)| word | (1 << bit))
        })
        .collect()
}

fn word_bits(word: u16) -> impl Iterator<Item = bool> {
    (0..16).map(move |bit| word & (1 << bit) != 0)
}

fn check_file_type(schema: &Schema, attempted: FileType) -> Result<()> {
    if schema.file_type != attempted {
        return Err(ComtradeError::FileTypeMismatch {
            attempted,
            declared: schema.file_type,
        });
    }
    Ok(())
}

fn check_analog_count(schema: &Schema, analog_values: &[f64]) -> Result<()> {
    if analog_values.len() != schema.total_analog_channels() {
        return Err(ComtradeError::ValueCountMismatch {
            what: "analog values",
            expected: schema.total_analog_channels(),
            actual: analog_values.len(),
        });
    }
    Ok(())
}

fn split_values<'v>(schema: &Schema, values: &'v [f64]) -> Result<(&'v [f64], &'v [f64])> {
    let analog_count = schema.total_analog_channels();
    if values.len() < analog_count {
        return Err(ComtradeError::ValueCountMismatch {
            what: "analog values",
            expected: analog_count,
            actual: values.len(),
        });
    }
    Ok(values.split_at(analog_count))
}

/// Time offset from the start of the recording, in time factor units,
/// truncated toward zero. Timestamps before the start time or beyond the
/// 32-bit field are rejected.
fn relative_microseconds(schema: &Schema, timestamp: Ticks) -> Result<u32> {
    let relative = (timestamp - schema.start_time.value).to_microseconds() / schema.time_factor;
    if !(0.0..=u32::MAX as f64).contains(&relative) {
        return Err(ComtradeError::TimestampOutOfRange(relative));
    }
    Ok(relative as u32)
}

fn encode_ascii(
    schema: &Schema,
    timestamp: Ticks,
    sample: u32,
    analog_values: &[f64],
    digital_values: &[bool],
    fracsec: Option<u16>,
) -> Result<String> {
    let fracsec_bits = fracsec.into_iter().flat_map(word_bits);
    let bits: Vec<bool> = fracsec_bits.chain(digital_values.iter().copied()).collect();
    if bits.len() != schema.total_digital_channels() {
        return Err(ComtradeError::ValueCountMismatch {
            what: "digital values",
            expected: schema.total_digital_channels(),
            actual: bits.len(),
        });
    }

    let mut fields = Vec::with_capacity(2 + analog_values.len() + bits.len());
    fields.push(sample.to_string());
    fields.push(relative_microseconds(schema, timestamp)?.to_string());

    for (value, channel) in analog_values.iter().zip(&schema.analog_channels) {
        let raw = channel.raw_value(*value);
        // An empty field marks a missing value
        fields.push(if raw.is_nan() {
            String::new()
        } else {
            (raw.trunc() as i64).to_string()
        });
    }
    fields.extend(bits.iter().map(|bit| String::from(if *bit { "1" } else { "0" })));

    let mut line = fields.join(",");
    line.push_str(CRLF);
    Ok(line)
}

fn write_binary_values<W: Write>(
    output: &mut W,
    schema: &Schema,
    file_type: FileType,
    timestamp: Ticks,
    values: &[f64],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    check_file_type(schema, file_type)?;
    let (analog, digital) = split_values(schema, values)?;
    let words: Vec<u16> = digital.iter().map(|value| *value as u16).collect();
    let record = encode_binary(schema, file_type, timestamp, sample, analog, &words, fracsec)?;
    output.write_all(&record)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn write_binary_bits<W: Write>(
    output: &mut W,
    schema: &Schema,
    file_type: FileType,
    timestamp: Ticks,
    analog_values: &[f64],
    digital_values: &[bool],
    sample: u32,
    fracsec: Option<u16>,
) -> Result<()> {
    check_file_type(schema, file_type)?;
    check_analog_count(schema, analog_values)?;

    let fracsec_channels = if fracsec.is_some() { 16 } else { 0 };
    let expected = schema.total_digital_channels().saturating_sub(fracsec_channels);
    if digital_values.len() != expected {
        return Err(ComtradeError::ValueCountMismatch {
            what: "digital values",
            expected,
            actual: digital_values.len(),
        });
    }

    let words = pack_digital_words(digital_values);
    let record = encode_binary(schema, file_type, timestamp, sample, analog_values, &words, fracsec)?;
    output.write_all(&record)?;
    Ok(())
}

fn encode_binary(
    schema: &Schema,
    file_type: FileType,
    timestamp: Ticks,
    sample: u32,
    analog_values: &[f64],
    words: &[u16],
    fracsec: Option<u16>,
) -> Result<Vec<u8>> {
    let digital_words = words.len() + usize::from(fracsec.is_some());
    if digital_words != schema.digital_words() {
        return Err(ComtradeError::ValueCountMismatch {
            what: "digital words",
            expected: schema.digital_words(),
            actual: digital_words,
        });
    }

    let mut record = Vec::with_capacity(schema.record_length());
    record.extend_from_slice(&little_endian::u32_bytes(sample));
    record.extend_from_slice(&little_endian::u32_bytes(relative_microseconds(schema, timestamp)?));

    for (value, channel) in analog_values.iter().zip(&schema.analog_channels) {
        let raw = channel.raw_value(*value);
        match file_type {
            FileType::Binary => record.extend_from_slice(&little_endian::i16_bytes(raw.round() as i16)),
            FileType::Binary32 => record.extend_from_slice(&little_endian::i32_bytes(raw.round() as i32)),
            _ => record.extend_from_slice(&little_endian::f32_bytes(raw as f32)),
        }
    }

    for word in fracsec.iter().chain(words) {
        record.extend_from_slice(&little_endian::u16_bytes(*word));
    }

    Ok(record)
}
