//! Combined file creation and in-place patching.
//!
//! A binary combined file is written before the size of its data section is
//! known, so the `DAT BINARY` separator reserves a fixed-width byte count that
//! [`update_cff_stream_binary_byte_count`] fills in once the records are
//! written. [`update_stream_end_sample`] does the same for the end sample of
//! a sample rate line.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::{CRLF, MAX_END_SAMPLE, MAX_FILE_SIZE};
use crate::cff::{
    has_cff_extension, parse_section_separator, separator_line, Line, LineReader, CFG_SECTION,
    DAT_ASCII_SECTION, DAT_BINARY_SECTION, HDR_SECTION, INF_SECTION,
};
use crate::error::{ComtradeError, Result};
use crate::schema::configuration::strip_count_suffix;
use crate::schema::types::parse_integer;
use crate::schema::{FileType, SampleRate, Schema, VERSION_2013};

/// Zeros reserved for the byte count, as wide as [`MAX_FILE_SIZE`]
fn byte_count_placeholder() -> String {
    "0".repeat(MAX_FILE_SIZE.to_string().len())
}

/// Create a `.cff` file holding the schema, INF and HDR sections and the
/// DAT separator. The returned file is positioned for the first record and
/// is also readable, so it can be patched afterwards.
pub fn create_cff_file<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    inf_lines: &[&str],
    hdr_lines: &[&str],
) -> Result<File> {
    let path = path.as_ref();
    if !has_cff_extension(path) {
        return Err(ComtradeError::NotCombinedFile(path.to_path_buf()));
    }
    check_version(schema)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    create_cff_stream(&mut file, schema, inf_lines, hdr_lines)?;

    tracing::info!(
        "Created combined file {} ({}, {} channels)",
        path.display(),
        schema.file_type,
        schema.total_channels()
    );
    Ok(file)
}

/// Text variant of [`create_cff_file`] for ASCII schemas
pub fn create_cff_file_ascii<P: AsRef<Path>>(
    path: P,
    schema: &Schema,
    inf_lines: &[&str],
    hdr_lines: &[&str],
) -> Result<BufWriter<File>> {
    check_ascii(schema)?;
    let file = create_cff_file(path, schema, inf_lines, hdr_lines)?;
    Ok(BufWriter::new(file))
}

/// Write the combined file preamble to a caller-owned stream
pub fn create_cff_stream<W: Write>(
    output: &mut W,
    schema: &Schema,
    inf_lines: &[&str],
    hdr_lines: &[&str],
) -> Result<()> {
    check_version(schema)?;

    let mut preamble = String::new();
    preamble.push_str(&separator_line(CFG_SECTION));
    preamble.push_str(CRLF);
    preamble.push_str(&schema.file_content());

    preamble.push_str(&separator_line(INF_SECTION));
    preamble.push_str(CRLF);
    for line in inf_lines {
        preamble.push_str(line);
        preamble.push_str(CRLF);
    }

    preamble.push_str(&separator_line(HDR_SECTION));
    preamble.push_str(CRLF);
    for line in hdr_lines {
        preamble.push_str(line);
        preamble.push_str(CRLF);
    }

    let data_section = match schema.file_type {
        FileType::Ascii => DAT_ASCII_SECTION.to_string(),
        _ => format!("{}: {}", DAT_BINARY_SECTION, byte_count_placeholder()),
    };
    preamble.push_str(&separator_line(&data_section));
    preamble.push_str(CRLF);

    output.write_all(preamble.as_bytes())?;
    output.flush()?;
    Ok(())
}

pub fn create_cff_stream_ascii<W: Write>(
    output: &mut W,
    schema: &Schema,
    inf_lines: &[&str],
    hdr_lines: &[&str],
) -> Result<()> {
    check_ascii(schema)?;
    create_cff_stream(output, schema, inf_lines, hdr_lines)
}

fn check_version(schema: &Schema) -> Result<()> {
    if schema.version < VERSION_2013 {
        return Err(ComtradeError::UnsupportedVersion {
            version: schema.version,
            minimum: VERSION_2013,
        });
    }
    Ok(())
}

fn check_ascii(schema: &Schema) -> Result<()> {
    if schema.file_type != FileType::Ascii {
        return Err(ComtradeError::FileTypeMismatch {
            attempted: FileType::Ascii,
            declared: schema.file_type,
        });
    }
    Ok(())
}

/// Fill in the byte count of the `DAT BINARY` separator. The field keeps
/// its reserved width, so nothing after it moves.
pub fn update_cff_stream_binary_byte_count<S: Read + Write + Seek>(stream: &mut S, byte_count: u64) -> Result<()> {
    if byte_count > MAX_FILE_SIZE {
        return Err(ComtradeError::ByteCountOutOfRange(byte_count));
    }

    stream.seek(SeekFrom::Start(0))?;
    let separator_start = {
        let mut lines = LineReader::new(BufReader::new(&mut *stream));
        let mut found = None;
        while let Some(line) = lines.next_line()? {
            if parse_section_separator(&line.text)
                .is_some_and(|separator| separator.section_type == DAT_BINARY_SECTION)
            {
                found = Some(line.start);
                break;
            }
        }
        found.ok_or(ComtradeError::MissingSection(DAT_BINARY_SECTION))?
    };

    let prefix = format!("--- file type: {}: ", DAT_BINARY_SECTION);
    let width = byte_count_placeholder().len() + " ---".len();
    let field = format!("{:<width$}", format!("{} ---", byte_count), width = width);

    stream.seek(SeekFrom::Start(separator_start + prefix.len() as u64))?;
    stream.write_all(field.as_bytes())?;
    stream.flush()?;

    tracing::debug!("Patched DAT BINARY byte count to {}", byte_count);
    Ok(())
}

/// Rewrite the end sample of sample rate line `rate_index`.
///
/// The configuration is walked from the top, so `is_combined` must say
/// whether it opens with a CFG separator. The new line is padded to the old
/// width; when it is wider, everything after it is shifted.
pub fn update_stream_end_sample<S: Read + Write + Seek>(
    stream: &mut S,
    end_sample: i64,
    is_combined: bool,
    rate_index: usize,
) -> Result<()> {
    if end_sample > MAX_END_SAMPLE {
        return Err(ComtradeError::EndSampleOutOfRange(end_sample));
    }

    stream.seek(SeekFrom::Start(0))?;
    let rate_line = {
        let mut lines = ConfigWalker::new(BufReader::new(&mut *stream));
        locate_rate_line(&mut lines, is_combined, rate_index)?
    };

    let mut sample_rate = SampleRate::parse(&rate_line.text, false)?;
    sample_rate.end_sample = end_sample;
    let text = format!("{:<width$}", sample_rate.to_string(), width = rate_line.text.len());

    let tail_start = rate_line.start + rate_line.text.len() as u64;
    stream.seek(SeekFrom::Start(tail_start))?;
    let mut tail = Vec::new();
    stream.read_to_end(&mut tail)?;

    stream.seek(SeekFrom::Start(rate_line.start))?;
    stream.write_all(text.as_bytes())?;
    stream.write_all(&tail)?;
    stream.flush()?;

    tracing::debug!("Patched end sample of sample rate {} to {}", rate_index, end_sample);
    Ok(())
}

/// Configuration line reader that reports where the configuration ended
struct ConfigWalker<R> {
    lines: LineReader<R>,
    line_number: usize,
}

impl<R: std::io::BufRead> ConfigWalker<R> {
    fn new(reader: R) -> Self {
        ConfigWalker {
            lines: LineReader::new(reader),
            line_number: 0,
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<Line> {
        self.line_number += 1;
        self.lines
            .next_line()?
            .ok_or(ComtradeError::UnexpectedEndOfConfiguration {
                line_number: self.line_number,
                expected,
            })
    }

    fn skip(&mut self, count: usize, expected: &'static str) -> Result<()> {
        for _ in 0..count {
            self.next(expected)?;
        }
        Ok(())
    }
}

fn locate_rate_line<R: std::io::BufRead>(
    lines: &mut ConfigWalker<R>,
    is_combined: bool,
    rate_index: usize,
) -> Result<Line> {
    if is_combined {
        let first = lines.next("CFG section separator")?;
        let is_cfg = parse_section_separator(&first.text)
            .is_some_and(|separator| separator.section_type == CFG_SECTION);
        if !is_cfg {
            return Err(ComtradeError::UnexpectedSeparator {
                expected: "--- file type: CFG ---",
                found: first.text,
            });
        }
    }

    lines.next("station line")?;

    let counts = lines.next("channel count line")?;
    let parts: Vec<&str> = counts.text.split(',').collect();
    if parts.len() < 3 {
        return Err(ComtradeError::FieldCount {
            what: "channel count line",
            expected: "3".to_string(),
            actual: parts.len(),
            line: counts.text.clone(),
        });
    }
    let analog_count: usize = parse_integer("analog channel count", strip_count_suffix(parts[1], 'A'), &counts.text)?;
    let digital_count: usize =
        parse_integer("digital channel count", strip_count_suffix(parts[2], 'D'), &counts.text)?;

    lines.skip(analog_count, "analog channel line")?;
    lines.skip(digital_count, "digital channel line")?;
    lines.next("line frequency")?;

    let rate_count_line = lines.next("sample rate count")?;
    let rate_count: usize = parse_integer("sample rate count", &rate_count_line.text, &rate_count_line.text)?;
    // Zero declares a single unspecified rate
    let available = rate_count.max(1);
    if rate_index >= available {
        return Err(ComtradeError::RateIndexOutOfRange {
            index: rate_index,
            available,
        });
    }

    lines.skip(rate_index, "sample rate line")?;
    lines.next("sample rate line")
}
