//! Streaming reader for COMTRADE data files.
//!
//! A [`Parser`] borrows a [`Schema`] and decodes one sample per call to
//! [`Parser::read_next`], walking transparently across split data files
//! (`.dat`, `.d00`, `.d01`, ...) or reading the DAT section of a combined
//! `.cff` file.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Take};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::cff::{self, LineReader};
use crate::error::{ComtradeError, Result};
use crate::little_endian;
use crate::schema::{FileType, Schema, SignalKind};
use crate::time::Ticks;
use crate::units::{convert_angle, AngleUnit};

/// `.dat` or `.dNN`
static DATA_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\.dat|\.d\d\d)$").expect("data file pattern is valid"));

/// Binary data files may be terminated by a DOS end-of-file byte
const END_OF_FILE_MARKER: u8 = 0x1A;

/// Decoding options
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Derive timestamps from the sample number and the sample-rate table
    /// instead of the recorded microsecond offsets
    pub infer_time_from_sample_rates: bool,
    /// Shift timestamps by the schema's time code and report them as UTC
    pub adjust_to_utc: bool,
    /// Convert phase-angle channels to this unit
    pub target_angle_unit: Option<AngleUnit>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            infer_time_from_sample_rates: true,
            adjust_to_utc: true,
            target_angle_unit: None,
        }
    }
}

struct DataStream {
    path: PathBuf,
    reader: Take<BufReader<File>>,
    /// Absolute byte offset of the next unread byte
    offset: u64,
}

impl DataStream {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(DataStream {
            path: path.to_path_buf(),
            reader: BufReader::new(file).take(u64::MAX),
            offset: 0,
        })
    }

    /// Read until `buffer` is full or the stream ends
    fn read_full(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.reader.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }

    fn read_line(&mut self, buffer: &mut Vec<u8>) -> io::Result<usize> {
        buffer.clear();
        let read = self.reader.read_until(b'\n', buffer)?;
        self.offset += read as u64;
        Ok(read)
    }
}

/// Every data file belonging to the set that `file_name` starts, ordered
/// case-insensitively (`rec.dat`, `rec.d01`, `rec.d02`, ...)
pub fn data_file_set(file_name: &Path) -> Result<Vec<PathBuf>> {
    let directory = match file_name.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = file_name
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let same_set = name
            .rsplit_once('.')
            .is_some_and(|(base, _)| base.eq_ignore_ascii_case(&stem));
        if same_set && DATA_FILE_REGEX.is_match(&name) && entry.path().is_file() {
            files.push((name.to_lowercase(), entry.path()));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Data file next to the configuration file: the combined file itself,
/// else `<name>.dat`, else `<name>.d00`
pub fn default_data_file(schema: &Schema) -> Option<PathBuf> {
    let config = schema.file_name.as_ref()?;
    if schema.is_combined_file_format {
        return Some(config.clone());
    }
    [config.with_extension("dat"), config.with_extension("d00")]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Streaming record decoder bound to one schema
pub struct Parser<'a> {
    schema: &'a Schema,
    pub options: ParserOptions,
    file_name: Option<PathBuf>,
    is_combined_file_format: bool,
    binary_byte_count: u64,
    streams: Option<Vec<DataStream>>,
    stream_index: usize,
    exhausted: bool,
    initial_sample: Option<u32>,
    sample: u32,
    timestamp: Ticks,
    is_utc: bool,
    values: Vec<f64>,
    primary_values: OnceCell<Vec<f64>>,
    secondary_values: OnceCell<Vec<f64>>,
    buffer: Vec<u8>,
}

impl<'a> Parser<'a> {
    pub fn new(schema: &'a Schema) -> Result<Self> {
        Parser::with_options(schema, ParserOptions::default())
    }

    pub fn with_options(schema: &'a Schema, options: ParserOptions) -> Result<Self> {
        if schema.total_channels() == 0 {
            return Err(ComtradeError::InvalidSchema(
                "the schema defines no channels".to_string(),
            ));
        }

        Ok(Parser {
            schema,
            options,
            file_name: default_data_file(schema),
            is_combined_file_format: schema.is_combined_file_format,
            binary_byte_count: 0,
            streams: None,
            stream_index: 0,
            exhausted: false,
            initial_sample: None,
            sample: 0,
            timestamp: Ticks(0),
            is_utc: false,
            values: vec![0.0; schema.total_channels()],
            primary_values: OnceCell::new(),
            secondary_values: OnceCell::new(),
            buffer: Vec::new(),
        })
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// First data file (or the combined file) to read
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn set_file_name<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        self.is_combined_file_format = cff::has_cff_extension(path);
        self.file_name = Some(path.to_path_buf());
    }

    pub fn is_combined_file_format(&self) -> bool {
        self.is_combined_file_format
    }

    /// Byte count announced by the `DAT BINARY` separator of a combined file
    pub fn binary_byte_count(&self) -> u64 {
        self.binary_byte_count
    }

    pub fn is_open(&self) -> bool {
        self.streams.is_some()
    }

    /// Open the data file set. Split files are discovered next to the first
    /// data file; a combined file is positioned just past its DAT separator.
    pub fn open_files(&mut self) -> Result<()> {
        let file_name = self.file_name.clone().ok_or(ComtradeError::NoDataFile)?;
        if !file_name.is_file() {
            return Err(ComtradeError::FileNotFound(file_name));
        }
        self.close_files();

        let streams = if self.is_combined_file_format {
            vec![self.open_combined(&file_name)?]
        } else {
            data_file_set(&file_name)?
                .iter()
                .map(|path| DataStream::open(path))
                .collect::<Result<Vec<_>>>()?
        };

        tracing::info!(
            "Opened {} COMTRADE data file(s) starting at {} ({})",
            streams.len(),
            file_name.display(),
            if self.is_combined_file_format { "combined" } else { "split" }
        );

        self.streams = Some(streams);
        self.stream_index = 0;
        self.exhausted = false;
        self.initial_sample = None;
        Ok(())
    }

    fn open_combined(&mut self, path: &Path) -> Result<DataStream> {
        let mut lines = LineReader::new(BufReader::new(File::open(path)?));
        while let Some(line) = lines.next_line()? {
            let Some(separator) = cff::parse_section_separator(&line.text) else {
                continue;
            };
            if !separator.is_data_section() {
                continue;
            }

            self.binary_byte_count = separator.byte_count;
            let offset = lines.position();
            let limit = if separator.byte_count > 0 {
                separator.byte_count
            } else {
                u64::MAX
            };
            return Ok(DataStream {
                path: path.to_path_buf(),
                reader: lines.into_inner().take(limit),
                offset,
            });
        }
        Err(ComtradeError::MissingSection("DAT"))
    }

    /// Release every open data file
    pub fn close_files(&mut self) {
        self.streams = None;
    }

    /// Decode the next record. Returns `Ok(false)` once every data file has
    /// been consumed; calling again after that is an error.
    pub fn read_next(&mut self) -> Result<bool> {
        let stream_count = self.streams.as_ref().ok_or(ComtradeError::FilesNotOpened)?.len();
        if self.exhausted {
            return Err(ComtradeError::EndOfData);
        }

        self.primary_values = OnceCell::new();
        self.secondary_values = OnceCell::new();

        while self.stream_index < stream_count {
            let decoded = match self.schema.file_type {
                FileType::Ascii => self.read_next_ascii()?,
                file_type => self.read_next_binary(file_type)?,
            };
            if decoded {
                return Ok(true);
            }

            self.stream_index += 1;
            if self.stream_index < stream_count {
                tracing::debug!("Continuing with data file {} of {}", self.stream_index + 1, stream_count);
            }
        }

        self.exhausted = true;
        Ok(false)
    }

    fn current_stream(&mut self) -> Result<&mut DataStream> {
        self.streams
            .as_mut()
            .and_then(|streams| streams.get_mut(self.stream_index))
            .ok_or(ComtradeError::FilesNotOpened)
    }

    /// `Ok(false)` at a clean end of the current file
    fn read_next_binary(&mut self, file_type: FileType) -> Result<bool> {
        let record_length = self.schema.record_length();
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.resize(record_length, 0);

        let stream = self.current_stream()?;
        let start = stream.offset;
        let read = stream.read_full(&mut buffer)?;
        if read != record_length {
            if read == 0 || buffer[read - 1] == END_OF_FILE_MARKER {
                self.buffer = buffer;
                return Ok(false);
            }
            return Err(ComtradeError::CorruptRecord {
                path: stream.path.clone(),
                offset: start,
                expected: record_length,
                actual: read,
            });
        }

        let sample = little_endian::to_u32(&buffer, 0);
        let microseconds = little_endian::to_u32(&buffer, 4);
        self.apply_time(sample, microseconds as f64);

        let mut index = 8;
        for channel in 0..self.schema.total_analog_channels() {
            let raw = match file_type {
                FileType::Binary => little_endian::to_i16(&buffer, index) as f64,
                FileType::Binary32 => little_endian::to_i32(&buffer, index) as f64,
                _ => little_endian::to_f32(&buffer, index) as f64,
            };
            self.values[channel] = self.adjust_value(raw, channel);
            index += file_type.analog_value_size();
        }

        let mut value_index = self.schema.total_analog_channels();
        for _ in 0..self.schema.digital_words() {
            let word = little_endian::to_u16(&buffer, index);
            index += 2;
            for bit in 0..16 {
                if value_index >= self.values.len() {
                    break;
                }
                self.values[value_index] = if word & (1 << bit) != 0 { 1.0 } else { 0.0 };
                value_index += 1;
            }
        }

        self.buffer = buffer;
        Ok(true)
    }

    fn read_next_ascii(&mut self) -> Result<bool> {
        let mut buffer = std::mem::take(&mut self.buffer);
        let result = self.read_ascii_record(&mut buffer);
        self.buffer = buffer;
        result
    }

    fn read_ascii_record(&mut self, buffer: &mut Vec<u8>) -> Result<bool> {
        let line = loop {
            if self.current_stream()?.read_line(buffer)? == 0 {
                return Ok(false);
            }
            let line = String::from_utf8_lossy(buffer).trim().to_string();
            if line == "\u{1A}" {
                return Ok(false);
            }
            if !line.is_empty() {
                break line;
            }
        };

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != self.values.len() + 2 {
            return Err(ComtradeError::AsciiRecordMismatch {
                expected: self.values.len() + 2,
                actual: fields.len(),
                line,
            });
        }

        let sample: u32 = fields[0]
            .trim()
            .parse()
            .map_err(|_| ComtradeError::invalid_value("sample number", fields[0], &line))?;
        let microseconds: f64 = fields[1]
            .trim()
            .parse()
            .map_err(|_| ComtradeError::invalid_value("time stamp", fields[1], &line))?;
        self.apply_time(sample, microseconds);

        let analog_count = self.schema.total_analog_channels();
        for (i, field) in fields[2..].iter().enumerate() {
            let field = field.trim();
            self.values[i] = if i < analog_count {
                if field.is_empty() {
                    f64::NAN
                } else {
                    let raw: f64 = field
                        .parse()
                        .map_err(|_| ComtradeError::invalid_value("analog value", field, &line))?;
                    self.adjust_value(raw, i)
                }
            } else {
                field
                    .parse()
                    .map_err(|_| ComtradeError::invalid_value("digital value", field, &line))?
            };
        }

        Ok(true)
    }

    fn apply_time(&mut self, raw_sample: u32, microseconds: f64) {
        let initial = *self.initial_sample.get_or_insert(raw_sample);
        let sample = raw_sample.wrapping_sub(initial);
        self.sample = sample;

        let schema = self.schema;
        let inferred = if self.options.infer_time_from_sample_rates && schema.total_sample_rates() > 0 {
            schema
                .sample_rate_for(sample as i64)
                .filter(|rate| rate.rate > 0.0)
                .map(|rate| schema.start_time.value + Ticks::from_seconds(sample as f64 / rate.rate))
        } else {
            None
        };

        let mut timestamp = inferred.unwrap_or_else(|| {
            schema.start_time.value + Ticks::from_microseconds(microseconds * schema.time_factor)
        });
        if self.options.adjust_to_utc {
            timestamp += schema.time_code.tick_offset();
        }
        self.timestamp = timestamp;
        self.is_utc = self.options.adjust_to_utc;
    }

    fn adjust_value(&self, raw: f64, channel_index: usize) -> f64 {
        let channel = &self.schema.analog_channels[channel_index];
        let value = channel.physical_value(raw);
        match self.options.target_angle_unit {
            Some(target) if channel.signal_kind() == SignalKind::Angle => {
                convert_angle(value, channel.angle_unit(), target)
            }
            _ => value,
        }
    }

    /// Sample number of the last record, relative to the first record read
    pub fn sample(&self) -> u32 {
        self.sample
    }

    /// Absolute time of the last record
    pub fn timestamp(&self) -> Ticks {
        self.timestamp
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.timestamp.to_datetime()
    }

    /// Whether [`Parser::timestamp`] has been shifted to UTC
    pub fn is_utc(&self) -> bool {
        self.is_utc
    }

    /// Analog values in engineering units followed by digital values (0/1)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values with every secondary-scaled analog channel converted to primary
    pub fn primary_values(&self) -> &[f64] {
        self.primary_values.get_or_init(|| {
            self.rescaled(|channel| {
                (channel.scaling_identifier() == 'S')
                    .then(|| channel.primary_ratio / channel.secondary_ratio)
            })
        })
    }

    /// Values with every primary-scaled analog channel converted to secondary
    pub fn secondary_values(&self) -> &[f64] {
        self.secondary_values.get_or_init(|| {
            self.rescaled(|channel| {
                (channel.scaling_identifier() == 'P')
                    .then(|| channel.secondary_ratio / channel.primary_ratio)
            })
        })
    }

    fn rescaled<F>(&self, factor: F) -> Vec<f64>
    where
        F: Fn(&crate::schema::AnalogChannel) -> Option<f64>,
    {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                match self.schema.analog_channels.get(i).and_then(&factor) {
                    Some(factor) => value * factor,
                    None => *value,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnalogChannel, DigitalChannel, SampleRate};
    use crate::time::Timestamp;
    use std::io::Write;

    fn schema(file_type: FileType, digital_count: usize) -> Schema {
        let mut schema = Schema::new();
        schema.station_name = "Sub1".to_string();
        schema.device_id = "DeviceA".to_string();
        schema.file_type = file_type;

        let mut current = AnalogChannel::new(1999, file_type == FileType::Float32);
        current.index = 1;
        current.set_name("St1:IA");
        current.set_units("A");
        current.set_phase_id("Am");
        current.multiplier = 0.5;
        current.adder = 1.0;
        current.primary_ratio = 4.0;
        current.secondary_ratio = 2.0;
        schema.analog_channels.push(current);

        let mut angle = AnalogChannel::new(1999, file_type == FileType::Float32);
        angle.index = 2;
        angle.set_name("St1:IAang");
        angle.set_units("Degrees");
        angle.set_phase_id("Aa");
        angle.multiplier = 1.0;
        angle.adder = 0.0;
        angle.set_scaling_identifier('S').unwrap();
        angle.primary_ratio = 10.0;
        angle.secondary_ratio = 2.0;
        schema.analog_channels.push(angle);

        for i in 0..digital_count {
            let mut digital = DigitalChannel::new(1999);
            digital.index = i + 1;
            digital.set_name(&format!("D{}", i + 1));
            schema.digital_channels.push(digital);
        }

        schema.set_sample_rates(vec![SampleRate::new(1000.0, 10)]);
        schema.start_time = Timestamp::parse("01/01/2024,00:00:00.000000").unwrap();
        schema.trigger_time = schema.start_time;
        schema
    }

    fn binary_record(sample: u32, micros: u32, analog: &[i16], words: &[u16]) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(&little_endian::u32_bytes(sample));
        record.extend_from_slice(&little_endian::u32_bytes(micros));
        for value in analog {
            record.extend_from_slice(&little_endian::i16_bytes(*value));
        }
        for word in words {
            record.extend_from_slice(&little_endian::u16_bytes(*word));
        }
        record
    }

    fn write_file(path: &Path, content: &[u8]) {
        let mut file = File::create(path).unwrap();
        file.write_all(content).unwrap();
    }

    #[test]
    fn test_read_binary_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = schema(FileType::Binary, 17);
        schema.file_name = Some(dir.path().join("rec.cfg"));

        let mut data = binary_record(1, 0, &[10, 90], &[0b101, 0x0001]);
        data.extend(binary_record(2, 1000, &[-4, 45], &[0, 0]));
        write_file(&dir.path().join("rec.dat"), &data);

        let mut parser = Parser::new(&schema).unwrap();
        assert_eq!(parser.file_name(), Some(dir.path().join("rec.dat").as_path()));
        parser.open_files().unwrap();

        assert!(parser.read_next().unwrap());
        assert_eq!(parser.sample(), 0);
        assert_eq!(parser.values()[0], 6.0);
        assert_eq!(parser.values()[1], 90.0);
        assert_eq!(&parser.values()[2..5], &[1.0, 0.0, 1.0]);
        assert_eq!(parser.values()[18], 1.0);
        assert_eq!(parser.values().len(), 19);

        assert!(parser.read_next().unwrap());
        assert_eq!(parser.sample(), 1);
        assert_eq!(parser.values()[0], -1.0);
        assert_eq!(parser.timestamp() - schema.start_time.value, Ticks(Ticks::PER_MILLISECOND));

        assert!(!parser.read_next().unwrap());
        assert!(matches!(parser.read_next(), Err(ComtradeError::EndOfData)));
    }

    #[test]
    fn test_read_binary32_and_float32() {
        let dir = tempfile::tempdir().unwrap();
        for file_type in [FileType::Binary32, FileType::Float32] {
            let schema = schema(file_type, 0);
            let path = dir.path().join(format!("{}.dat", file_type));
            let mut record = Vec::new();
            record.extend_from_slice(&little_endian::u32_bytes(0));
            record.extend_from_slice(&little_endian::u32_bytes(0));
            if file_type == FileType::Binary32 {
                record.extend_from_slice(&little_endian::i32_bytes(100_000));
                record.extend_from_slice(&little_endian::i32_bytes(-30));
            } else {
                record.extend_from_slice(&little_endian::f32_bytes(100_000.0));
                record.extend_from_slice(&little_endian::f32_bytes(-30.0));
            }
            write_file(&path, &record);

            let mut parser = Parser::new(&schema).unwrap();
            parser.set_file_name(&path);
            parser.open_files().unwrap();
            assert!(parser.read_next().unwrap());
            assert_eq!(parser.values(), &[50_001.0, -30.0]);
            assert!(!parser.read_next().unwrap());
        }
    }

    #[test]
    fn test_end_of_file_marker_and_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Binary, 0);

        let path = dir.path().join("marker.dat");
        let mut data = binary_record(0, 0, &[0, 0], &[]);
        data.push(END_OF_FILE_MARKER);
        write_file(&path, &data);
        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        assert!(parser.read_next().unwrap());
        assert!(!parser.read_next().unwrap());

        let path = dir.path().join("corrupt.dat");
        let mut data = binary_record(0, 0, &[0, 0], &[]);
        data.extend_from_slice(&[1, 2, 3]);
        write_file(&path, &data);
        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        assert!(parser.read_next().unwrap());
        match parser.read_next() {
            Err(ComtradeError::CorruptRecord { offset, expected, actual, .. }) => {
                assert_eq!(offset, 12);
                assert_eq!(expected, 12);
                assert_eq!(actual, 3);
            }
            other => panic!("expected CorruptRecord, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_split_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Binary, 0);
        write_file(&dir.path().join("rec.D01"), &binary_record(3, 0, &[2, 0], &[]));
        write_file(&dir.path().join("rec.d00"), &binary_record(1, 0, &[0, 0], &[]));
        write_file(&dir.path().join("rec.d02"), &binary_record(4, 0, &[4, 0], &[]));
        write_file(&dir.path().join("rec.cfg"), b"ignored");
        write_file(&dir.path().join("other.d03"), &binary_record(9, 0, &[9, 0], &[]));

        let files = data_file_set(&dir.path().join("rec.d00")).unwrap();
        assert_eq!(files.len(), 3);

        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(dir.path().join("rec.d00"));
        parser.open_files().unwrap();

        let mut samples = Vec::new();
        while parser.read_next().unwrap() {
            samples.push((parser.sample(), parser.values()[0]));
        }
        assert_eq!(samples, vec![(0, 1.0), (2, 2.0), (3, 3.0)]);
    }

    #[test]
    fn test_ascii_split_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Ascii, 1);
        write_file(&dir.path().join("rec.d00"), b"5,0,10,90,1\r\n6,1000,12,90,0\r\n\x1A");
        write_file(&dir.path().join("rec.d01"), b"7,2000,14,45,1\r\n\r\n");
        write_file(&dir.path().join("rec.d02"), b"8,3000,16,0,0\r\n");

        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(dir.path().join("rec.d00"));
        parser.open_files().unwrap();

        let mut samples = Vec::new();
        while parser.read_next().unwrap() {
            samples.push((parser.sample(), parser.values()[0], parser.values()[2]));
        }
        assert_eq!(
            samples,
            vec![(0, 6.0, 1.0), (1, 7.0, 0.0), (2, 8.0, 1.0), (3, 9.0, 0.0)]
        );
        assert!(matches!(parser.read_next(), Err(ComtradeError::EndOfData)));
    }

    #[test]
    fn test_read_ascii_records() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Ascii, 2);
        let path = dir.path().join("rec.dat");
        write_file(&path, b"1,0,10,90,1,0\r\n\r\n2,1000,,45,0,1\r\n\x1A\r\n");

        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();

        assert!(parser.read_next().unwrap());
        assert_eq!(parser.values(), &[6.0, 90.0, 1.0, 0.0]);
        assert!(parser.read_next().unwrap());
        assert!(parser.values()[0].is_nan());
        assert_eq!(&parser.values()[1..], &[45.0, 0.0, 1.0]);
        assert!(!parser.read_next().unwrap());
    }

    #[test]
    fn test_ascii_field_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Ascii, 0);
        let path = dir.path().join("rec.dat");
        write_file(&path, b"1,0,10\r\n");

        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        assert!(matches!(
            parser.read_next(),
            Err(ComtradeError::AsciiRecordMismatch { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_timestamp_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = schema(FileType::Ascii, 0);
        schema.time_factor = 2.0;
        schema.time_code = crate::time::TimeOffset::new(1, 0).unwrap();
        let path = dir.path().join("rec.dat");
        write_file(&path, b"5,0,0,0\r\n8,500,0,0\r\n");
        let start = schema.start_time.value;

        {
            let mut parser = Parser::new(&schema).unwrap();
            parser.set_file_name(&path);
            parser.open_files().unwrap();
            parser.read_next().unwrap();
            parser.read_next().unwrap();
            assert_eq!(parser.sample(), 3);
            assert_eq!(parser.timestamp(), start + Ticks(3 * Ticks::PER_MILLISECOND + Ticks::PER_HOUR));
            assert!(parser.is_utc());

            let options = ParserOptions {
                infer_time_from_sample_rates: false,
                adjust_to_utc: false,
                target_angle_unit: None,
            };
            let mut parser = Parser::with_options(&schema, options).unwrap();
            parser.set_file_name(&path);
            parser.open_files().unwrap();
            parser.read_next().unwrap();
            parser.read_next().unwrap();
            assert_eq!(parser.timestamp(), start + Ticks(Ticks::PER_MILLISECOND));
            assert!(!parser.is_utc());
        }

        schema.set_sample_rates(Vec::new());
        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        parser.read_next().unwrap();
        parser.read_next().unwrap();
        assert_eq!(parser.timestamp(), start + Ticks(Ticks::PER_MILLISECOND + Ticks::PER_HOUR));
    }

    #[test]
    fn test_target_angle_unit() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Ascii, 0);
        let path = dir.path().join("rec.dat");
        write_file(&path, b"0,0,0,180\r\n");

        let options = ParserOptions {
            target_angle_unit: Some(AngleUnit::Radians),
            ..ParserOptions::default()
        };
        let mut parser = Parser::with_options(&schema, options).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        parser.read_next().unwrap();
        assert_eq!(parser.values()[0], 1.0);
        assert!(
            (parser.values()[1] - std::f64::consts::PI).abs() < 1e-12,
            "180 degrees should become pi radians, got {}",
            parser.values()[1]
        );
    }

    #[test]
    fn test_primary_and_secondary_values() {
        let dir = tempfile::tempdir().unwrap();
        let schema = schema(FileType::Ascii, 1);
        let path = dir.path().join("rec.dat");
        write_file(&path, b"0,0,4,10,1\r\n");

        let mut parser = Parser::new(&schema).unwrap();
        parser.set_file_name(&path);
        parser.open_files().unwrap();
        parser.read_next().unwrap();

        // IA is primary-scaled (4:2), IAang secondary-scaled (10:2)
        assert_eq!(parser.values(), &[3.0, 10.0, 1.0]);
        assert_eq!(parser.primary_values(), &[3.0, 50.0, 1.0]);
        assert_eq!(parser.secondary_values(), &[1.5, 10.0, 1.0]);
    }

    #[test]
    fn test_state_misuse() {
        let schema = schema(FileType::Binary, 0);
        let mut parser = Parser::new(&schema).unwrap();
        assert!(matches!(parser.read_next(), Err(ComtradeError::FilesNotOpened)));
        assert!(matches!(parser.open_files(), Err(ComtradeError::NoDataFile)));

        parser.set_file_name("/nonexistent/rec.dat");
        assert!(matches!(parser.open_files(), Err(ComtradeError::FileNotFound(_))));

        let empty = Schema::new();
        assert!(matches!(Parser::new(&empty), Err(ComtradeError::InvalidSchema(_))));
    }

    #[test]
    fn test_combined_file_bounded_by_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = schema(FileType::Binary, 0);
        let path = dir.path().join("rec.cff");

        let record = binary_record(0, 0, &[8, 1], &[]);
        let mut content = Vec::new();
        content.extend_from_slice(b"--- file type: CFG ---\r\ncfg\r\n--- file type: INF ---\r\n--- file type: HDR ---\r\n");
        content.extend_from_slice(format!("--- file type: DAT BINARY: {} ---\r\n", record.len()).as_bytes());
        content.extend_from_slice(&record);
        content.extend_from_slice(b"trailing bytes outside the data section");
        write_file(&path, &content);

        schema.file_name = Some(path.clone());
        schema.is_combined_file_format = true;
        let mut parser = Parser::new(&schema).unwrap();
        assert!(parser.is_combined_file_format());
        parser.open_files().unwrap();
        assert_eq!(parser.binary_byte_count(), 12);
        assert!(parser.read_next().unwrap());
        assert_eq!(parser.values(), &[5.0, 1.0]);
        assert!(!parser.read_next().unwrap());
    }
}
