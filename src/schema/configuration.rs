use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::analog::AnalogChannel;
use super::digital::DigitalChannel;
use super::sample_rate::SampleRate;
use super::types::{
    format_number, parse_integer, parse_number, FieldCount, FileType, LeapSecondIndicator,
    TimeQualityIndicatorCode, VERSION_1991, VERSION_1999, VERSION_2013,
};
use crate::cff::{self, LineReader};
use crate::error::{ComtradeError, Result};
use crate::time::{TimeOffset, Timestamp};

pub const CRLF: &str = "\r\n";

/// Parsed COMTRADE configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schema {
    /// Configuration file this schema was loaded from
    pub file_name: Option<PathBuf>,
    /// Whether the configuration lives in the CFG section of a `.cff` file
    pub is_combined_file_format: bool,
    pub station_name: String,
    pub device_id: String,
    pub version: u16,
    pub analog_channels: Vec<AnalogChannel>,
    pub digital_channels: Vec<DigitalChannel>,
    nominal_frequency: f64,
    sample_rates: Vec<SampleRate>,
    pub start_time: Timestamp,
    pub trigger_time: Timestamp,
    pub file_type: FileType,
    /// Multiplier for the microsecond time stamps of the data records
    pub time_factor: f64,
    /// Offset of the recorded time stamps from UTC
    pub time_code: TimeOffset,
    /// Offset of the recorder's local time zone from UTC
    pub local_code: TimeOffset,
    pub time_quality_indicator_code: TimeQualityIndicatorCode,
    pub leap_second_indicator: LeapSecondIndicator,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            file_name: None,
            is_combined_file_format: false,
            station_name: String::new(),
            device_id: String::new(),
            version: VERSION_1999,
            analog_channels: Vec::new(),
            digital_channels: Vec::new(),
            nominal_frequency: 60.0,
            sample_rates: vec![SampleRate::placeholder()],
            start_time: Timestamp::default(),
            trigger_time: Timestamp::default(),
            file_type: FileType::Binary,
            time_factor: 1.0,
            time_code: TimeOffset::default(),
            local_code: TimeOffset::not_applicable(),
            time_quality_indicator_code: TimeQualityIndicatorCode::Locked,
            leap_second_indicator: LeapSecondIndicator::NoLeapSecondAdjustment,
        }
    }
}

/// Sequential access to configuration lines with line-numbered errors
struct ConfigLines<'a> {
    lines: &'a [&'a str],
    next: usize,
}

impl<'a> ConfigLines<'a> {
    fn next(&mut self, expected: &'static str) -> Result<&'a str> {
        let line = self
            .lines
            .get(self.next)
            .copied()
            .ok_or(ComtradeError::UnexpectedEndOfConfiguration {
                line_number: self.next + 1,
                expected,
            })?;
        self.next += 1;
        Ok(line)
    }

    fn next_optional(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.next).copied()?;
        self.next += 1;
        Some(line)
    }
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Load a `.cfg` file, or the CFG section of a `.cff` file
    pub fn from_file<P: AsRef<Path>>(path: P, relaxed: bool) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ComtradeError::FileNotFound(path.to_path_buf()));
        }

        let combined = cff::has_cff_extension(path);
        let lines = if combined {
            let mut reader = LineReader::new(BufReader::new(File::open(path)?));
            cff::read_cfg_section(&mut reader)?
        } else {
            let bytes = fs::read(path)?;
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect()
        };

        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut schema = Schema::parse_lines(&lines, relaxed)?;
        schema.file_name = Some(path.to_path_buf());
        schema.is_combined_file_format = combined;
        Ok(schema)
    }

    /// Parse configuration text (without any combined-file separators)
    pub fn parse(text: &str, relaxed: bool) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        Schema::parse_lines(&lines, relaxed)
    }

    fn parse_lines(lines: &[&str], relaxed: bool) -> Result<Self> {
        let mut end = lines.len();
        while end > 0 && lines[end - 1].trim().is_empty() {
            end -= 1;
        }
        let mut lines = ConfigLines {
            lines: &lines[..end],
            next: 0,
        };
        let mut schema = Schema::default();

        // station_name,rec_dev_id[,rev_year]
        let line = lines.next("station line")?;
        let parts: Vec<&str> = line.split(',').collect();
        FieldCount { min: 2, max: 3 }.check("station line", line, parts.len(), relaxed)?;
        schema.station_name = parts[0].trim().to_string();
        schema.device_id = parts[1].trim().to_string();
        schema.version = match parts.get(2).map(|p| p.trim()) {
            Some(version) if !version.is_empty() => parse_integer("format version", version, line)?,
            _ => VERSION_1991,
        };

        // TT,##A,##D
        let line = lines.next("channel count line")?;
        let parts: Vec<&str> = line.split(',').collect();
        FieldCount { min: 3, max: 3 }.check("channel count line", line, parts.len(), relaxed)?;
        let total: usize = parse_integer("total channel count", parts[0], line)?;
        let analog_count: usize = parse_integer("analog channel count", strip_count_suffix(parts[1], 'A'), line)?;
        let digital_count: usize =
            parse_integer("digital channel count", strip_count_suffix(parts[2], 'D'), line)?;
        if total != analog_count + digital_count {
            return Err(ComtradeError::ChannelCountMismatch(line.to_string()));
        }

        // Analog lines wait until the file type is known
        let mut analog_lines = Vec::with_capacity(analog_count);
        for _ in 0..analog_count {
            analog_lines.push(lines.next("analog channel line")?);
        }

        for _ in 0..digital_count {
            let line = lines.next("digital channel line")?;
            schema
                .digital_channels
                .push(DigitalChannel::parse(line, schema.version, relaxed)?);
        }

        let line = lines.next("nominal frequency line")?;
        let nominal_frequency = parse_number("nominal frequency", line, line)?;

        let line = lines.next("sample rate count line")?;
        let declared_rates: usize = parse_integer("sample rate count", line, line)?;
        let mut sample_rates = Vec::with_capacity(declared_rates.max(1));
        for _ in 0..declared_rates.max(1) {
            sample_rates.push(SampleRate::parse(lines.next("sample rate line")?, relaxed)?);
        }
        schema.set_sample_rates(sample_rates);

        schema.start_time = Timestamp::parse(lines.next("start time line")?)?;
        schema.trigger_time = Timestamp::parse(lines.next("trigger time line")?)?;

        let line = lines.next("file type line")?;
        schema.file_type =
            FileType::from_str(line.trim()).map_err(|_| ComtradeError::invalid_value("file type", line.trim(), line))?;

        let target_floating_point = schema.file_type.is_floating_point();
        // Parsed adders stand, so the nominal frequency is stored without the cascade
        schema.nominal_frequency = nominal_frequency;
        for line in analog_lines {
            let mut channel = AnalogChannel::parse(line, schema.version, target_floating_point, relaxed)?;
            channel.store_nominal_frequency(nominal_frequency);
            schema.analog_channels.push(channel);
        }

        if let Some(line) = lines.next_optional() {
            schema.time_factor = parse_number("time factor", line, line)?;
        }

        if let Some(line) = lines.next_optional() {
            let parts: Vec<&str> = line.split(',').collect();
            schema.time_code = parse_offset(parts[0], line, relaxed)?;
            if let Some(local_code) = parts.get(1) {
                schema.local_code = parse_offset(local_code, line, relaxed)?;
            }
        }

        if let Some(line) = lines.next_optional() {
            let parts: Vec<&str> = line.split(',').collect();
            schema.time_quality_indicator_code = parse_time_quality(parts[0], line, relaxed)?;
            if let Some(leap_second) = parts.get(1) {
                schema.leap_second_indicator = parse_leap_second(leap_second, line, relaxed)?;
            }
        }

        tracing::info!(
            "Parsed COMTRADE {} configuration for {}/{}: {} analog, {} digital channels, {} data",
            schema.version,
            schema.station_name,
            schema.device_id,
            schema.total_analog_channels(),
            schema.total_digital_channels(),
            schema.file_type
        );

        Ok(schema)
    }

    pub fn total_channels(&self) -> usize {
        self.total_analog_channels() + self.total_digital_channels()
    }

    pub fn total_analog_channels(&self) -> usize {
        self.analog_channels.len()
    }

    pub fn total_digital_channels(&self) -> usize {
        self.digital_channels.len()
    }

    pub fn nominal_frequency(&self) -> f64 {
        self.nominal_frequency
    }

    /// Set the line frequency, cascading it to every analog channel
    pub fn set_nominal_frequency(&mut self, frequency: f64) {
        self.nominal_frequency = frequency;
        for channel in &mut self.analog_channels {
            channel.set_nominal_frequency(frequency);
        }
    }

    pub fn sample_rates(&self) -> &[SampleRate] {
        &self.sample_rates
    }

    /// Replace the sample rate table; an empty table becomes the placeholder
    pub fn set_sample_rates(&mut self, sample_rates: Vec<SampleRate>) {
        self.sample_rates = if sample_rates.is_empty() {
            vec![SampleRate::placeholder()]
        } else {
            sample_rates
        };
    }

    pub(crate) fn sample_rates_mut(&mut self) -> &mut [SampleRate] {
        &mut self.sample_rates
    }

    /// Number of declared rates; the placeholder counts as none
    pub fn total_sample_rates(&self) -> usize {
        match self.sample_rates.as_slice() {
            [only] if only.rate == 0.0 => 0,
            rates => rates.len(),
        }
    }

    pub fn total_samples(&self) -> i64 {
        self.sample_rates
            .iter()
            .map(|rate| rate.end_sample)
            .max()
            .unwrap_or(0)
    }

    pub fn total_channel_values(&self) -> i64 {
        self.total_channels() as i64 * self.total_samples()
    }

    /// Rate region covering `sample`: the first whose end sample is not
    /// below it, or the final region for samples past the declared end
    pub fn sample_rate_for(&self, sample: i64) -> Option<&SampleRate> {
        self.sample_rates
            .iter()
            .find(|rate| sample <= rate.end_sample)
            .or_else(|| self.sample_rates.last())
    }

    /// 16-bit words needed to pack the digital channels
    pub fn digital_words(&self) -> usize {
        self.digital_channels.len().div_ceil(16)
    }

    pub fn binary_record_length(&self) -> usize {
        8 + 2 * self.total_analog_channels() + 2 * self.digital_words()
    }

    pub fn binary32_record_length(&self) -> usize {
        8 + 4 * self.total_analog_channels() + 2 * self.digital_words()
    }

    pub fn float32_record_length(&self) -> usize {
        8 + 4 * self.total_analog_channels() + 2 * self.digital_words()
    }

    /// Record length for the declared file type; zero for ASCII
    pub fn record_length(&self) -> usize {
        match self.file_type {
            FileType::Ascii => 0,
            FileType::Binary => self.binary_record_length(),
            FileType::Binary32 => self.binary32_record_length(),
            FileType::Float32 => self.float32_record_length(),
        }
    }

    /// The configuration as it would be written to a `.cfg` file, with
    /// CRLF line endings and version-gated lines omitted
    pub fn file_content(&self) -> String {
        let mut content = String::new();
        let mut push = |line: &str| {
            content.push_str(line);
            content.push_str(CRLF);
        };

        if self.version >= VERSION_1999 {
            push(&format!("{},{},{}", self.station_name, self.device_id, self.version));
        } else {
            push(&format!("{},{}", self.station_name, self.device_id));
        }
        push(&format!(
            "{},{}A,{}D",
            self.total_channels(),
            self.total_analog_channels(),
            self.total_digital_channels()
        ));

        for channel in &self.analog_channels {
            push(&channel.to_string());
        }
        for channel in &self.digital_channels {
            push(&channel.to_string());
        }

        push(&format_number(self.nominal_frequency));
        let total_sample_rates = self.total_sample_rates();
        push(&total_sample_rates.to_string());
        for rate in self.sample_rates.iter().take(total_sample_rates.max(1)) {
            push(&rate.to_string());
        }

        push(&self.start_time.to_string());
        push(&self.trigger_time.to_string());
        push(self.file_type.as_ref());

        if self.version >= VERSION_1999 {
            push(&format_number(self.time_factor));
        }
        if self.version >= VERSION_2013 {
            push(&format!("{},{}", self.time_code, self.local_code));
            push(&format!(
                "{:X},{}",
                self.time_quality_indicator_code as u8, self.leap_second_indicator as u8
            ));
        }

        content
    }
}

/// `12A` -> `12`
pub(crate) fn strip_count_suffix(field: &str, suffix: char) -> &str {
    let field = field.trim();
    field
        .split(|c: char| c.eq_ignore_ascii_case(&suffix))
        .next()
        .unwrap_or(field)
}

fn parse_offset(token: &str, line: &str, relaxed: bool) -> Result<TimeOffset> {
    let token = token.trim();
    if relaxed {
        if let Some(stripped) = token.strip_suffix('t') {
            tracing::warn!("Ignoring trailing 't' on UTC offset \"{}\"", token);
            return TimeOffset::parse(stripped).map_err(|_| ComtradeError::invalid_value("UTC offset", token, line));
        }
    }
    TimeOffset::parse(token).map_err(|_| ComtradeError::invalid_value("UTC offset", token, line))
}

fn parse_time_quality(token: &str, line: &str, relaxed: bool) -> Result<TimeQualityIndicatorCode> {
    let token = token.trim();
    let code = u8::from_str_radix(token, 16).map_err(|_| ComtradeError::invalid_value("time quality code", token, line))?;
    match TimeQualityIndicatorCode::try_from(code) {
        Ok(code) => Ok(code),
        Err(code) if relaxed => {
            tracing::warn!("Unknown time quality indicator code {:X}, assuming locked", code);
            Ok(TimeQualityIndicatorCode::Locked)
        }
        Err(_) => Err(ComtradeError::invalid_value("time quality code", token, line)),
    }
}

fn parse_leap_second(token: &str, line: &str, relaxed: bool) -> Result<LeapSecondIndicator> {
    let token = token.trim();
    let value: u8 = parse_integer("leap second indicator", token, line)?;
    match LeapSecondIndicator::try_from(value) {
        Ok(indicator) => Ok(indicator),
        Err(value) if relaxed => {
            tracing::warn!("Unknown leap second indicator {}, assuming no adjustment", value);
            Ok(LeapSecondIndicator::NoLeapSecondAdjustment)
        }
        Err(_) => Err(ComtradeError::invalid_value("leap second indicator", token, line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SignalKind;
    use crate::time::Ticks;
    use std::io::Write;

    const SAMPLE_2013: &str = "Sub1,DeviceA,2013\r
3,2A,1D\r
1,St1:IA,Am,,A,0.05,0,0,-99999,99998,1,1,P\r
2,St1:FREQ,F,,Hz,0.001,60,0,-99999,99998,1,1,P\r
1,St1:TRIP,,,0\r
60\r
1\r
1000,10\r
05/03/2024,13:45:10.000000\r
05/03/2024,13:45:10.000000\r
BINARY\r
1\r
-5h00,x\r
A,1\r
";

    const SAMPLE_1991: &str = "Old,Rec\r
1,1A,0D\r
1,VA,Am,,kV,0.1,0,0,-32767,32767\r
50\r
1\r
4000,400\r
01/01/2000,00:00:00.000000\r
01/01/2000,00:00:00.100000\r
ASCII\r
";

    #[test]
    fn test_parse_2013_configuration() {
        let schema = Schema::parse(SAMPLE_2013, false).unwrap();
        assert_eq!(schema.station_name, "Sub1");
        assert_eq!(schema.device_id, "DeviceA");
        assert_eq!(schema.version, 2013);
        assert_eq!(schema.total_channels(), 3);
        assert_eq!(schema.analog_channels[1].signal_kind(), SignalKind::Frequency);
        assert_eq!(schema.digital_channels[0].name(), "St1:TRIP");
        assert_eq!(schema.nominal_frequency(), 60.0);
        assert_eq!(schema.sample_rates(), &[SampleRate::new(1000.0, 10)]);
        assert_eq!(schema.file_type, FileType::Binary);
        assert_eq!(schema.time_code.hours(), -5);
        assert!(schema.local_code.not_applicable);
        assert_eq!(
            schema.time_quality_indicator_code,
            TimeQualityIndicatorCode::Unlocked1Second
        );
        assert_eq!(schema.leap_second_indicator, LeapSecondIndicator::LeapSecondWasAdded);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        for text in [SAMPLE_2013, SAMPLE_1991] {
            let schema = Schema::parse(text, false).unwrap();
            let content = schema.file_content();
            assert_eq!(content, text);
            let reparsed = Schema::parse(&content, false).unwrap();
            assert_eq!(reparsed.file_content(), content);
        }
    }

    #[test]
    fn test_round_trip_all_file_types() {
        for file_type in ["ASCII", "BINARY", "BINARY32", "FLOAT32"] {
            let text = SAMPLE_2013.replace("BINARY\r\n", &format!("{}\r\n", file_type));
            let schema = Schema::parse(&text, false).unwrap();
            assert_eq!(schema.file_type.as_ref(), file_type);
            assert_eq!(Schema::parse(&schema.file_content(), false).unwrap().file_content(), schema.file_content());
        }
    }

    #[test]
    fn test_round_trip_1999() {
        let text = "S,D,1999\r\n1,0A,1D\r\n1,D1,,,1\r\n60\r\n0\r\n0,1\r\n01/01/2020,00:00:00.000000\r\n01/01/2020,00:00:00.000000\r\nbinary32\r\n2.5\r\n";
        let schema = Schema::parse(text, false).unwrap();
        assert_eq!(schema.time_factor, 2.5);
        assert_eq!(schema.total_sample_rates(), 0);
        let content = schema.file_content();
        assert_eq!(content, text.replace("binary32", "BINARY32"));
        assert_eq!(Schema::parse(&content, false).unwrap().file_content(), content);
    }

    #[test]
    fn test_legacy_defaults() {
        let schema = Schema::parse(SAMPLE_1991, false).unwrap();
        assert_eq!(schema.version, 1991);
        assert_eq!(schema.time_factor, 1.0);
        assert_eq!(schema.file_type, FileType::Ascii);
        assert_eq!(schema.time_code, TimeOffset::default());
        assert_eq!(schema.total_sample_rates(), 1);
        assert_eq!(schema.sample_rates()[0].end_sample, 400);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let text = SAMPLE_2013.replace("3,2A,1D", "4,2A,1D");
        assert!(matches!(
            Schema::parse(&text, false),
            Err(ComtradeError::ChannelCountMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_file_type() {
        let text = SAMPLE_2013.replace("BINARY\r\n", "BINARY64\r\n");
        assert!(matches!(
            Schema::parse(&text, false),
            Err(ComtradeError::InvalidValue { what: "file type", .. })
        ));
    }

    #[test]
    fn test_truncated_configuration() {
        let text = "Sub1,DeviceA,2013\r\n3,2A,1D\r\n";
        match Schema::parse(text, false) {
            Err(ComtradeError::UnexpectedEndOfConfiguration { line_number, .. }) => assert_eq!(line_number, 3),
            other => panic!("expected UnexpectedEndOfConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_analog_line_strict_and_relaxed() {
        let seven = SAMPLE_2013.replace(
            "1,St1:IA,Am,,A,0.05,0,0,-99999,99998,1,1,P",
            "1,St1:IA,Am,,A,0.05,0",
        );
        assert!(matches!(
            Schema::parse(&seven, false),
            Err(ComtradeError::FieldCount { actual: 7, .. })
        ));
        assert!(Schema::parse(&seven, true).is_err());

        let eleven = SAMPLE_2013.replace(
            "1,St1:IA,Am,,A,0.05,0,0,-99999,99998,1,1,P",
            "1,St1:IA,Am,,A,0.05,0,0,-99999,99998,1",
        );
        assert!(Schema::parse(&eleven, false).is_err());
        assert!(Schema::parse(&eleven, true).is_ok());
    }

    #[test]
    fn test_relaxed_utc_suffix() {
        let text = SAMPLE_2013.replace("-5h00,x", "-5h00t,x");
        assert!(Schema::parse(&text, false).is_err());
        let schema = Schema::parse(&text, true).unwrap();
        assert_eq!(schema.time_code.hours(), -5);
    }

    #[test]
    fn test_unknown_time_quality_code() {
        let text = SAMPLE_2013.replace("A,1\r\n", "C,1\r\n");
        assert!(Schema::parse(&text, false).is_err());
        let schema = Schema::parse(&text, true).unwrap();
        assert_eq!(schema.time_quality_indicator_code, TimeQualityIndicatorCode::Locked);
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let text = format!("{}\r\n\r\n", SAMPLE_1991);
        let schema = Schema::parse(&text, false).unwrap();
        assert_eq!(schema.time_factor, 1.0);
    }

    #[test]
    fn test_float_target_changes_channel_defaults() {
        let text = SAMPLE_2013.replace("BINARY\r\n", "FLOAT32\r\n");
        let schema = Schema::parse(&text, false).unwrap();
        assert!(schema.analog_channels[0].is_target_floating_point());
        assert_eq!(schema.analog_channels[1].adder, 60.0);
    }

    #[test]
    fn test_nominal_frequency_cascades() {
        let mut schema = Schema::parse(SAMPLE_2013, false).unwrap();
        schema.set_nominal_frequency(50.0);
        assert_eq!(schema.analog_channels[1].adder, 50.0);
        assert_eq!(schema.analog_channels[1].nominal_frequency(), 50.0);
        assert_eq!(schema.analog_channels[0].adder, 0.0);
    }

    #[test]
    fn test_parsed_frequency_adder_is_kept() {
        let text = SAMPLE_2013.replace("St1:FREQ,F,,Hz,0.001,60,", "St1:FREQ,F,,Hz,0.001,0,");
        let schema = Schema::parse(&text, false).unwrap();
        let frequency = &schema.analog_channels[1];
        assert_eq!(frequency.adder, 0.0);
        assert_eq!(frequency.nominal_frequency(), 60.0);
        assert_eq!(frequency.physical_value(1000.0), 1.0);
        assert_eq!(schema.file_content(), text);
    }

    #[test]
    fn test_defaults() {
        let schema = Schema::new();
        assert_eq!(schema.version, 1999);
        assert_eq!(schema.nominal_frequency(), 60.0);
        assert_eq!(schema.file_type, FileType::Binary);
        assert_eq!(schema.sample_rates(), &[SampleRate::placeholder()]);
        assert_eq!(schema.total_sample_rates(), 0);
        assert_eq!(schema.time_code.to_string(), "0h00");
        assert_eq!(schema.local_code.to_string(), "x");
        assert_eq!(schema.start_time.value, Ticks(0));
    }

    #[test]
    fn test_empty_sample_rates_become_placeholder() {
        let mut schema = Schema::new();
        schema.set_sample_rates(Vec::new());
        assert_eq!(schema.sample_rates().len(), 1);
        assert_eq!(schema.total_samples(), 1);
    }

    #[test]
    fn test_digital_words_and_record_lengths() {
        let mut schema = Schema::new();
        for (count, words) in [(0, 0), (1, 1), (16, 1), (17, 2), (32, 2), (33, 3)] {
            schema.digital_channels = vec![DigitalChannel::new(1999); count];
            assert_eq!(schema.digital_words(), words, "{} digital channels", count);
        }

        schema.analog_channels = vec![AnalogChannel::default(); 3];
        schema.digital_channels = vec![DigitalChannel::new(1999); 17];
        assert_eq!(schema.binary_record_length(), 8 + 6 + 4);
        assert_eq!(schema.binary32_record_length(), 8 + 12 + 4);
        assert_eq!(schema.float32_record_length(), 8 + 12 + 4);
        schema.file_type = FileType::Float32;
        assert_eq!(schema.record_length(), 24);
    }

    #[test]
    fn test_sample_rate_lookup() {
        let mut schema = Schema::new();
        schema.set_sample_rates(vec![SampleRate::new(120.0, 100), SampleRate::new(60.0, 500)]);
        assert_eq!(schema.sample_rate_for(50).map(|r| r.rate), Some(120.0));
        assert_eq!(schema.sample_rate_for(100).map(|r| r.rate), Some(120.0));
        assert_eq!(schema.sample_rate_for(300).map(|r| r.rate), Some(60.0));
        assert_eq!(schema.sample_rate_for(900).map(|r| r.rate), Some(60.0));
        assert_eq!(schema.total_samples(), 500);
        assert_eq!(schema.total_sample_rates(), 2);
    }

    #[test]
    fn test_total_channel_values() {
        let mut schema = Schema::parse(SAMPLE_2013, false).unwrap();
        assert_eq!(schema.total_channel_values(), 30);
        schema.digital_channels.clear();
        assert_eq!(schema.total_channel_values(), 20);
    }

    #[test]
    fn test_from_file_cfg_and_cff() {
        let dir = tempfile::tempdir().unwrap();

        let cfg_path = dir.path().join("rec.cfg");
        fs::write(&cfg_path, SAMPLE_2013).unwrap();
        let schema = Schema::from_file(&cfg_path, false).unwrap();
        assert!(!schema.is_combined_file_format);
        assert_eq!(schema.file_name.as_deref(), Some(cfg_path.as_path()));

        let cff_path = dir.path().join("rec.CFF");
        let mut file = File::create(&cff_path).unwrap();
        write!(file, "--- file type: CFG ---\r\n{}--- file type: INF ---\r\n", SAMPLE_2013).unwrap();
        drop(file);
        let combined = Schema::from_file(&cff_path, false).unwrap();
        assert!(combined.is_combined_file_format);
        assert_eq!(combined.file_content(), schema.file_content());

        let missing = dir.path().join("missing.cfg");
        assert!(matches!(
            Schema::from_file(&missing, false),
            Err(ComtradeError::FileNotFound(_))
        ));
    }
}
