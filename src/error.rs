//! Error type shared by the configuration parser, the data-file reader and
//! the writer.

use std::io;
use std::path::PathBuf;

use crate::schema::{FileType, SignalKind};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ComtradeError>;

#[derive(Debug, thiserror::Error)]
pub enum ComtradeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Format errors
    #[error("unexpected number of fields in {what}: {actual}, expected {expected}\nline: \"{line}\"")]
    FieldCount {
        what: &'static str,
        expected: String,
        actual: usize,
        line: String,
    },

    #[error("invalid {what} \"{value}\"\nline: \"{line}\"")]
    InvalidValue {
        what: &'static str,
        value: String,
        line: String,
    },

    #[error("total channel count must equal analog + digital channel counts\nline: \"{0}\"")]
    ChannelCountMismatch(String),

    #[error("configuration ended unexpectedly at line {line_number}, expected {expected}")]
    UnexpectedEndOfConfiguration {
        line_number: usize,
        expected: &'static str,
    },

    #[error("unexpected combined file section separator, expected \"{expected}\"\nfound: \"{found}\"")]
    UnexpectedSeparator { expected: &'static str, found: String },

    #[error("combined file has no \"{0}\" section")]
    MissingSection(&'static str),

    #[error("UTC offset {component} out of range: {value}")]
    OffsetOutOfRange { component: &'static str, value: i32 },

    #[error("{0:?} is not a valid analog signal kind")]
    InvalidSignalKind(SignalKind),

    #[error("'{0}' is not a valid scaling identifier, expected 'P' or 'S'")]
    InvalidScalingIdentifier(char),

    // Resource errors
    #[error("file \"{}\" does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("no data file name is known for this schema")]
    NoDataFile,

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    // State misuse
    #[error("data files are not open, call open_files first")]
    FilesNotOpened,

    #[error("all samples have been read, no further records are available")]
    EndOfData,

    // Corruption
    #[error("short record in \"{}\" at byte offset {offset}: read {actual} of {expected} bytes, possible schema mismatch or file corruption", path.display())]
    CorruptRecord {
        path: PathBuf,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("ASCII record has {actual} fields, schema requires {expected}\nline: \"{line}\"")]
    AsciiRecordMismatch {
        expected: usize,
        actual: usize,
        line: String,
    },

    // Write-side validation
    #[error("cannot write a {attempted} record with a schema declaring file type {declared}")]
    FileTypeMismatch {
        attempted: FileType,
        declared: FileType,
    },

    #[error("record holds {actual} {what}, schema requires {expected}")]
    ValueCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("COMTRADE version {version} is not supported here, minimum is {minimum}")]
    UnsupportedVersion { version: u16, minimum: u16 },

    #[error("\"{}\" does not carry the combined file extension \".cff\"", .0.display())]
    NotCombinedFile(PathBuf),

    #[error("end sample {0} exceeds the maximum of 9999999999")]
    EndSampleOutOfRange(i64),

    #[error("byte count {0} exceeds the maximum file size of 281474976710656 bytes")]
    ByteCountOutOfRange(u64),

    #[error("record time offset {0} lies outside the 0..=4294967295 range of the time stamp field")]
    TimestampOutOfRange(f64),

    #[error("sample rate index {index} exceeds the {available} sample rates in the configuration")]
    RateIndexOutOfRange { index: usize, available: usize },
}

impl ComtradeError {
    pub(crate) fn invalid_value(what: &'static str, value: &str, line: &str) -> Self {
        ComtradeError::InvalidValue {
            what,
            value: value.to_string(),
            line: line.to_string(),
        }
    }
}
