//! COMTRADE - reader and writer for IEEE C37.111 oscillography records
//!
//! A recording is a configuration (`.cfg`) describing analog and digital
//! channels plus one or more data files (`.dat`, `.d00`, ...) holding the
//! samples, or a single combined file (`.cff`) holding every section.
//! Versions 1991, 1999 and 2013 are understood, with ASCII, BINARY, BINARY32
//! and FLOAT32 data files.
//!
//! ## Module Structure
//!
//! - [`schema`] - Configuration model: channels, sample rates and the [`Schema`](schema::Schema) itself
//! - [`parser`] - Streaming record decoder over split or combined data files
//! - [`writer`] - Schema builder, combined file framing and record encoders
//! - [`cff`] - Combined file section separators
//! - [`time`] - Tick based timestamps and UTC offsets
//! - [`units`] - Angle units and conversion
//! - [`little_endian`] - Byte codec for binary records
//! - [`error`] - Crate error type

pub mod cff;
pub mod error;
pub mod little_endian;
pub mod parser;
pub mod schema;
pub mod time;
pub mod units;
pub mod writer;

pub use error::{ComtradeError, Result};
pub use parser::{Parser, ParserOptions};
pub use schema::Schema;
