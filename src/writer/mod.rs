//! Writing COMTRADE recordings.
//!
//! - [`builder`] - build a phasor-oriented [`Schema`](crate::schema::Schema) from point metadata
//! - [`cff`] - create combined files and patch their byte count and end sample
//! - [`records`] - encode sample records in the four data file formats

pub mod builder;
pub mod cff;
pub mod metadata;
pub mod records;

pub use crate::schema::CRLF;
pub use builder::{create_schema, SchemaSettings};
pub use cff::{
    create_cff_file, create_cff_file_ascii, create_cff_stream, create_cff_stream_ascii,
    update_cff_stream_binary_byte_count, update_stream_end_sample,
};
pub use metadata::ChannelMetadata;
pub use records::{
    write_next_record_ascii, write_next_record_ascii_bits, write_next_record_binary,
    write_next_record_binary32, write_next_record_binary32_bits, write_next_record_binary_bits,
    write_next_record_float32, write_next_record_float32_bits, write_record,
};

/// Largest data section a combined file may announce (256 TB)
pub const MAX_FILE_SIZE: u64 = 281_474_976_710_656;

/// Largest end sample a sample rate line may carry
pub const MAX_END_SAMPLE: i64 = 9_999_999_999;
