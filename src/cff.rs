//! Combined file format (.cff) framing.
//!
//! A combined file holds the CFG, INF, HDR and DAT sections of a recording
//! one after another, each introduced by a separator line such as
//! `--- file type: CFG ---` or `--- file type: DAT BINARY: 1024 ---`.

use std::io::{self, BufRead};
use std::path::Path;

use crate::error::{ComtradeError, Result};

pub const CFG_SECTION: &str = "CFG";
pub const INF_SECTION: &str = "INF";
pub const HDR_SECTION: &str = "HDR";
pub const DAT_ASCII_SECTION: &str = "DAT ASCII";
pub const DAT_BINARY_SECTION: &str = "DAT BINARY";

/// A parsed section separator line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionSeparator {
    /// Upper-cased section type, e.g. `CFG` or `DAT BINARY`
    pub section_type: String,
    /// Byte count announced by a `DAT BINARY` separator, zero otherwise
    pub byte_count: u64,
}

impl SectionSeparator {
    pub fn is_data_section(&self) -> bool {
        self.section_type.starts_with("DAT")
    }
}

/// Recognise a `--- file type: XXX ---` line
pub fn parse_section_separator(line: &str) -> Option<SectionSeparator> {
    if !line.trim().starts_with("---") {
        return None;
    }

    let inner = line.replace("---", "");
    let parts: Vec<&str> = inner.trim().split(':').collect();
    if parts.len() < 2 || !parts[0].trim().eq_ignore_ascii_case("file type") {
        return None;
    }

    let section_type = parts[1].trim().to_ascii_uppercase();
    let byte_count = if parts.len() > 2 && section_type == DAT_BINARY_SECTION {
        parts[2].trim().parse().unwrap_or(0)
    } else {
        0
    };

    Some(SectionSeparator {
        section_type,
        byte_count,
    })
}

pub fn separator_line(section_type: &str) -> String {
    format!("--- file type: {} ---", section_type)
}

pub fn has_cff_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cff"))
}

/// One text line together with the byte offset it starts at
#[derive(Clone, Debug)]
pub(crate) struct Line {
    pub start: u64,
    pub text: String,
}

/// Line reader that tracks exact byte positions, so that sections can be
/// located and patched in place regardless of CRLF or LF terminators
pub(crate) struct LineReader<R> {
    reader: R,
    position: u64,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            position: 0,
            buffer: Vec::new(),
        }
    }

    /// Byte offset just past the last line returned
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    pub fn next_line(&mut self) -> io::Result<Option<Line>> {
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }

        let start = self.position;
        self.position += read as u64;

        let mut content: &[u8] = &self.buffer;
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }

        Ok(Some(Line {
            start,
            text: String::from_utf8_lossy(content).into_owned(),
        }))
    }
}

/// Read the configuration lines of a combined file, which must open with a
/// CFG separator and run until the next separator
pub(crate) fn read_cfg_section<R: BufRead>(reader: &mut LineReader<R>) -> Result<Vec<String>> {
    let first = reader.next_line()?.map(|line| line.text).unwrap_or_default();
    match parse_section_separator(&first) {
        Some(separator) if separator.section_type == CFG_SECTION => {}
        _ => {
            return Err(ComtradeError::UnexpectedSeparator {
                expected: "--- file type: CFG ---",
                found: first,
            })
        }
    }

    let mut lines = Vec::new();
    while let Some(line) = reader.next_line()? {
        if parse_section_separator(&line.text).is_some() {
            break;
        }
        lines.push(line.text);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_separators() {
        let cfg = parse_section_separator("--- file type: CFG ---").unwrap();
        assert_eq!(cfg.section_type, "CFG");
        assert_eq!(cfg.byte_count, 0);

        let dat = parse_section_separator("--- file type: dat binary: 1024 ---   ").unwrap();
        assert_eq!(dat.section_type, "DAT BINARY");
        assert_eq!(dat.byte_count, 1024);
        assert!(dat.is_data_section());

        let ascii = parse_section_separator("--- file type: DAT ASCII ---").unwrap();
        assert_eq!(ascii.section_type, "DAT ASCII");
        assert!(ascii.is_data_section());
    }

    #[test]
    fn test_non_separators() {
        assert!(parse_section_separator("Station,Device,2013").is_none());
        assert!(parse_section_separator("--- something else ---").is_none());
        assert!(parse_section_separator("").is_none());
    }

    #[test]
    fn test_cff_extension() {
        assert!(has_cff_extension(Path::new("/tmp/rec.cff")));
        assert!(has_cff_extension(Path::new("REC.CFF")));
        assert!(!has_cff_extension(Path::new("rec.cfg")));
        assert!(!has_cff_extension(Path::new("cff")));
    }

    #[test]
    fn test_line_reader_positions() {
        let data = b"abc\r\nde\nf";
        let mut reader = LineReader::new(Cursor::new(&data[..]));

        let line = reader.next_line().unwrap().unwrap();
        assert_eq!((line.start, line.text.as_str()), (0, "abc"));
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!((line.start, line.text.as_str()), (5, "de"));
        let line = reader.next_line().unwrap().unwrap();
        assert_eq!((line.start, line.text.as_str()), (8, "f"));
        assert!(reader.next_line().unwrap().is_none());
        assert_eq!(reader.position(), 9);
    }

    #[test]
    fn test_read_cfg_section() {
        let text = "--- file type: CFG ---\r\nS,D,2013\r\n1,1A,0D\r\n--- file type: INF ---\r\n";
        let mut reader = LineReader::new(Cursor::new(text.as_bytes()));
        let lines = read_cfg_section(&mut reader).unwrap();
        assert_eq!(lines, vec!["S,D,2013", "1,1A,0D"]);

        let mut reader = LineReader::new(Cursor::new("S,D,2013\r\n".as_bytes()));
        assert!(read_cfg_section(&mut reader).is_err());
    }
}
