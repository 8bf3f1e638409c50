//! Source reader with automatic decompression.
//!
//! Rotated auth logs are often compressed, so `.gz` and `.zst` sources are
//! decompressed transparently. The special name [`STDIN_NAME`] reads
//! standard input.
//!
//! # Examples
//!
//! ```no_run
//! use logsift::utils::reader::{for_each_line, open_source};
//!
//! // Count the trimmed, non-blank lines of a rotated log
//! let name = "/var/log/auth.log.2.gz";
//! let mut count = 0;
//! for_each_line(open_source(name).unwrap(), name, |_line| count += 1).unwrap();
//! println!("{} lines", count);
//! ```

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Source name used for standard input.
pub const STDIN_NAME: &str = "<stdin>";

/// Opens a file, decompressing by extension:
/// - `.gz` → gzip
/// - `.zst` → zstandard
/// - anything else → plain
pub fn open_file(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match extension {
        "gz" => Ok(Box::new(GzDecoder::new(file))),
        "zst" => {
            let decoder = zstd::Decoder::new(file).with_context(|| {
                format!("Failed to create zstd decoder for: {}", path.display())
            })?;
            Ok(Box::new(decoder))
        }
        _ => Ok(Box::new(file)),
    }
}

/// Open a named source; [`STDIN_NAME`] means standard input.
pub fn open_source(name: &str) -> Result<Box<dyn BufRead + Send>> {
    if name == STDIN_NAME {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    Ok(Box::new(BufReader::new(open_file(name)?)))
}

/// Stream every non-blank line of `reader`, trimmed, into `handle`.
///
/// One line is held in memory at a time. Invalid UTF-8 is replaced rather
/// than rejected; log files routinely carry the odd binary byte from a
/// scanner. Returns the number of lines handed over.
pub fn for_each_line<F>(mut reader: impl BufRead, name: &str, mut handle: F) -> Result<usize>
where
    F: FnMut(&str),
{
    let mut buf = Vec::new();
    let mut line_number = 0usize;
    let mut handled = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read line {} from {}", line_number + 1, name))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if !line.is_empty() {
            handle(line);
            handled += 1;
        }
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(name: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for_each_line(open_source(name)?, name, |line| lines.push(line.to_string()))?;
        Ok(lines)
    }

    #[test]
    fn test_plain_file_skips_blank_lines() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "  first line  ").unwrap();
        writeln!(temp).unwrap();
        writeln!(temp, "\t").unwrap();
        write!(temp, "last line without newline").unwrap();
        temp.flush().unwrap();

        let lines = read_all(temp.path().to_str().unwrap()).unwrap();
        assert_eq!(lines, vec!["first line", "last line without newline"]);
    }

    #[test]
    fn test_gzip_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut temp = NamedTempFile::with_suffix(".gz").unwrap();
        {
            let mut encoder = GzEncoder::new(&mut temp, Compression::default());
            writeln!(encoder, "Dec 22 22:18:07 host sshd[1]: Invalid user ro from 1.2.3.4").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let lines = read_all(temp.path().to_str().unwrap()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("1.2.3.4"));
    }

    #[test]
    fn test_zstd_file() {
        let mut temp = NamedTempFile::with_suffix(".zst").unwrap();
        {
            let mut encoder = zstd::Encoder::new(&mut temp, 3).unwrap();
            writeln!(encoder, "9.9.9.9").unwrap();
            writeln!(encoder, "8.8.8.8").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let lines = read_all(temp.path().to_str().unwrap()).unwrap();
        assert_eq!(lines, vec!["9.9.9.9", "8.8.8.8"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes: &[u8] = b"scan \xff\xfe from 1.2.3.4\n";
        let mut lines = Vec::new();
        let handled = for_each_line(bytes, "bytes", |line| lines.push(line.to_string())).unwrap();
        assert_eq!(handled, 1);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("from 1.2.3.4"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_all("/nonexistent/auth.log").unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
