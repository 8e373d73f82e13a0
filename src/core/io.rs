//! Tabular source I/O
//!
//! Opens interval sources (plain, gzip or BGZF by suffix) and walks their
//! data lines, skipping blank lines and `#` comments.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Suffixes read through the gzip decoder
const GZIP_SUFFIXES: [&str; 2] = [".gz", ".bgz"];

/// Whether the path carries a gzip-family suffix
pub fn has_gzip_suffix<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref().to_string_lossy();
    GZIP_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Open a tabular source for line reading
///
/// `.gz`/`.bgz` files are decompressed on the fly. `MultiGzDecoder` is
/// required because BGZF is a concatenation of gzip members.
pub fn open_source<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    if has_gzip_suffix(path) {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file)))
    }
}

/// Iterator over the data lines of a tabular source
///
/// Reuses one buffer across lines. Yields `(line_number, trimmed_line)` with
/// 1-based line numbers; blank lines and lines starting with `#` (after
/// trimming) are skipped.
pub struct DataLines<R: BufRead> {
    reader: R,
    buffer: String,
    line_number: usize,
}

impl<R: BufRead> DataLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Read the next data line
    /// Returns None at EOF, Some(Ok(..)) on success, Some(Err) on error
    pub fn next_line(&mut self) -> Option<io::Result<(usize, &str)>> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = self.buffer.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    break;
                }
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok((self.line_number, self.buffer.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_data_lines_skip_comments_and_blanks() -> io::Result<()> {
        let input = "# header\n\nchr1\t1\t2\tA\n   \n  #indented comment\nchr2\t3\t4\tB\r\n";
        let mut lines = DataLines::new(input.as_bytes());

        let (n, line) = lines.next_line().unwrap()?;
        assert_eq!((n, line), (3, "chr1\t1\t2\tA"));
        let (n, line) = lines.next_line().unwrap()?;
        assert_eq!((n, line), (6, "chr2\t3\t4\tB"));
        assert!(lines.next_line().is_none());
        Ok(())
    }

    #[test]
    fn test_has_gzip_suffix() {
        assert!(has_gzip_suffix("a.bed.gz"));
        assert!(has_gzip_suffix("a.gtf.bgz"));
        assert!(!has_gzip_suffix("a.bed"));
        assert!(!has_gzip_suffix("a.gz.tbi"));
    }

    #[test]
    fn test_open_source_plain() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        writeln!(temp, "chr1\t1\t2\tA")?;
        temp.flush()?;

        let mut lines = DataLines::new(open_source(temp.path())?);
        assert_eq!(lines.next_line().unwrap()?.1, "chr1\t1\t2\tA");
        Ok(())
    }

    #[test]
    fn test_open_source_gzip() -> io::Result<()> {
        let temp = tempfile::Builder::new().suffix(".bed.gz").tempfile()?;
        let mut encoder = GzEncoder::new(temp.reopen()?, Compression::default());
        encoder.write_all(b"#c\nchr1\t10\t20\tgeneA\n")?;
        encoder.finish()?;

        let mut lines = DataLines::new(open_source(temp.path())?);
        assert_eq!(lines.next_line().unwrap()?.1, "chr1\t10\t20\tgeneA");
        assert!(lines.next_line().is_none());
        Ok(())
    }
}
