//! File readiness queries
//!
//! Decides whether an interval file is already compressed and tabix-indexed.
//! Everything here is read-only: paths are stat'ed and,
//! optionally, a gzip header is read. Nothing is written.

use crate::core::error::{ReadinessError, ReadinessResult};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Recognised compressed suffixes, in match order
pub const COMPRESSED_SUFFIXES: [&str; 2] = [".gz", ".bgz"];

/// Block-compressed suffix used for remediated files
pub const BGZIP_SUFFIX: &str = ".bgz";

/// Tabix index suffix, appended to the full compressed path
pub const INDEX_SUFFIX: &str = ".tbi";

/// Compression/index flags of a file
///
/// `is_indexed` implies `is_compressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStatus {
    pub is_compressed: bool,
    pub is_indexed: bool,
}

impl FileStatus {
    /// Compressed and indexed: nothing to do
    pub fn is_ready(&self) -> bool {
        self.is_compressed && self.is_indexed
    }
}

/// Classified state of an interval file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    CompressedIndexed,
    CompressedUnindexed,
    /// Compressed suffix but not valid BGZF; indexing would fail
    CompressedMalformed,
    Uncompressed,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::CompressedIndexed => "compressed+indexed",
            FileState::CompressedUnindexed => "compressed",
            FileState::CompressedMalformed => "compressed(malformed)",
            FileState::Uncompressed => "uncompressed",
        }
    }
}

impl From<FileStatus> for FileState {
    fn from(status: FileStatus) -> Self {
        match (status.is_compressed, status.is_indexed) {
            (true, true) => FileState::CompressedIndexed,
            (true, false) => FileState::CompressedUnindexed,
            (false, _) => FileState::Uncompressed,
        }
    }
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the path ends in a recognised compressed suffix. Never reads content.
pub fn is_compressed_path<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref().to_string_lossy();
    COMPRESSED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Append a suffix to the full path (`a.bed.gz` + `.tbi` → `a.bed.gz.tbi`)
pub fn append_suffix<P: AsRef<Path>>(path: P, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_ref().as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Sibling tabix index path
pub fn index_path<P: AsRef<Path>>(path: P) -> PathBuf {
    append_suffix(path, INDEX_SUFFIX)
}

/// Query compression and index state of `path`
///
/// Fails with [`ReadinessError::FileNotFound`] unless `path` is an existing
/// regular file. The index is only looked for when the file is compressed, so
/// a stray `x.txt.tbi` never makes `x.txt` count as indexed.
pub fn check<P: AsRef<Path>>(path: P) -> ReadinessResult<FileStatus> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReadinessError::FileNotFound(path.to_path_buf()));
    }

    let is_compressed = is_compressed_path(path);
    let is_indexed = is_compressed && index_path(path).is_file();

    Ok(FileStatus {
        is_compressed,
        is_indexed,
    })
}

/// Check whether a file starts with a BGZF block header.
///
/// BGZF members are gzip members (0x1f 0x8b) with FEXTRA set and a `BC`
/// extra subfield directly after the 12-byte fixed header.
pub fn is_bgzf<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 14];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => return Ok(false),
            n => filled += n,
        }
    }

    Ok(header[0] == 0x1f
        && header[1] == 0x8b
        && header[3] & 0x04 != 0
        && header[12] == b'B'
        && header[13] == b'C')
}

/// Classify `path` into a [`FileState`]
///
/// Without `check_header` the result follows [`check`] and never reports
/// `CompressedMalformed`. With `check_header`, a compressed, unindexed file whose
/// header is not BGZF is reported as malformed.
pub fn classify<P: AsRef<Path>>(path: P, check_header: bool) -> ReadinessResult<FileState> {
    let path = path.as_ref();
    let state = FileState::from(check(path)?);

    if check_header && state == FileState::CompressedUnindexed && !is_bgzf(path)? {
        return Ok(FileState::CompressedMalformed);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"chr1\t1\t2\n").unwrap();
        path
    }

    #[test]
    fn test_check_missing_file() {
        let dir = TempDir::new().unwrap();
        for name in ["nope.txt", "nope.gz", "nope.bgz"] {
            let err = check(dir.path().join(name)).unwrap_err();
            assert!(matches!(err, ReadinessError::FileNotFound(_)));
        }
    }

    #[test]
    fn test_check_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("d.gz");
        fs::create_dir(&sub).unwrap();
        assert!(matches!(check(&sub), Err(ReadinessError::FileNotFound(_))));
    }

    #[test]
    fn test_uncompressed_never_indexed() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "x.txt");
        touch(&dir, "x.txt.tbi");
        assert_eq!(check(&path).unwrap(), FileStatus::default());
    }

    #[test]
    fn test_compressed_with_and_without_index() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "x.gz");
        let status = check(&path).unwrap();
        assert!(status.is_compressed && !status.is_indexed);

        touch(&dir, "x.gz.tbi");
        let status = check(&path).unwrap();
        assert!(status.is_ready());
    }

    #[test]
    fn test_index_path_appends() {
        assert_eq!(index_path("a/b.bed.bgz"), PathBuf::from("a/b.bed.bgz.tbi"));
    }

    #[test]
    fn test_state_from_status() {
        let s = |c, i| FileState::from(FileStatus { is_compressed: c, is_indexed: i });
        assert_eq!(s(true, true), FileState::CompressedIndexed);
        assert_eq!(s(true, false), FileState::CompressedUnindexed);
        assert_eq!(s(false, false), FileState::Uncompressed);
    }

    #[test]
    fn test_is_bgzf_header() {
        let dir = TempDir::new().unwrap();
        let bgzf = dir.path().join("a.bgz");
        // empty BGZF EOF block
        fs::write(
            &bgzf,
            [
                0x1f, 0x8b, 0x08, 0x04, 0, 0, 0, 0, 0, 0xff, 0x06, 0, b'B', b'C', 0x02, 0, 0x1b,
                0, 0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            ],
        )
        .unwrap();
        assert!(is_bgzf(&bgzf).unwrap());

        let plain = touch(&dir, "b.gz");
        assert!(!is_bgzf(&plain).unwrap());
        assert_eq!(classify(&plain, false).unwrap(), FileState::CompressedUnindexed);
        assert_eq!(classify(&plain, true).unwrap(), FileState::CompressedMalformed);
        assert_eq!(classify(&bgzf, true).unwrap(), FileState::CompressedUnindexed);
    }
}
