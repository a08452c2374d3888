//! Line decoding and random access to indexed lines.
//!
//! This module defines the LineSource trait that the viewport and search engine read
//! through, and IndexedFile, which resolves a line number through the shared index and
//! reads exactly the recorded byte range from the file.

use crate::file_handler::line_index::SharedLineIndex;
use bstr::ByteSlice;
use lru::LruCache;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;

/// Columns between tab stops
pub const TAB_STOP: usize = 4;

/// Decode raw line bytes for display
///
/// - tabs expand to the next 4-column stop
/// - carriage returns become a single space
/// - invalid UTF-8 is replaced with U+FFFD
pub fn expand_line(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut column = 0usize;

    for ch in bytes.chars() {
        match ch {
            '\t' => {
                let pad = TAB_STOP - (column % TAB_STOP);
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\r' => {
                out.push(' ');
                column += 1;
            }
            other => {
                out.push(other);
                column += 1;
            }
        }
    }

    out
}

/// Read access to the lines of the current file
///
/// Line 0 is the SOF sentinel; lines `1..line_count()` carry content.
pub trait LineSource: Send + Sync {
    /// Number of index entries, SOF included
    fn line_count(&self) -> u64;

    /// Decoded content of line `n`, or `None` when the line is not (or no longer)
    /// available. Never fails loudly.
    fn read_line(&self, n: u64) -> Option<String>;
}

/// Decoded lines memoised for one index epoch
struct LineCache {
    epoch: u64,
    lines: LruCache<u64, String>,
}

/// A file paired with its line index
pub struct IndexedFile {
    index: SharedLineIndex,
    file: Mutex<File>,
    cache: Mutex<LineCache>,
}

impl IndexedFile {
    pub fn new(file: File, index: SharedLineIndex, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            index,
            file: Mutex::new(file),
            cache: Mutex::new(LineCache {
                epoch: 0,
                lines: LruCache::new(capacity),
            }),
        }
    }

    pub fn index(&self) -> &SharedLineIndex {
        &self.index
    }

    fn read_exact_at(&self, offset: u64, length: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn cached(&self, n: u64, epoch: u64) -> Option<String> {
        let mut cache = self.cache.lock();
        if cache.epoch != epoch {
            cache.lines.clear();
            cache.epoch = epoch;
            return None;
        }
        cache.lines.get(&n).cloned()
    }

    fn remember(&self, n: u64, epoch: u64, line: &str) {
        let mut cache = self.cache.lock();
        if cache.epoch == epoch {
            cache.lines.put(n, line.to_string());
        }
    }
}

impl LineSource for IndexedFile {
    fn line_count(&self) -> u64 {
        self.index.line_count()
    }

    fn read_line(&self, n: u64) -> Option<String> {
        let (entry, epoch) = self.index.lookup(n)?;
        if entry.length == 0 {
            return Some(String::new());
        }
        if let Some(line) = self.cached(n, epoch) {
            return Some(line);
        }

        let bytes = match self.read_exact_at(entry.offset, entry.length) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::debug!("read of line {} failed: {}", n, err);
                return None;
            }
        };
        let line = expand_line(&bytes);
        self.remember(n, epoch, &line);
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handler::line_index::LineScanner;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn indexed(content: &[u8], max_line_length: usize) -> (NamedTempFile, IndexedFile) {
        let mut temp = NamedTempFile::new().expect("Failed to create temp file");
        temp.write_all(content).unwrap();
        temp.flush().unwrap();

        let index = SharedLineIndex::new(max_line_length);
        let mut scanner = LineScanner::new();
        index.append(&scanner.feed(content));

        let file = File::open(temp.path()).unwrap();
        (temp, IndexedFile::new(file, index, 16))
    }

    #[test]
    fn test_expand_tabs_to_four_column_stops() {
        assert_eq!(expand_line(b"\tx"), "    x");
        assert_eq!(expand_line(b"ab\tc"), "ab  c");
        assert_eq!(expand_line(b"abcd\te"), "abcd    e");
    }

    #[test]
    fn test_expand_carriage_return() {
        assert_eq!(expand_line(b"dos line\r"), "dos line ");
        assert_eq!(expand_line(b"a\r\tb"), "a   b");
    }

    #[test]
    fn test_expand_invalid_utf8() {
        assert_eq!(expand_line(b"ok\xffok"), "ok\u{FFFD}ok");
    }

    #[test]
    fn test_read_lines_by_number() {
        let (_temp, file) = indexed(b"first\n\tsecond\nthird\npartial", 100);

        assert_eq!(file.line_count(), 4);
        assert_eq!(file.read_line(0).as_deref(), Some(""));
        assert_eq!(file.read_line(1).as_deref(), Some("first"));
        assert_eq!(file.read_line(2).as_deref(), Some("    second"));
        assert_eq!(file.read_line(3).as_deref(), Some("third"));
        // unterminated tail is not indexed yet
        assert_eq!(file.read_line(4), None);
    }

    #[test]
    fn test_read_capped_line() {
        let (_temp, file) = indexed(b"0123456789\nshort\n", 4);
        assert_eq!(file.read_line(1).as_deref(), Some("0123"));
        assert_eq!(file.read_line(2).as_deref(), Some("shor"));
    }

    #[test]
    fn test_reset_invalidates_cache() {
        let (_temp, file) = indexed(b"alpha\nbeta\n", 100);
        assert_eq!(file.read_line(1).as_deref(), Some("alpha"));

        file.index().reset();
        assert_eq!(file.read_line(1), None);
    }

    #[test]
    fn test_read_failure_returns_none() {
        let (temp, file) = indexed(b"alpha\nbeta\n", 100);
        // shrink the file behind the index's back
        std::fs::write(temp.path(), b"a").unwrap();
        assert_eq!(file.read_line(2), None);
    }
}
