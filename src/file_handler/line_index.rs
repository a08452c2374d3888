//! Incremental line index shared between the tailer and the viewport.
//!
//! This module provides the LineIndex structure mapping logical line numbers to byte
//! ranges, the LineScanner that discovers line boundaries in newly arrived bytes using
//! memchr, and SharedLineIndex, the lock-guarded handle both tasks use.

use memchr::memchr_iter;
use parking_lot::Mutex;
use std::sync::Arc;

/// Byte range of one indexed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    /// Byte position where the line starts
    pub offset: u64,

    /// Number of bytes to read, capped at the index's maximum line length
    pub length: usize,
}

/// Append-only table of line boundaries
///
/// - entry 0 is the SOF sentinel `(0, 0)` and is always present
/// - entry n (n >= 1) is the n-th line of the file
/// - a line is only recorded once its terminating newline has been seen
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    offsets: Vec<u64>,

    /// Capped byte lengths, parallel to `offsets`
    lengths: Vec<usize>,

    /// Cap applied to every recorded length
    max_line_length: usize,

    /// Incremented on every reset so readers can drop stale cached lines
    epoch: u64,
}

impl LineIndex {
    /// Create an index holding only the SOF sentinel
    pub fn new(max_line_length: usize) -> Self {
        Self {
            offsets: vec![0],
            lengths: vec![0],
            max_line_length: max_line_length.max(1),
            epoch: 0,
        }
    }

    /// Number of entries, SOF included
    pub fn line_count(&self) -> u64 {
        self.offsets.len() as u64
    }

    /// Record one line. The length is capped here.
    ///
    /// Offsets of real lines must be strictly increasing; out-of-order input is ignored.
    pub fn push(&mut self, offset: u64, length: usize) -> bool {
        if self.offsets.len() > 1 {
            let last = self.offsets[self.offsets.len() - 1];
            if offset <= last {
                return false;
            }
        }
        self.offsets.push(offset);
        self.lengths.push(length.min(self.max_line_length));
        true
    }

    /// Look up line `n`
    pub fn entry(&self, n: u64) -> Option<LineEntry> {
        let idx = usize::try_from(n).ok()?;
        Some(LineEntry {
            offset: *self.offsets.get(idx)?,
            length: *self.lengths.get(idx)?,
        })
    }

    /// Return to the `{0:0}` state
    pub fn reset(&mut self) {
        self.offsets.truncate(1);
        self.lengths.truncate(1);
        self.epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

/// Finds line boundaries in a byte stream delivered in arbitrary chunks
///
/// The scanner remembers where the current (unterminated) line started so a line split
/// across two reads is reported once, with its full offset and length.
#[derive(Debug, Default, Clone)]
pub struct LineScanner {
    /// Bytes consumed so far (absolute file position of the next chunk)
    position: u64,

    /// Start of the line currently being assembled
    line_start: u64,
}

impl LineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute position the next chunk is expected to start at
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Scan a chunk that starts at `self.position()`.
    ///
    /// Returns `(offset, uncapped_length)` for every line terminated inside the chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<(u64, usize)> {
        let base = self.position;
        let mut lines = Vec::new();

        for newline in memchr_iter(b'\n', chunk) {
            let end = base + newline as u64;
            lines.push((self.line_start, (end - self.line_start) as usize));
            self.line_start = end + 1;
        }

        self.position = base + chunk.len() as u64;
        lines
    }

    /// Start over from byte 0 (after truncation)
    pub fn reset(&mut self) {
        self.position = 0;
        self.line_start = 0;
    }
}

/// Lock-guarded line index shared by the tailer and readers
///
/// Every method takes the lock for a single lookup or mutation and releases it before
/// returning; no caller can hold it across I/O.
#[derive(Debug, Clone)]
pub struct SharedLineIndex {
    inner: Arc<Mutex<LineIndex>>,
}

impl SharedLineIndex {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LineIndex::new(max_line_length))),
        }
    }

    /// Number of entries, SOF included
    pub fn line_count(&self) -> u64 {
        self.inner.lock().line_count()
    }

    /// Look up line `n` together with the epoch it belongs to
    pub fn lookup(&self, n: u64) -> Option<(LineEntry, u64)> {
        let index = self.inner.lock();
        index.entry(n).map(|entry| (entry, index.epoch()))
    }

    /// Append lines found by a scanner; returns the new line count
    pub fn append(&self, lines: &[(u64, usize)]) -> u64 {
        let mut index = self.inner.lock();
        for &(offset, length) in lines {
            index.push(offset, length);
        }
        index.line_count()
    }

    /// Reset to SOF only
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_index() {
        let index = LineIndex::new(100);
        assert_eq!(index.line_count(), 1);
        assert_eq!(
            index.entry(0),
            Some(LineEntry {
                offset: 0,
                length: 0
            })
        );
        assert_eq!(index.entry(1), None);
    }

    #[test]
    fn test_scanner_basic() {
        let mut scanner = LineScanner::new();
        let lines = scanner.feed(b"line1\nline2\nline3\n");
        assert_eq!(lines, vec![(0, 5), (6, 5), (12, 5)]);
        assert_eq!(scanner.position(), 18);
    }

    #[test]
    fn test_scanner_carries_partial_line() {
        let mut scanner = LineScanner::new();
        assert_eq!(scanner.feed(b"hel"), vec![]);
        assert_eq!(scanner.feed(b"lo wor"), vec![]);
        assert_eq!(scanner.feed(b"ld\nnext"), vec![(0, 11)]);
        assert_eq!(scanner.feed(b"\n"), vec![(12, 4)]);
    }

    #[test]
    fn test_scanner_empty_lines() {
        let mut scanner = LineScanner::new();
        let lines = scanner.feed(b"\n\nx\n");
        assert_eq!(lines, vec![(0, 0), (1, 0), (2, 1)]);
    }

    #[test]
    fn test_length_is_capped_but_offsets_are_exact() {
        let mut index = LineIndex::new(4);
        let mut scanner = LineScanner::new();
        for (offset, length) in scanner.feed(b"abcdefgh\nxy\n") {
            index.push(offset, length);
        }

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.entry(1).unwrap().length, 4);
        assert_eq!(
            index.entry(2),
            Some(LineEntry {
                offset: 9,
                length: 2
            })
        );
    }

    #[test]
    fn test_push_rejects_non_increasing_offsets() {
        let mut index = LineIndex::new(100);
        assert!(index.push(0, 3));
        assert!(index.push(4, 3));
        assert!(!index.push(4, 3));
        assert!(!index.push(2, 1));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_reset_returns_to_sof_and_bumps_epoch() {
        let index = SharedLineIndex::new(100);
        index.append(&[(0, 5), (6, 5)]);
        assert_eq!(index.line_count(), 3);

        index.reset();
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.epoch(), 1);
        assert!(index.lookup(1).is_none());
        assert_eq!(index.lookup(0).map(|(_, epoch)| epoch), Some(1));
    }

    #[test]
    fn test_shared_index_is_visible_across_clones() {
        let writer = SharedLineIndex::new(100);
        let reader = writer.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..1000u64 {
                writer.append(&[(i * 10, 9)]);
            }
        });
        handle.join().unwrap();

        assert_eq!(reader.line_count(), 1001);
        let (entry, _) = reader.lookup(1000).unwrap();
        assert_eq!(entry.offset, 9990);
    }
}
