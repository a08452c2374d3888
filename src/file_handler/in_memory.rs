//! In-memory line source for fixed text such as the help screen
//!
//! Content is split and decoded once at construction, using the same decoding as
//! lines read from disk, so it renders exactly like a file.

use crate::file_handler::reader::{expand_line, LineSource};
use bstr::ByteSlice;

/// Fixed lines held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLines {
    /// Decoded lines; `lines[0]` is display line 1
    lines: Vec<String>,
}

impl InMemoryLines {
    /// Split `content` on newlines; a trailing unterminated line is kept
    pub fn new(content: &[u8]) -> Self {
        Self {
            lines: content.lines().map(expand_line).collect(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineSource for InMemoryLines {
    fn line_count(&self) -> u64 {
        self.lines.len() as u64 + 1
    }

    fn read_line(&self, n: u64) -> Option<String> {
        match n {
            0 => Some(String::new()),
            n => self.lines.get(usize::try_from(n - 1).ok()?).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_numbered_from_one() {
        let source = InMemoryLines::from_text("first\n\tsecond\nthird");
        assert_eq!(source.line_count(), 4);
        assert_eq!(source.read_line(0).as_deref(), Some(""));
        assert_eq!(source.read_line(1).as_deref(), Some("first"));
        assert_eq!(source.read_line(2).as_deref(), Some("    second"));
        assert_eq!(source.read_line(3).as_deref(), Some("third"));
        assert_eq!(source.read_line(4), None);
    }

    #[test]
    fn test_empty_content() {
        let source = InMemoryLines::new(b"");
        assert!(source.is_empty());
        assert_eq!(source.line_count(), 1);
        assert_eq!(source.read_line(1), None);
    }

    #[test]
    fn test_crlf_lines() {
        let source = InMemoryLines::new(b"a\r\nb\r\n");
        assert_eq!(source.len(), 2);
        assert_eq!(source.read_line(1).as_deref(), Some("a"));
    }
}
