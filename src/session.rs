//! Persisted browsing session record.
//!
//! The record is five newline-delimited plain-text fields:
//!
//! 1. absolute file path
//! 2. top visible line number
//! 3. search pattern, optionally `(?i)`-prefixed
//! 4. nine space-separated mark line numbers
//! 5. display title
//!
//! A record with fewer than five lines is valid; the missing fields take defaults.

use crate::error::{Result, RlpagerError};
use std::path::{Path, PathBuf};

/// Number of mark slots (digits 1 through 9)
pub const MARK_COUNT: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub path: PathBuf,
    pub top_line: u64,
    pub pattern: Option<String>,
    pub marks: [u64; MARK_COUNT],
    pub title: Option<String>,
}

impl SessionRecord {
    /// Parse record text. Partial records are accepted; malformed numbers are not.
    pub fn parse(text: &str) -> Result<Self> {
        let mut record = Self::default();
        let mut lines = text.lines();

        if let Some(path) = lines.next() {
            record.path = PathBuf::from(path);
        }

        if let Some(top) = lines.next() {
            let top = top.trim();
            if !top.is_empty() {
                record.top_line = top
                    .parse()
                    .map_err(|_| RlpagerError::session(format!("bad top line: {:?}", top)))?;
            }
        }

        if let Some(pattern) = lines.next() {
            if !pattern.is_empty() {
                record.pattern = Some(pattern.to_string());
            }
        }

        if let Some(marks) = lines.next() {
            for (slot, field) in marks.split_whitespace().enumerate() {
                if slot >= MARK_COUNT {
                    return Err(RlpagerError::session(format!(
                        "more than {} marks",
                        MARK_COUNT
                    )));
                }
                record.marks[slot] = field
                    .parse()
                    .map_err(|_| RlpagerError::session(format!("bad mark: {:?}", field)))?;
            }
        }

        if let Some(title) = lines.next() {
            if !title.is_empty() {
                record.title = Some(title.to_string());
            }
        }

        Ok(record)
    }

    /// Render the five-line record
    pub fn format(&self) -> String {
        let marks = self
            .marks
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{}\n{}\n{}\n{}\n{}\n",
            self.path.display(),
            self.top_line,
            self.pattern.as_deref().unwrap_or(""),
            marks,
            self.title.as_deref().unwrap_or("")
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RlpagerError::session(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.format()).map_err(|e| {
            RlpagerError::session(format!("cannot write {}: {}", path.display(), e))
        })
    }
}
