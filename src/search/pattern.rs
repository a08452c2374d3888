//! Compiled search patterns backed by ripgrep's regex matcher.

use crate::error::{Result, RlpagerError};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use std::ops::Range;

/// Prefix that forces a case-insensitive search
pub const CASE_INSENSITIVE_PREFIX: &str = "(?i)";

/// Split a leading `(?i)` off a typed pattern
pub fn split_case_prefix(pattern: &str) -> (bool, &str) {
    match pattern.strip_prefix(CASE_INSENSITIVE_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, pattern),
    }
}

/// A successfully compiled pattern and the text it was built from
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    text: String,
    case_insensitive: bool,
    matcher: RegexMatcher,
}

impl CompiledPattern {
    /// Compile `text` (without any `(?i)` prefix)
    pub fn compile(text: &str, case_insensitive: bool) -> Result<Self> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(case_insensitive)
            .build(text)
            .map_err(|e| RlpagerError::pattern(e.to_string()))?;

        Ok(Self {
            text: text.to_string(),
            case_insensitive,
            matcher,
        })
    }

    /// Pattern body as typed, without the case prefix
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Pattern as shown to the user and persisted in session records
    pub fn display_text(&self) -> String {
        if self.case_insensitive {
            format!("{}{}", CASE_INSENSITIVE_PREFIX, self.text)
        } else {
            self.text.clone()
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.matcher.is_match(line.as_bytes()).unwrap_or(false)
    }

    /// Byte ranges of every non-empty match in `line`
    pub fn find_all(&self, line: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let _ = self.matcher.find_iter(line.as_bytes(), |m| {
            if m.start() < m.end() {
                ranges.push(m.start()..m.end());
            }
            true
        });
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_case_prefix() {
        assert_eq!(split_case_prefix("(?i)error"), (true, "error"));
        assert_eq!(split_case_prefix("error"), (false, "error"));
        assert_eq!(split_case_prefix("x(?i)y"), (false, "x(?i)y"));
    }

    #[test]
    fn test_find_all_ranges() {
        let pattern = CompiledPattern::compile("ab", false).unwrap();
        assert_eq!(pattern.find_all("xxabyyab"), vec![2..4, 6..8]);
        assert!(pattern.find_all("AB").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = CompiledPattern::compile("warn", true).unwrap();
        assert!(pattern.is_match("WARNING: disk"));
        assert_eq!(pattern.display_text(), "(?i)warn");
        assert_eq!(pattern.text(), "warn");
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let pattern = CompiledPattern::compile("z*", false).unwrap();
        assert!(pattern.is_match("abc"));
        assert!(pattern.find_all("abc").is_empty());
        assert_eq!(pattern.find_all("azzb"), vec![1..3]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = CompiledPattern::compile("(unclosed", false).unwrap_err();
        assert!(matches!(err, RlpagerError::PatternError { .. }));
    }
}
