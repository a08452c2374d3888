//! Page-oriented search with wraparound and match highlighting.
//!
//! Searches advance one page at a time. A search session may wrap past the end (or
//! start) of the file exactly once; after that, running off the end again reports
//! "Pattern not found". The session lasts until the pattern changes or the state is
//! reset, so repeated `n` presses cannot loop forever on a file with a single match.

use crate::error::{Result, RlpagerError};
use crate::file_handler::LineSource;
use crate::render::state::LINE_NUMBER_WIDTH;
use crate::render::theme::{paint, Theme};
use crate::search::pattern::{split_case_prefix, CompiledPattern};
use ratatui::crossterm::style::ContentStyle;
use std::ops::Range;

/// Direction of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Reverse,
}

impl SearchDirection {
    /// Character shown in the search prompt
    pub fn prompt_char(self) -> char {
        match self {
            SearchDirection::Forward => '/',
            SearchDirection::Reverse => '?',
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }
}

/// Visible content geometry a search starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    /// Top display line
    pub first_row: u64,
    /// Content rows per page
    pub rows: u64,
}

/// One-time notices emitted when a search wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchNotice {
    ResumedFromStart,
    ResumedFromEnd,
}

impl SearchNotice {
    pub fn message(self) -> &'static str {
        match self {
            SearchNotice::ResumedFromStart => "Resuming search from SOF",
            SearchNotice::ResumedFromEnd => "Resuming search from EOF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Match on `line`; `top` is the requested (unclamped) top line
    Found {
        line: u64,
        top: u64,
        notice: Option<SearchNotice>,
    },
    NotFound {
        notice: Option<SearchNotice>,
    },
}

/// Horizontal window a line is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWindow {
    /// Columns removed from the left
    pub shift: usize,
    /// Display width in columns
    pub width: usize,
    /// Prefix lines with their number
    pub numbered: bool,
}

/// Search state: active pattern, case flag, last match and wrap bookkeeping
#[derive(Debug, Default)]
pub struct SearchEngine {
    pattern: Option<CompiledPattern>,
    case_insensitive: bool,
    last_match: Option<u64>,
    direction: SearchDirection,
    wrapped: bool,
}

impl SearchEngine {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            case_insensitive,
            ..Self::default()
        }
    }

    /// Compile a typed pattern.
    ///
    /// Returns `Ok(false)` when an empty pattern reuses the active one. On failure the
    /// previous pattern and search state are left untouched.
    pub fn re_compile(&mut self, pattern: &str) -> Result<bool> {
        if pattern.is_empty() {
            return match self.pattern {
                Some(_) => Ok(false),
                None => Err(RlpagerError::pattern("No previous pattern")),
            };
        }

        let (forced, body) = split_case_prefix(pattern);
        let compiled = CompiledPattern::compile(body, forced || self.case_insensitive)?;
        if forced {
            self.case_insensitive = true;
        }
        self.pattern = Some(compiled);
        Ok(true)
    }

    /// Forget the match position and wrap state
    pub fn reset(&mut self) {
        self.last_match = None;
        self.wrapped = false;
    }

    pub fn clear_pattern(&mut self) {
        self.pattern = None;
        self.reset();
    }

    /// Flip case sensitivity and recompile the active pattern; returns the new flag
    pub fn toggle_case(&mut self) -> Result<bool> {
        self.case_insensitive = !self.case_insensitive;
        if let Some(active) = &self.pattern {
            let recompiled = CompiledPattern::compile(active.text(), self.case_insensitive)?;
            self.pattern = Some(recompiled);
        }
        Ok(self.case_insensitive)
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Active pattern with its `(?i)` prefix when case-insensitive
    pub fn pattern_text(&self) -> Option<String> {
        self.pattern.as_ref().map(CompiledPattern::display_text)
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: SearchDirection) {
        self.direction = direction;
    }

    pub fn last_match(&self) -> Option<u64> {
        self.last_match
    }

    /// First and last matching lines on `[start, end)`, or `(0, 0)`
    pub fn scan_page(&self, source: &dyn LineSource, start: u64, end: u64) -> (u64, u64) {
        let Some(pattern) = &self.pattern else {
            return (0, 0);
        };
        let end = end.min(source.line_count());
        let mut first = 0;
        let mut last = 0;

        for n in start.max(1)..end {
            let Some(line) = source.read_line(n) else {
                continue;
            };
            if pattern.is_match(&line) {
                if first == 0 {
                    first = n;
                }
                last = n;
            }
        }
        (first, last)
    }

    /// Search for `pattern` page by page from the current view
    pub fn search_file(
        &mut self,
        source: &dyn LineSource,
        pattern: &str,
        direction: SearchDirection,
        is_repeat: bool,
        page: PageGeometry,
    ) -> Result<SearchOutcome> {
        if pattern.is_empty() {
            self.re_compile(pattern)?;
        } else if self.pattern_text().as_deref() != Some(pattern) {
            self.re_compile(pattern)?;
            self.reset();
        }

        let rows = page.rows.max(1);
        let line_count = source.line_count();
        let repeat = is_repeat && self.last_match.is_some();
        let mut notice = None;

        let found = match direction {
            SearchDirection::Forward => {
                let mut start = if repeat {
                    page.first_row.saturating_add(rows)
                } else {
                    page.first_row
                };
                loop {
                    if start >= line_count {
                        if self.wrapped {
                            break None;
                        }
                        self.wrapped = true;
                        notice = Some(SearchNotice::ResumedFromStart);
                        start = 1;
                        if start >= line_count {
                            break None;
                        }
                    }
                    let end = start.saturating_add(rows).min(line_count);
                    let (first, _) = self.scan_page(source, start, end);
                    if first != 0 {
                        break Some(first);
                    }
                    start = end;
                }
            }
            SearchDirection::Reverse => {
                let mut end = if repeat {
                    page.first_row
                } else {
                    page.first_row.saturating_add(rows).min(line_count)
                };
                loop {
                    if end <= 1 {
                        if self.wrapped {
                            break None;
                        }
                        self.wrapped = true;
                        notice = Some(SearchNotice::ResumedFromEnd);
                        end = line_count;
                        if end <= 1 {
                            break None;
                        }
                    }
                    let start = end.saturating_sub(rows).max(1);
                    let (_, last) = self.scan_page(source, start, end);
                    if last != 0 {
                        break Some(last);
                    }
                    end = start;
                }
            }
        };

        let Some(line) = found else {
            log::debug!("pattern {:?} not found", self.pattern_text());
            return Ok(SearchOutcome::NotFound { notice });
        };

        let top = match (repeat, direction) {
            (false, _) => line.saturating_sub(rows / 2),
            (true, SearchDirection::Forward) => line.saturating_sub(rows / 8),
            (true, SearchDirection::Reverse) => (line + 1 + rows / 8).saturating_sub(rows),
        };
        self.last_match = Some(line);
        Ok(SearchOutcome::Found { line, top, notice })
    }

    /// Render one content line into `window`, highlighting every match.
    ///
    /// When a match lies outside the visible columns the whole visible slice is tinted.
    pub fn replace_match(
        &self,
        line_no: u64,
        text: &str,
        window: LineWindow,
        theme: &Theme,
    ) -> String {
        let mut out = String::new();
        let mut available = window.width;
        if window.numbered {
            let number = format!("{:>width$} ", line_no, width = LINE_NUMBER_WIDTH - 1);
            available = available.saturating_sub(LINE_NUMBER_WIDTH);
            out.push_str(&paint(theme.line_number, &number));
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let visible_start = window.shift.min(chars.len());
        let visible_end = window.shift.saturating_add(available).min(chars.len());

        let Some(pattern) = &self.pattern else {
            out.extend(chars[visible_start..visible_end].iter().map(|(_, c)| *c));
            return out;
        };

        let to_column = |byte: usize| chars.partition_point(|(offset, _)| *offset < byte);
        let matches: Vec<Range<usize>> = pattern
            .find_all(text)
            .into_iter()
            .map(|r| to_column(r.start)..to_column(r.end))
            .collect();
        let window_end = window.shift.saturating_add(available);
        let off_screen = matches
            .iter()
            .any(|m| m.start < window.shift || m.end > window_end);

        let base = if off_screen {
            theme.off_screen
        } else {
            ContentStyle::new()
        };

        let mut segment = String::new();
        let mut segment_hit = false;
        for column in visible_start..visible_end {
            let hit = matches.iter().any(|m| m.contains(&column));
            if hit != segment_hit && !segment.is_empty() {
                let style = if segment_hit { theme.search_match } else { base };
                out.push_str(&paint(style, &segment));
                segment.clear();
            }
            segment_hit = hit;
            segment.push(chars[column].1);
        }
        if !segment.is_empty() {
            let style = if segment_hit { theme.search_match } else { base };
            out.push_str(&paint(style, &segment));
        }
        out
    }
}
