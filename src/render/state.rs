//! Viewport and status line state
//!
//! Display line 0 is the SOF header and display line `line_count` is the EOF marker;
//! content lines sit in between. A file with `line_count` index entries therefore has
//! `line_count + 1` display lines.

use crate::render::scroll_mode::ScrollMode;
use crate::session::MARK_COUNT;

/// Columns taken by the line number prefix
pub const LINE_NUMBER_WIDTH: usize = 8;

/// Visible range, geometry, horizontal shift, scroll mode and marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Top display line
    pub first_row: u64,

    /// Bottom display line (inclusive)
    pub last_row: u64,

    /// Columns hidden on the left, a multiple of the shift increment
    pub shift: usize,

    pub mode: ScrollMode,

    /// Top lines for marks 1 through 9
    pub marks: [u64; MARK_COUNT],

    /// Terminal width
    pub cols: u16,

    /// Terminal height, status line included
    pub rows: u16,

    pub show_line_numbers: bool,

    /// A downward move was attempted on the last page
    pub eof_shown: bool,

    /// Screen content matches `first_row..=last_row`
    pub screen_valid: bool,

    /// Index size when the page was last painted
    pub painted_line_count: u64,
}

impl ViewState {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            first_row: 0,
            last_row: 0,
            shift: 0,
            mode: ScrollMode::None,
            marks: [0; MARK_COUNT],
            cols,
            rows,
            show_line_numbers: false,
            eof_shown: false,
            screen_valid: false,
            painted_line_count: 0,
        }
    }

    /// Content rows per page
    pub fn page_rows(&self) -> u64 {
        u64::from(self.rows.saturating_sub(1).max(1))
    }

    /// Largest top line that still fills the page
    pub fn max_top(&self, line_count: u64) -> u64 {
        (line_count + 1).saturating_sub(self.page_rows())
    }

    pub fn clamp_top(&self, top: u64, line_count: u64) -> u64 {
        top.min(self.max_top(line_count))
    }

    /// The last page is showing
    pub fn at_last_page(&self, line_count: u64) -> bool {
        self.first_row >= self.max_top(line_count)
    }

    /// The EOF marker row is on screen
    pub fn eof_visible(&self) -> bool {
        self.screen_valid && self.last_row >= self.painted_line_count
    }

    /// Store the current top line in mark `digit` (1-9)
    pub fn set_mark(&mut self, digit: u8) -> bool {
        match Self::slot(digit) {
            Some(slot) => {
                self.marks[slot] = self.first_row;
                true
            }
            None => false,
        }
    }

    pub fn mark(&self, digit: u8) -> Option<u64> {
        Self::slot(digit).map(|slot| self.marks[slot])
    }

    fn slot(digit: u8) -> Option<usize> {
        (1..=MARK_COUNT as u8)
            .contains(&digit)
            .then(|| usize::from(digit - 1))
    }

    /// Apply a new terminal size; returns true if it changed
    pub fn resize(&mut self, cols: u16, rows: u16) -> bool {
        let changed = self.cols != cols || self.rows != rows;
        if changed {
            self.cols = cols;
            self.rows = rows;
            self.screen_valid = false;
        }
        changed
    }

    /// Back to the top of a new file; geometry and the line number toggle are kept
    pub fn reset_for_new_file(&mut self) {
        self.first_row = 0;
        self.last_row = 0;
        self.shift = 0;
        self.mode = ScrollMode::None;
        self.marks = [0; MARK_COUNT];
        self.eof_shown = false;
        self.screen_valid = false;
        self.painted_line_count = 0;
    }
}

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Alert,
}

/// Transient message shown instead of the position summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    message: Option<(String, MessageKind)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.message = Some((single_line(&message.into()), MessageKind::Info));
    }

    pub fn set_alert(&mut self, message: impl Into<String>) {
        self.message = Some((single_line(&message.into()), MessageKind::Alert));
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<(&str, MessageKind)> {
        self.message.as_ref().map(|(text, kind)| (text.as_str(), *kind))
    }

    /// Status text for the current view
    pub fn format(&self, title: &str, view: &ViewState, line_count: u64) -> (String, MessageKind) {
        if let Some((text, kind)) = &self.message {
            return (text.clone(), *kind);
        }
        (
            format_position(title, view, line_count),
            MessageKind::Info,
        )
    }
}

/// Multi-line messages (regex parse errors) collapse onto the status row
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `title  lines a-b/total pct%` plus mode and shift indicators
pub fn format_position(title: &str, view: &ViewState, line_count: u64) -> String {
    let total = line_count.saturating_sub(1);
    let mut status = if total == 0 {
        format!("{}  (empty)", title)
    } else {
        let first = view.first_row.max(1).min(total);
        let last = view.last_row.min(total).max(first);
        let percent = last * 100 / total;
        let mut text = format!("{}  lines {}-{}/{} {}%", title, first, last, total, percent);
        if view.last_row >= line_count {
            text.push_str(" (END)");
        }
        text
    };

    if view.shift > 0 {
        status.push_str(&format!("  col {}", view.shift + 1));
    }
    if let Some(label) = view.mode.label() {
        status.push_str(&format!("  [{}]", label));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_fit_one_row() {
        let mut status = StatusLine::new();
        status.set_alert("regex parse error:\n    (oops\n    ^\nerror: unclosed group");
        assert_eq!(
            status.message(),
            Some((
                "regex parse error: (oops ^ error: unclosed group",
                MessageKind::Alert
            ))
        );
    }

    #[test]
    fn test_max_top_and_clamp() {
        // 24 terminal rows -> 23 content rows
        let view = ViewState::new(80, 24);
        assert_eq!(view.page_rows(), 23);

        // 1000 content lines: display lines 0..=1001
        assert_eq!(view.max_top(1001), 979);
        assert_eq!(view.clamp_top(5000, 1001), 979);
        assert_eq!(view.clamp_top(10, 1001), 10);

        // short file never scrolls
        assert_eq!(view.max_top(5), 0);
    }

    #[test]
    fn test_marks() {
        let mut view = ViewState::new(80, 24);
        view.first_row = 42;
        assert!(view.set_mark(3));
        assert!(!view.set_mark(0));
        assert!(!view.set_mark(10));

        view.first_row = 7;
        assert_eq!(view.mark(3), Some(42));
        assert_eq!(view.mark(4), Some(0));
        assert_eq!(view.mark(0), None);
    }

    #[test]
    fn test_resize_invalidates_screen() {
        let mut view = ViewState::new(80, 24);
        view.screen_valid = true;
        assert!(!view.resize(80, 24));
        assert!(view.screen_valid);
        assert!(view.resize(100, 30));
        assert!(!view.screen_valid);
        assert_eq!(view.page_rows(), 29);
    }

    #[test]
    fn test_status_position_format() {
        let mut view = ViewState::new(80, 11);
        view.first_row = 0;
        view.last_row = 9;
        assert_eq!(
            format_position("app.log", &view, 101),
            "app.log  lines 1-9/100 9%"
        );

        view.first_row = 92;
        view.last_row = 101;
        view.mode = ScrollMode::Tail;
        assert_eq!(
            format_position("app.log", &view, 101),
            "app.log  lines 92-100/100 100% (END)  [tail]"
        );

        assert_eq!(
            format_position("empty.log", &ViewState::new(80, 24), 1),
            "empty.log  (empty)"
        );
    }

    #[test]
    fn test_status_message_overrides_position() {
        let mut status = StatusLine::new();
        let view = ViewState::new(80, 24);
        status.set_alert("Pattern not found");
        assert_eq!(
            status.format("a", &view, 10),
            ("Pattern not found".to_string(), MessageKind::Alert)
        );
        status.clear();
        assert_eq!(status.format("a", &view, 10).1, MessageKind::Info);
    }
}
