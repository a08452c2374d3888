//! ANSI output surface for the pager.
//!
//! `Screen` wraps any `Write` and queues crossterm commands for cursor positioning,
//! scroll regions, line clears and the status row. Nothing reaches the terminal until
//! [`Screen::flush`].

use crate::error::{Result, RlpagerError};
use crate::render::theme::paint;
use ratatui::crossterm::{
    cursor::{Hide, MoveTo, RestorePosition, SavePosition, Show},
    queue,
    style::{ContentStyle, Print},
    terminal::{Clear, ClearType, ScrollDown, ScrollUp},
    Command,
};
use std::fmt;
use std::io::Write;

/// DECSTBM: confine scrolling to rows `top..=bottom` (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScrollRegion(pub u16, pub u16);

impl Command for SetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b[{};{}r", self.0 + 1, self.1 + 1)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Restore the full-screen scroll region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetScrollRegion;

impl Command for ResetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[r")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Cut `text` to at most `width` characters
pub fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Terminal output with a fixed geometry; the last row is the status line
pub struct Screen<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        Self { out, cols, rows }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Rows available for file content
    pub fn content_rows(&self) -> u16 {
        self.rows.saturating_sub(1).max(1)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Replace row `row` with pre-rendered `text`
    pub fn draw_row(&mut self, row: u16, text: &str) -> Result<()> {
        queue!(
            self.out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            Print(text)
        )
        .map_err(RlpagerError::terminal_io)
    }

    pub fn clear_row(&mut self, row: u16) -> Result<()> {
        queue!(self.out, MoveTo(0, row), Clear(ClearType::CurrentLine))
            .map_err(RlpagerError::terminal_io)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0)).map_err(RlpagerError::terminal_io)
    }

    /// Scroll the content region up by `n` rows, exposing blank rows at the bottom
    pub fn scroll_content_up(&mut self, n: u16) -> Result<()> {
        let bottom = self.content_rows() - 1;
        queue!(
            self.out,
            SavePosition,
            SetScrollRegion(0, bottom),
            ScrollUp(n),
            ResetScrollRegion,
            RestorePosition
        )
        .map_err(RlpagerError::terminal_io)
    }

    /// Scroll the content region down by `n` rows, exposing blank rows at the top
    pub fn scroll_content_down(&mut self, n: u16) -> Result<()> {
        let bottom = self.content_rows() - 1;
        queue!(
            self.out,
            SavePosition,
            SetScrollRegion(0, bottom),
            ScrollDown(n),
            ResetScrollRegion,
            RestorePosition
        )
        .map_err(RlpagerError::terminal_io)
    }

    /// Draw the status line in `style`, padded to the full width
    pub fn draw_status(&mut self, text: &str, style: ContentStyle) -> Result<()> {
        let width = usize::from(self.cols);
        let text = truncate(text, width);
        let padded = format!("{:<width$}", text, width = width);
        queue!(
            self.out,
            MoveTo(0, self.rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            Print(paint(style, &padded))
        )
        .map_err(RlpagerError::terminal_io)
    }

    /// Draw a prompt on the status line and leave the cursor after it
    pub fn draw_prompt(&mut self, prompt: &str, buffer: &str) -> Result<()> {
        let width = usize::from(self.cols).saturating_sub(1);
        let line = format!("{}{}", prompt, buffer);
        // keep the tail visible while typing
        let skip = line.chars().count().saturating_sub(width);
        let visible: String = line.chars().skip(skip).collect();
        queue!(
            self.out,
            MoveTo(0, self.rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            Print(visible),
            Show
        )
        .map_err(RlpagerError::terminal_io)
    }

    pub fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.out, Hide).map_err(RlpagerError::terminal_io)
    }

    /// Write raw bytes (filter output)
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes).map_err(RlpagerError::terminal_io)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(RlpagerError::terminal_io)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(screen: &Screen<Vec<u8>>) -> String {
        String::from_utf8_lossy(screen.writer()).into_owned()
    }

    #[test]
    fn test_scroll_region_commands() {
        let mut ansi = String::new();
        SetScrollRegion(0, 22).write_ansi(&mut ansi).unwrap();
        assert_eq!(ansi, "\x1b[1;23r");

        let mut ansi = String::new();
        ResetScrollRegion.write_ansi(&mut ansi).unwrap();
        assert_eq!(ansi, "\x1b[r");
    }

    #[test]
    fn test_truncate_by_characters() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 10), "hi");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_draw_row_positions_and_clears() {
        let mut screen = Screen::new(Vec::new(), 80, 24);
        screen.draw_row(4, "text").unwrap();
        let out = output(&screen);
        // MoveTo is 1-indexed on the wire
        assert!(out.starts_with("\x1b[5;1H"));
        assert!(out.ends_with("text"));
    }

    #[test]
    fn test_scroll_uses_content_region() {
        let mut screen = Screen::new(Vec::new(), 80, 24);
        screen.scroll_content_up(2).unwrap();
        let out = output(&screen);
        assert!(out.contains("\x1b[1;23r"));
        assert!(out.contains("\x1b[2S"));
        assert!(out.contains("\x1b[r"));
    }

    #[test]
    fn test_status_is_padded_to_width() {
        let mut screen = Screen::new(Vec::new(), 10, 5);
        screen.draw_status("abc", ContentStyle::new()).unwrap();
        let out = output(&screen);
        assert!(out.starts_with("\x1b[5;1H"));
        assert!(out.ends_with("abc       "));
    }
}
