//! Viewport / paging engine.
//!
//! The viewport owns the [`ViewState`] and turns paging requests into screen updates.
//! Every request goes through [`Viewport::print_page`], which clamps the requested top
//! line, then either scrolls the content region (when the move is a short pure shift of
//! an unchanged page) or repaints every row.

use crate::error::Result;
use crate::file_handler::LineSource;
use crate::render::scroll_mode::{ScrollMode, TickAction};
use crate::render::screen::{truncate, Screen};
use crate::render::state::{MessageKind, StatusLine, ViewState, LINE_NUMBER_WIDTH};
use crate::render::theme::{paint, Theme};
use crate::search::{LineWindow, SearchEngine};
use std::io::Write;

/// Marker drawn for the EOF sentinel line
pub const EOF_MARKER: &str = "(END)";

/// Everything a repaint reads besides the view state
pub struct RenderContext<'a> {
    pub source: &'a dyn LineSource,
    pub search: &'a SearchEngine,
    pub theme: &'a Theme,
    pub title: &'a str,
    pub status: &'a StatusLine,
}

/// Smallest multiple of `increment` that brings a line `longest` columns wide within
/// `width`; 0 if it already fits
pub fn shift_for_longest(longest: usize, width: usize, increment: usize) -> usize {
    if longest <= width {
        return 0;
    }
    let increment = increment.max(1);
    let needed = longest - width;
    needed.div_ceil(increment) * increment
}

#[derive(Debug, Clone)]
pub struct Viewport {
    state: ViewState,
    shift_increment: usize,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, shift_increment: usize) -> Self {
        Self {
            state: ViewState::new(cols, rows),
            shift_increment: shift_increment.max(1),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn first_row(&self) -> u64 {
        self.state.first_row
    }

    pub fn page_rows(&self) -> u64 {
        self.state.page_rows()
    }

    pub fn mode(&self) -> ScrollMode {
        self.state.mode
    }

    pub fn set_mode(&mut self, mode: ScrollMode) {
        self.state.mode = mode;
    }

    /// Display `top` (clamped) and update the visible range
    pub fn print_page<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
        top: u64,
    ) -> Result<()> {
        let line_count = ctx.source.line_count();
        let rows = self.state.page_rows();
        let top = self.state.clamp_top(top, line_count);
        let bottom = (top + rows).min(line_count + 1);
        let old_top = self.state.first_row;
        let distance = top.abs_diff(old_top);

        let incremental = self.state.screen_valid
            && self.state.painted_line_count == line_count
            && distance > 0
            && distance < rows;

        if incremental {
            if top > old_top {
                screen.scroll_content_up(distance as u16)?;
                for row in (rows - distance)..rows {
                    self.draw_display_line(screen, ctx, row, top + row, bottom)?;
                }
            } else {
                screen.scroll_content_down(distance as u16)?;
                for row in 0..distance {
                    self.draw_display_line(screen, ctx, row, top + row, bottom)?;
                }
            }
        } else {
            for row in 0..rows {
                self.draw_display_line(screen, ctx, row, top + row, bottom)?;
            }
        }

        self.state.first_row = top;
        self.state.last_row = bottom - 1;
        self.state.painted_line_count = line_count;
        self.state.screen_valid = true;

        self.draw_status(screen, ctx)?;
        screen.flush()
    }

    /// Full repaint of the current page
    pub fn repaint<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        self.state.screen_valid = false;
        self.print_page(screen, ctx, self.state.first_row)
    }

    /// Move down by up to `n` lines; returns how far the view moved
    pub fn scroll_down<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
        n: u64,
    ) -> Result<u64> {
        let max_top = self.state.max_top(ctx.source.line_count());
        if self.state.first_row >= max_top {
            self.state.eof_shown = true;
            return Ok(0);
        }
        let target = self.state.first_row.saturating_add(n).min(max_top);
        let moved = target - self.state.first_row;
        self.print_page(screen, ctx, target)?;
        Ok(moved)
    }

    /// Move up by up to `n` lines; returns how far the view moved
    pub fn scroll_up<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
        n: u64,
    ) -> Result<u64> {
        if self.state.first_row == 0 {
            return Ok(0);
        }
        let target = self.state.first_row.saturating_sub(n);
        let moved = self.state.first_row - target;
        self.print_page(screen, ctx, target)?;
        Ok(moved)
    }

    pub fn shift_right<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        self.state.shift = self.state.shift.saturating_add(self.shift_increment);
        self.repaint(screen, ctx)
    }

    pub fn shift_left<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        self.state.shift = self.state.shift.saturating_sub(self.shift_increment);
        self.repaint(screen, ctx)
    }

    pub fn shift_home<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        self.state.shift = 0;
        self.repaint(screen, ctx)
    }

    /// Shift needed to bring the end of the longest visible line into view
    pub fn longest_shift(&self, source: &dyn LineSource) -> usize {
        let last_content = source.line_count().saturating_sub(1);
        let longest = (self.state.first_row.max(1)..=self.state.last_row.min(last_content))
            .filter_map(|n| source.read_line(n))
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let numbers = if self.state.show_line_numbers {
            LINE_NUMBER_WIDTH
        } else {
            0
        };
        shift_for_longest(
            longest + numbers,
            usize::from(self.state.cols),
            self.shift_increment,
        )
    }

    /// Apply [`Viewport::longest_shift`] and repaint; returns the new shift
    pub fn shift_to_longest<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<usize> {
        self.state.shift = self.longest_shift(ctx.source);
        self.repaint(screen, ctx)?;
        Ok(self.state.shift)
    }

    pub fn toggle_line_numbers<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<bool> {
        self.state.show_line_numbers = !self.state.show_line_numbers;
        self.repaint(screen, ctx)?;
        Ok(self.state.show_line_numbers)
    }

    pub fn set_mark(&mut self, digit: u8) -> bool {
        self.state.set_mark(digit)
    }

    pub fn mark(&self, digit: u8) -> Option<u64> {
        self.state.mark(digit)
    }

    /// Record a new terminal size on both the view and the screen
    pub fn resize<W: Write>(&mut self, screen: &mut Screen<W>, cols: u16, rows: u16) -> bool {
        screen.resize(cols, rows);
        self.state.resize(cols, rows)
    }

    /// One clock tick of the active scroll mode
    pub fn tick<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        let line_count = ctx.source.line_count();
        let grew = line_count != self.state.painted_line_count;

        match self.state.mode.tick_action() {
            TickAction::Idle => {
                if self.state.eof_visible() && grew {
                    self.print_page(screen, ctx, self.state.first_row)?;
                }
            }
            TickAction::ScrollDown => {
                if self.scroll_down(screen, ctx, 1)? == 0 {
                    self.stop_at_boundary(screen, ctx)?;
                }
            }
            TickAction::ScrollUp => {
                if self.scroll_up(screen, ctx, 1)? == 0 {
                    self.stop_at_boundary(screen, ctx)?;
                }
            }
            TickAction::RepaintAtEof => {
                if grew || !self.state.screen_valid || !self.state.at_last_page(line_count) {
                    self.print_page(screen, ctx, line_count)?;
                }
            }
            TickAction::ScrollAtEof => {
                if !self.state.at_last_page(line_count) {
                    self.scroll_down(screen, ctx, 1)?;
                } else if grew || !self.state.screen_valid {
                    self.print_page(screen, ctx, self.state.first_row)?;
                }
            }
        }
        Ok(())
    }

    fn stop_at_boundary<W: Write>(
        &mut self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        self.state.mode = self.state.mode.at_boundary();
        self.draw_status(screen, ctx)?;
        screen.flush()
    }

    pub fn draw_status<W: Write>(
        &self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        let (text, kind) = ctx
            .status
            .format(ctx.title, &self.state, ctx.source.line_count());
        let style = match kind {
            MessageKind::Info => ctx.theme.status_info,
            MessageKind::Alert => ctx.theme.status_alert,
        };
        screen.draw_status(&text, style)
    }

    /// Text for display line `line`
    pub fn render_line(&self, ctx: &RenderContext<'_>, line: u64) -> String {
        let width = usize::from(self.state.cols);
        let line_count = ctx.source.line_count();

        if line == 0 {
            let header = format!("File: {}", ctx.title);
            return paint(ctx.theme.header, truncate(&header, width));
        }
        if line >= line_count {
            return paint(ctx.theme.eof_marker, truncate(EOF_MARKER, width));
        }

        let text = ctx.source.read_line(line).unwrap_or_default();
        let window = LineWindow {
            shift: self.state.shift,
            width,
            numbered: self.state.show_line_numbers,
        };
        ctx.search.replace_match(line, &text, window, ctx.theme)
    }

    fn draw_display_line<W: Write>(
        &self,
        screen: &mut Screen<W>,
        ctx: &RenderContext<'_>,
        row: u64,
        line: u64,
        bottom: u64,
    ) -> Result<()> {
        let row = row as u16;
        if line >= bottom {
            return screen.clear_row(row);
        }
        let text = self.render_line(ctx, line);
        screen.draw_row(row, &text)
    }
}
