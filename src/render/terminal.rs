//! Raw-mode lifecycle for the controlling terminal.
//!
//! The terminal must never be left in raw mode: `TerminalGuard` restores it on drop and
//! the panic hook restores it before the panic message is printed.

use crate::error::{Result, RlpagerError};
use crate::render::screen::ResetScrollRegion;
use ratatui::crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::panic;

/// Current terminal size as `(cols, rows)`
pub fn terminal_size() -> Result<(u16, u16)> {
    ratatui::crossterm::terminal::size()
        .map_err(|e| RlpagerError::terminal("cannot read terminal size", e))
}

/// Leave raw mode and the alternate screen. Safe to call more than once.
pub fn restore_terminal() -> Result<()> {
    let _ = execute!(io::stdout(), ResetScrollRegion, Show);
    execute!(io::stdout(), LeaveAlternateScreen)
        .map_err(|e| RlpagerError::terminal("failed to leave alternate screen", e))?;
    disable_raw_mode().map_err(|e| RlpagerError::terminal("failed to disable raw mode", e))
}

/// Restore the terminal before the default panic output
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Raw mode + alternate screen for as long as the guard lives
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().map_err(|e| RlpagerError::terminal("failed to enable raw mode", e))?;
        let guard = Self { active: true };
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .map_err(|e| RlpagerError::terminal("failed to enter alternate screen", e))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = restore_terminal();
            self.active = false;
        }
    }
}
