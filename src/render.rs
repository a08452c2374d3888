//! Rendering: the viewport paging engine and the ANSI screen it draws on.
//!
//! - [`viewport`] computes visible ranges, scrolls, shifts and runs scroll-mode ticks
//! - [`screen`] queues crossterm commands on any `Write`
//! - [`terminal`] owns raw mode and guarantees the terminal is restored

pub mod screen;
pub mod scroll_mode;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod viewport;

pub use screen::Screen;
pub use scroll_mode::{ScrollMode, TickAction};
pub use state::{MessageKind, StatusLine, ViewState};
pub use terminal::TerminalGuard;
pub use theme::Theme;
pub use viewport::{RenderContext, Viewport};
