//! Video attributes used for headers, status messages and match highlights
//!
//! The palette is deliberately small: bold, reverse, blink and two status colors, plus a
//! tint for lines whose matches lie outside the horizontal window.

use ratatui::crossterm::style::{Attribute, Color, ContentStyle};

fn style(fg: Option<Color>, bg: Option<Color>, attributes: &[Attribute]) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = fg;
    style.background_color = bg;
    for attribute in attributes {
        style.attributes.set(*attribute);
    }
    style
}

/// Styles applied by the screen and the search highlighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Title header (display line 0)
    pub header: ContentStyle,

    /// Search match highlighting
    pub search_match: ContentStyle,

    /// End-of-file marker
    pub eof_marker: ContentStyle,

    /// Informational status line (position, file info)
    pub status_info: ContentStyle,

    /// Alert status line (errors, "pattern not found", wrap notices)
    pub status_alert: ContentStyle,

    /// Whole-line tint when a match is shifted out of view
    pub off_screen: ContentStyle,

    /// Line number column
    pub line_number: ContentStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: style(None, None, &[Attribute::Bold]),
            search_match: style(None, None, &[Attribute::Reverse]),
            eof_marker: style(None, None, &[Attribute::Reverse]),
            status_info: style(Some(Color::White), Some(Color::Blue), &[]),
            status_alert: style(
                Some(Color::Black),
                Some(Color::Yellow),
                &[Attribute::SlowBlink],
            ),
            off_screen: style(Some(Color::Yellow), None, &[]),
            line_number: style(Some(Color::DarkGrey), None, &[]),
        }
    }
}

impl Theme {
    /// Attribute-only palette for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            header: style(None, None, &[Attribute::Bold]),
            search_match: style(None, None, &[Attribute::Reverse]),
            eof_marker: style(None, None, &[Attribute::Reverse]),
            status_info: style(None, None, &[Attribute::Reverse]),
            status_alert: style(None, None, &[Attribute::Reverse, Attribute::SlowBlink]),
            off_screen: style(None, None, &[Attribute::Underlined]),
            line_number: ContentStyle::new(),
        }
    }

    pub fn for_config(monochrome: bool) -> Self {
        if monochrome {
            Self::monochrome()
        } else {
            Self::default()
        }
    }
}

/// Render `text` with `style` as an ANSI string
pub fn paint(style: ContentStyle, text: &str) -> String {
    if style == ContentStyle::new() {
        return text.to_string();
    }
    style.apply(text).to_string()
}
