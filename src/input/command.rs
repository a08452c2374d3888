//! Command table: maps single-byte command codes to pager commands.
//!
//! Mark commands take a digit argument, so decoding is stateful: `m` and `'` leave the
//! decoder waiting for the next key.

use crate::input::keys::{ctrl, ENTER};
use crate::render::ScrollMode;
use crate::search::SearchDirection;
use crate::session::MARK_COUNT;

/// A decoded pager command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LineDown,
    LineUp,
    PageDown,
    PageUp,
    HalfPageDown,
    HalfPageUp,
    ShiftRight,
    ShiftLeft,
    ShiftHome,
    ShiftLongest,
    GoToStart,
    GoToEnd,
    GoToLine,
    ToggleLineNumbers,
    ToggleMode(ScrollMode),
    SetMark(u8),
    JumpToMark(u8),
    Search(SearchDirection),
    RepeatSearch,
    RepeatSearchReverse,
    ToggleCase,
    ShowPattern,
    ClearPattern,
    Filter,
    OpenFile,
    Help,
    Redraw,
    FileInfo,
    /// Leave the current file; `unwind` also abandons the rest of the file list
    Quit { save_session: bool, unwind: bool },
}

impl Command {
    /// Commands that leave an active scroll mode running
    pub fn keeps_scroll_mode(&self) -> bool {
        matches!(
            self,
            Command::Redraw | Command::FileInfo | Command::ToggleMode(_)
        )
    }
}

/// Result of feeding one command code to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Command(Command),
    /// Waiting for the argument of a prefix key
    Pending,
    /// Key with no binding, or a bad prefix argument
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    SetMark,
    JumpToMark,
}

/// Stateful command decoder
#[derive(Debug, Default)]
pub struct KeyDecoder {
    prefix: Option<Prefix>,
}

/// Mark digit for a key, `1..=MARK_COUNT`
fn mark_digit(code: u8) -> Option<u8> {
    let digit = code.checked_sub(b'0')?;
    (1..=MARK_COUNT as u8).contains(&digit).then_some(digit)
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.prefix.is_some()
    }

    pub fn reset(&mut self) {
        self.prefix = None;
    }

    pub fn decode(&mut self, code: u8) -> Decoded {
        if let Some(prefix) = self.prefix.take() {
            return match (prefix, mark_digit(code)) {
                (Prefix::SetMark, Some(d)) => Decoded::Command(Command::SetMark(d)),
                (Prefix::JumpToMark, Some(d)) => Decoded::Command(Command::JumpToMark(d)),
                _ => Decoded::Unknown(code),
            };
        }

        let command = match code {
            b'j' | ENTER | b'\n' => Command::LineDown,
            c if c == ctrl(b'e') || c == ctrl(b'n') => Command::LineDown,
            b'k' => Command::LineUp,
            c if c == ctrl(b'y') || c == ctrl(b'p') => Command::LineUp,
            b' ' | b'f' => Command::PageDown,
            c if c == ctrl(b'f') => Command::PageDown,
            b'b' => Command::PageUp,
            c if c == ctrl(b'b') => Command::PageUp,
            b'd' => Command::HalfPageDown,
            c if c == ctrl(b'd') => Command::HalfPageDown,
            b'u' => Command::HalfPageUp,
            c if c == ctrl(b'u') => Command::HalfPageUp,
            b'>' => Command::ShiftRight,
            b'<' => Command::ShiftLeft,
            b'^' => Command::ShiftHome,
            b'$' => Command::ShiftLongest,
            b'g' => Command::GoToStart,
            b'G' => Command::GoToEnd,
            b':' => Command::GoToLine,
            b'#' => Command::ToggleLineNumbers,
            b'c' => Command::ToggleMode(ScrollMode::ContinuousDown),
            b'C' => Command::ToggleMode(ScrollMode::ContinuousUp),
            b't' => Command::ToggleMode(ScrollMode::Tail),
            b'F' => Command::ToggleMode(ScrollMode::Follow),
            b'm' => {
                self.prefix = Some(Prefix::SetMark);
                return Decoded::Pending;
            }
            b'\'' => {
                self.prefix = Some(Prefix::JumpToMark);
                return Decoded::Pending;
            }
            c if mark_digit(c).is_some() => Command::JumpToMark(c - b'0'),
            b'/' => Command::Search(SearchDirection::Forward),
            b'?' => Command::Search(SearchDirection::Reverse),
            b'n' => Command::RepeatSearch,
            b'N' => Command::RepeatSearchReverse,
            b'i' => Command::ToggleCase,
            b'p' => Command::ShowPattern,
            b'P' => Command::ClearPattern,
            b'|' => Command::Filter,
            b'e' => Command::OpenFile,
            b'h' | b'H' => Command::Help,
            c if c == ctrl(b'l') => Command::Redraw,
            b'=' => Command::FileInfo,
            b'q' => Command::Quit {
                save_session: true,
                unwind: true,
            },
            b'Q' => Command::Quit {
                save_session: false,
                unwind: true,
            },
            b'x' => Command::Quit {
                save_session: true,
                unwind: false,
            },
            b'X' => Command::Quit {
                save_session: false,
                unwind: false,
            },
            other => return Decoded::Unknown(other),
        };
        Decoded::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(code: u8) -> Decoded {
        KeyDecoder::new().decode(code)
    }

    #[test]
    fn test_navigation_aliases() {
        for code in [b'j', ENTER, ctrl(b'e'), ctrl(b'n')] {
            assert_eq!(decode_one(code), Decoded::Command(Command::LineDown));
        }
        for code in [b' ', b'f', ctrl(b'f')] {
            assert_eq!(decode_one(code), Decoded::Command(Command::PageDown));
        }
        assert_eq!(decode_one(b'G'), Decoded::Command(Command::GoToEnd));
    }

    #[test]
    fn test_mark_prefix() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(b'm'), Decoded::Pending);
        assert!(decoder.is_pending());
        assert_eq!(decoder.decode(b'3'), Decoded::Command(Command::SetMark(3)));
        assert!(!decoder.is_pending());

        assert_eq!(decoder.decode(b'\''), Decoded::Pending);
        assert_eq!(
            decoder.decode(b'9'),
            Decoded::Command(Command::JumpToMark(9))
        );
    }

    #[test]
    fn test_bad_mark_argument() {
        let mut decoder = KeyDecoder::new();
        decoder.decode(b'm');
        assert_eq!(decoder.decode(b'0'), Decoded::Unknown(b'0'));
        decoder.decode(b'm');
        assert_eq!(decoder.decode(b'x'), Decoded::Unknown(b'x'));
        assert_eq!(decoder.decode(b'j'), Decoded::Command(Command::LineDown));
    }

    #[test]
    fn test_bare_digit_jumps() {
        assert_eq!(decode_one(b'4'), Decoded::Command(Command::JumpToMark(4)));
        assert_eq!(decode_one(b'0'), Decoded::Unknown(b'0'));
    }

    #[test]
    fn test_quit_variants() {
        assert_eq!(
            decode_one(b'q'),
            Decoded::Command(Command::Quit {
                save_session: true,
                unwind: true
            })
        );
        assert_eq!(
            decode_one(b'X'),
            Decoded::Command(Command::Quit {
                save_session: false,
                unwind: false
            })
        );
    }

    #[test]
    fn test_scroll_mode_persistence() {
        assert!(Command::Redraw.keeps_scroll_mode());
        assert!(Command::FileInfo.keeps_scroll_mode());
        assert!(!Command::LineDown.keeps_scroll_mode());
        assert!(!Command::Search(SearchDirection::Forward).keeps_scroll_mode());
    }
}
