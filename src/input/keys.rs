//! Key translation.
//!
//! Special keys (arrows, home/end, page up/down) arrive from crossterm already decoded;
//! [`command_code`] folds them into the single-byte codes the command table is written
//! in. [`encode_key`] goes the other way, producing the bytes a child process on a
//! pseudo-terminal expects for a key.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const ESC: u8 = 0x1b;
pub const ENTER: u8 = b'\r';
pub const BACKSPACE: u8 = 0x7f;

/// Control chord for an ASCII letter
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

/// Single-byte command code for a key, if it has one
pub fn command_code(key: &KeyEvent) -> Option<u8> {
    let code = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            ctrl(c.to_ascii_lowercase() as u8)
        }
        KeyCode::Char(c) if c.is_ascii() && !key.modifiers.contains(KeyModifiers::ALT) => c as u8,
        KeyCode::Up => b'k',
        KeyCode::Down => b'j',
        KeyCode::Left => b'<',
        KeyCode::Right => b'>',
        KeyCode::Home => b'g',
        KeyCode::End => b'G',
        KeyCode::PageUp => b'b',
        KeyCode::PageDown => b' ',
        KeyCode::Enter => ENTER,
        KeyCode::Backspace => BACKSPACE,
        KeyCode::Tab => b'\t',
        KeyCode::Esc => ESC,
        _ => return None,
    };
    Some(code)
}

/// Bytes to forward to a terminal application for `key`
pub fn encode_key(key: &KeyEvent) -> Vec<u8> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if c.is_ascii_alphabetic() {
                vec![ctrl(c.to_ascii_lowercase() as u8)]
            } else {
                Vec::new()
            }
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf).as_bytes().to_vec();
            if key.modifiers.contains(KeyModifiers::ALT) {
                let mut out = vec![ESC];
                out.extend(encoded);
                out
            } else {
                encoded
            }
        }
        KeyCode::Enter => vec![ENTER],
        KeyCode::Backspace => vec![BACKSPACE],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::Esc => vec![ESC],
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        _ => Vec::new(),
    }
}
