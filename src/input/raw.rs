//! Low-level input collection: crossterm polling on a dedicated thread, forwarding key
//! presses and resizes to the dispatcher over an unbounded channel.

use crate::error::{Result, RlpagerError};
use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Events surfaced by the input thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
}

/// Keep key presses and resizes; drop releases, mouse and focus events
pub fn translate_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(InputEvent::Key(key)),
        Event::Resize(cols, rows) => Some(InputEvent::Resize { cols, rows }),
        _ => None,
    }
}

/// Wait up to `timeout` for the next terminal event
pub fn poll_event(timeout: Duration) -> Result<Option<InputEvent>> {
    let ready =
        event::poll(timeout).map_err(|e| RlpagerError::terminal("polling input failed", e))?;
    if !ready {
        return Ok(None);
    }
    let event = event::read().map_err(|e| RlpagerError::terminal("reading input failed", e))?;
    Ok(translate_event(event))
}

/// Spawn a blocking thread that polls for terminal events until `shutdown` is set or the
/// receiving side goes away.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputEvent>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            match poll_event(poll_interval) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("input thread stopped: {}", err);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{
        KeyCode, KeyEventState, KeyModifiers, MouseEvent, MouseEventKind,
    };

    #[test]
    fn test_key_press_is_forwarded() {
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(
            translate_event(Event::Key(key)),
            Some(InputEvent::Key(key))
        );
    }

    #[test]
    fn test_key_release_is_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate_event(Event::Key(release)), None);
    }

    #[test]
    fn test_resize_and_mouse() {
        assert_eq!(
            translate_event(Event::Resize(100, 40)),
            Some(InputEvent::Resize {
                cols: 100,
                rows: 40
            })
        );
        let mouse = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate_event(mouse), None);
    }
}
