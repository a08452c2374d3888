//! Single-line editor used for the search, go-to-line, filter and file prompts

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the dispatcher should do after a key reaches the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Continue,
    Submit(String),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    prompt: String,
    buffer: String,
}

impl LineEditor {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            buffer: String::new(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptAction {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => PromptAction::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Esc => PromptAction::Cancel,
            KeyCode::Char('c') | KeyCode::Char('g') if control => PromptAction::Cancel,
            KeyCode::Char('u') if control => {
                self.buffer.clear();
                PromptAction::Continue
            }
            KeyCode::Char('h') if control => self.backspace(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) if !control && !c.is_control() => {
                self.buffer.push(c);
                PromptAction::Continue
            }
            _ => PromptAction::Continue,
        }
    }

    /// Backspace on an empty line abandons the prompt
    fn backspace(&mut self) -> PromptAction {
        if self.buffer.pop().is_none() {
            PromptAction::Cancel
        } else {
            PromptAction::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut LineEditor, code: KeyCode) -> PromptAction {
        editor.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(editor: &mut LineEditor, text: &str) {
        for c in text.chars() {
            assert_eq!(press(editor, KeyCode::Char(c)), PromptAction::Continue);
        }
    }

    #[test]
    fn test_submit() {
        let mut editor = LineEditor::new("/");
        type_text(&mut editor, "err.r");
        assert_eq!(editor.buffer(), "err.r");
        assert_eq!(
            press(&mut editor, KeyCode::Enter),
            PromptAction::Submit("err.r".to_string())
        );
    }

    #[test]
    fn test_backspace_then_cancel_on_empty() {
        let mut editor = LineEditor::new(":");
        type_text(&mut editor, "1");
        assert_eq!(press(&mut editor, KeyCode::Backspace), PromptAction::Continue);
        assert_eq!(press(&mut editor, KeyCode::Backspace), PromptAction::Cancel);
    }

    #[test]
    fn test_escape_and_ctrl_c_cancel() {
        let mut editor = LineEditor::new("?");
        type_text(&mut editor, "abc");
        assert_eq!(press(&mut editor, KeyCode::Esc), PromptAction::Cancel);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(&ctrl_c), PromptAction::Cancel);
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut editor = LineEditor::new("|");
        type_text(&mut editor, "grep x");
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(&ctrl_u), PromptAction::Continue);
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn test_unicode_input() {
        let mut editor = LineEditor::new("/");
        type_text(&mut editor, "naïve");
        assert_eq!(press(&mut editor, KeyCode::Backspace), PromptAction::Continue);
        assert_eq!(editor.buffer(), "naïv");
    }
}
