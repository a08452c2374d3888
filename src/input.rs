//! Keyboard input: event collection, key translation, command decoding and the prompt
//! line editor.

pub mod command;
pub mod keys;
pub mod prompt;
pub mod raw;

pub use command::{Command, Decoded, KeyDecoder};
pub use keys::{command_code, encode_key};
pub use prompt::{LineEditor, PromptAction};
pub use raw::{spawn_input_thread, InputEvent};
