//! File access for the pager: incremental line indexing of growing files.
//!
//! This module provides the shared line index that a background tailer grows while the
//! viewport and search engine read from it, plus file validation, typed path resolution
//! and the per-file session state owned by the dispatcher.

pub mod file_session;
pub mod in_memory;
pub mod line_index;
pub mod path;
pub mod reader;
pub mod tailer;
pub mod validation;

pub use file_session::FileSession;
pub use in_memory::InMemoryLines;
pub use line_index::{LineEntry, LineIndex, LineScanner, SharedLineIndex};
pub use path::resolve_path;
pub use reader::{expand_line, IndexedFile, LineSource};
pub use tailer::{Generation, Readiness, TailEvent, Tailer, TailerHandle};
pub use validation::validate_file_path;
