//! # rlpager - Terminal Pager for Growing Files
//!
//! An interactive pager that shows a text file one page at a time while a background
//! task keeps indexing whatever is appended to it.
//!
//! ## Features
//!
//! - **Live tailing**: incremental line index grown by a background tailer, with
//!   truncation detection
//! - **Scroll modes**: continuous scrolling, tail and follow
//! - **Regex search**: ripgrep's matcher, with wraparound and in-line highlighting
//! - **Marks and horizontal shifting**
//! - **Filters**: run a command on a pseudo-terminal from inside the pager
//! - **Sessions**: a five-line record of path, position, pattern, marks and title
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - Tunables with defaults and optional TOML loading
//! - [`file_handler`] - Line index, tailer and per-file state
//! - [`search`] - Pattern compilation and page-wise search
//! - [`render`] - Viewport, scroll modes and terminal output
//! - [`input`] - Key collection, decoding and prompts
//! - [`session`] - Session record persistence
//! - [`app`] - Command dispatcher and the file list

// Core modules
pub mod config;
pub mod error;
pub mod file_handler;
pub mod session;

// Subsystems
pub mod input;
pub mod render;
pub mod search;

// Orchestration
pub mod app;

// Re-export commonly used types for convenience
pub use error::{Result, RlpagerError};

// Public API surface for external usage
pub use app::{Application, FileTarget, SessionOptions};
pub use config::PagerConfig;
pub use file_handler::{LineSource, SharedLineIndex};
pub use search::SearchEngine;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
