//! Regex search over the line index, powered by ripgrep's matcher crates.

pub mod engine;
pub mod pattern;

pub use engine::{
    LineWindow, PageGeometry, SearchDirection, SearchEngine, SearchNotice, SearchOutcome,
};
pub use pattern::{split_case_prefix, CompiledPattern, CASE_INSENSITIVE_PREFIX};
