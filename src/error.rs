//! Error types and handling infrastructure for rlpager.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for application-level error handling with context.
//!
//! ## Design Principles
//!
//! - **Recoverable vs fatal**: open, pattern and filter failures are rendered on the
//!   status line; terminal failures unwind to the application
//! - **Context preservation**: Include relevant information for debugging
//! - **Consistency**: Standardized Result type across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rlpager operations.
#[derive(Error, Debug)]
pub enum RlpagerError {
    /// File system related errors (read failures, metadata failures, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Permission denied accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: PathBuf },

    /// Regular expression failed to compile, or no pattern to reuse
    #[error("Invalid pattern: {message}")]
    PatternError { message: String },

    /// Terminal I/O errors (raw mode, output, event polling)
    #[error("Terminal operation failed: {message}")]
    TerminalError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// External filter command could not be started or relayed
    #[error("Filter command failed: {message}")]
    FilterError { message: String },

    /// Persisted session record could not be read, parsed or written
    #[error("Session record error: {message}")]
    SessionError { message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid command line arguments or typed input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for rlpager operations.
pub type Result<T> = std::result::Result<T, RlpagerError>;

impl RlpagerError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a PatternError with a descriptive message
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::PatternError {
            message: message.into(),
        }
    }

    /// Create a TerminalError from an io::Error with additional context
    pub fn terminal(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::TerminalError {
            message: message.into(),
            source,
        }
    }

    /// Wrap a terminal write failure
    pub fn terminal_io(source: std::io::Error) -> Self {
        Self::terminal("terminal output failed", source)
    }

    /// Create a FilterError with a descriptive message
    pub fn filter(message: impl Into<String>) -> Self {
        Self::FilterError {
            message: message.into(),
        }
    }

    /// Create a SessionError with a descriptive message
    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the dispatcher should absorb this error and show it on the status line.
    ///
    /// Terminal failures and internal faults are not recoverable: they unwind to
    /// the application, which restores the terminal before exiting.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::TerminalError { .. } | Self::Other { .. })
    }
}

// Automatic conversion from io::Error to RlpagerError
impl From<std::io::Error> for RlpagerError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_messages() {
        let path = PathBuf::from("/test/file.log");

        let file_not_found = RlpagerError::FileNotFound { path: path.clone() };
        assert_eq!(file_not_found.to_string(), "File not found: /test/file.log");

        let not_a_file = RlpagerError::NotAFile { path };
        assert_eq!(
            not_a_file.to_string(),
            "Path is not a regular file: /test/file.log"
        );

        let pattern = RlpagerError::pattern("unclosed group");
        assert_eq!(pattern.to_string(), "Invalid pattern: unclosed group");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(RlpagerError::pattern("bad").is_recoverable());
        assert!(RlpagerError::filter("no pty").is_recoverable());
        assert!(RlpagerError::PermissionDenied {
            path: PathBuf::from("/root/secret")
        }
        .is_recoverable());

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(!RlpagerError::terminal_io(io).is_recoverable());
        assert!(!RlpagerError::other("internal").is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: RlpagerError = io_err.into();

        match err {
            RlpagerError::FileError { message, .. } => {
                assert_eq!(message, "File not found");
            }
            _ => panic!("Expected FileError variant"),
        }
    }
}
