//! Pager configuration.
//!
//! Every tunable has a built-in default. With the `config` feature enabled, values can
//! also be loaded from a TOML file; command-line flags are applied on top by `main`.

use crate::error::{Result, RlpagerError};
use std::path::Path;
use std::time::Duration;

/// Runtime settings shared by the tailer, viewport and dispatcher.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PagerConfig {
    /// Keystroke read timeout; doubles as the clock for autonomous scroll modes
    pub key_timeout_ms: u64,

    /// Interval between file size checks in the tailer
    pub tail_poll_ms: u64,

    /// Bytes of a single line kept by the index; longer lines are cut
    pub max_line_length: usize,

    /// Columns moved by one horizontal shift
    pub shift_increment: usize,

    /// Number of readiness waits before the dispatcher gives up and shows what it has
    pub ready_retries: u32,

    /// Length of one readiness wait
    pub ready_retry_ms: u64,

    /// A file whose modification time is older than this is assumed fully read
    pub static_cutoff_secs: u64,

    /// Number of decoded lines memoised by the reader
    pub line_cache_size: usize,

    /// Show line numbers on startup
    pub show_line_numbers: bool,

    /// Compile search patterns case-insensitively on startup
    pub case_insensitive: bool,

    /// Use the monochrome palette
    pub monochrome: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            key_timeout_ms: 100,
            tail_poll_ms: 200,
            max_line_length: 2048,
            shift_increment: 8,
            ready_retries: 20,
            ready_retry_ms: 50,
            static_cutoff_secs: 3,
            line_cache_size: 512,
            show_line_numbers: false,
            case_insensitive: false,
            monochrome: false,
        }
    }
}

impl PagerConfig {
    pub fn key_timeout(&self) -> Duration {
        Duration::from_millis(self.key_timeout_ms)
    }

    pub fn tail_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tail_poll_ms)
    }

    pub fn ready_retry_interval(&self) -> Duration {
        Duration::from_millis(self.ready_retry_ms)
    }

    pub fn static_cutoff(&self) -> Duration {
        Duration::from_secs(self.static_cutoff_secs)
    }

    /// Reject values that would stall the dispatcher or break page arithmetic
    pub fn validate(&self) -> Result<()> {
        if self.key_timeout_ms == 0 {
            return Err(RlpagerError::config("key_timeout_ms must be positive"));
        }
        if self.tail_poll_ms == 0 {
            return Err(RlpagerError::config("tail_poll_ms must be positive"));
        }
        if self.max_line_length == 0 {
            return Err(RlpagerError::config("max_line_length must be positive"));
        }
        if self.shift_increment == 0 {
            return Err(RlpagerError::config("shift_increment must be positive"));
        }
        if self.line_cache_size == 0 {
            return Err(RlpagerError::config("line_cache_size must be positive"));
        }
        Ok(())
    }

    /// Load configuration from an explicit TOML file
    #[cfg(feature = "config")]
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RlpagerError::file_error(format!("Failed to read config {}", path.display()), e)
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| RlpagerError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(not(feature = "config"))]
    pub fn load_from(path: &Path) -> Result<Self> {
        Err(RlpagerError::config(format!(
            "cannot load {}: built without the `config` feature",
            path.display()
        )))
    }

    /// Load `<config dir>/rlpager/config.toml` when it exists, defaults otherwise
    pub fn load_default() -> Result<Self> {
        #[cfg(feature = "config")]
        {
            if let Some(path) = dirs::config_dir().map(|dir| dir.join("rlpager/config.toml")) {
                if path.is_file() {
                    log::info!("loading configuration from {}", path.display());
                    return Self::load_from(&path);
                }
            }
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PagerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.key_timeout(), Duration::from_millis(100));
        assert_eq!(config.shift_increment, 8);
    }

    #[test]
    fn test_validate_rejects_zero_increment() {
        let config = PagerConfig {
            shift_increment: 0,
            ..PagerConfig::default()
        };
        match config.validate() {
            Err(RlpagerError::ConfigError { message }) => {
                assert!(message.contains("shift_increment"));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_load_partial_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shift_increment = 16\nshow_line_numbers = true").unwrap();

        let config = PagerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.shift_increment, 16);
        assert!(config.show_line_numbers);
        assert_eq!(config.tail_poll_ms, PagerConfig::default().tail_poll_ms);
    }
}
