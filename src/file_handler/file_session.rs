//! One open file: handle, index, display metadata and EOF bookkeeping.

use crate::config::PagerConfig;
use crate::error::{Result, RlpagerError};
use crate::file_handler::line_index::SharedLineIndex;
use crate::file_handler::reader::{IndexedFile, LineSource};
use crate::file_handler::tailer::{Generation, Tailer, TailerHandle};
use crate::file_handler::validation::validate_file_path;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Title shown for piped input
pub const STDIN_TITLE: &str = "(standard input)";

/// An open file being paged
pub struct FileSession {
    path: PathBuf,
    title: String,
    from_stdin: bool,

    /// The tailer reached the end of the data at least once
    pub eof: bool,
    /// The user tried to move past the last page
    pub shown_eof: bool,
    /// A transient message occupies the status line
    pub shown_message: bool,

    index: SharedLineIndex,
    source: Arc<IndexedFile>,

    /// Keeps the stdin spool file alive for the lifetime of the session
    _spool: Option<NamedTempFile>,
}

impl FileSession {
    /// Open a regular file
    pub fn open(path: &Path, config: &PagerConfig) -> Result<Self> {
        validate_file_path(path)?;
        let file = File::open(path).map_err(|e| {
            RlpagerError::file_error(format!("Failed to open file: {}", path.display()), e)
        })?;

        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let title = absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute.display().to_string());

        Ok(Self::with_file(absolute, title, false, file, None, config))
    }

    /// Page standard input by spooling it into a temporary file that is then tailed
    pub fn from_stdin(config: &PagerConfig) -> Result<Self> {
        let spool = NamedTempFile::new()
            .map_err(|e| RlpagerError::file_error("Failed to create stdin spool file", e))?;
        let mut writer = spool
            .reopen()
            .map_err(|e| RlpagerError::file_error("Failed to reopen stdin spool file", e))?;
        let file = spool
            .reopen()
            .map_err(|e| RlpagerError::file_error("Failed to reopen stdin spool file", e))?;

        std::thread::spawn(move || {
            let mut stdin = std::io::stdin().lock();
            let mut buf = [0u8; 8192];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Err(err) = writer.write_all(&buf[..n]).and_then(|_| writer.flush())
                        {
                            log::warn!("stdin spool write failed: {}", err);
                            break;
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        log::warn!("reading stdin failed: {}", err);
                        break;
                    }
                }
            }
            log::debug!("stdin exhausted");
        });

        let path = spool.path().to_path_buf();
        Ok(Self::with_file(
            path,
            STDIN_TITLE.to_string(),
            true,
            file,
            Some(spool),
            config,
        ))
    }

    fn with_file(
        path: PathBuf,
        title: String,
        from_stdin: bool,
        file: File,
        spool: Option<NamedTempFile>,
        config: &PagerConfig,
    ) -> Self {
        let index = SharedLineIndex::new(config.max_line_length);
        let source = Arc::new(IndexedFile::new(
            file,
            index.clone(),
            config.line_cache_size,
        ));
        Self {
            path,
            title,
            from_stdin,
            eof: false,
            shown_eof: false,
            shown_message: false,
            index,
            source,
            _spool: spool,
        }
    }

    /// Start the background tailer for this file
    pub fn start_tailer(
        &self,
        config: &PagerConfig,
        generation: Generation,
        wanted_lines: u64,
    ) -> TailerHandle {
        Tailer::new(
            &self.path,
            self.index.clone(),
            config.tail_poll_interval(),
            generation,
        )
        .wanted_lines(wanted_lines)
        .spawn()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn is_from_stdin(&self) -> bool {
        self.from_stdin
    }

    pub fn index(&self) -> &SharedLineIndex {
        &self.index
    }

    pub fn source(&self) -> &dyn LineSource {
        self.source.as_ref()
    }

    pub fn line_count(&self) -> u64 {
        self.index.line_count()
    }

    /// Size of the backing file, if it can be determined
    pub fn byte_size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

impl std::fmt::Debug for FileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSession")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("from_stdin", &self.from_stdin)
            .field("line_count", &self.index.line_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_sets_absolute_path_and_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, b"hello\n").unwrap();

        let session = FileSession::open(&path, &PagerConfig::default()).unwrap();
        assert!(session.path().is_absolute());
        assert_eq!(session.title(), "app.log");
        assert!(!session.is_from_stdin());
        // nothing indexed until the tailer runs
        assert_eq!(session.line_count(), 1);
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = FileSession::open(dir.path(), &PagerConfig::default()).unwrap_err();
        assert!(matches!(err, RlpagerError::NotAFile { .. }));
        assert!(err.is_recoverable());
    }
}
