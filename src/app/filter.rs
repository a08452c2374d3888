//! External filter commands run on a pseudo-terminal.
//!
//! The runner starts `sh -c <command>` on a PTY sized like the screen. Child output is
//! read by a relay thread and handed to the dispatcher over a channel, so the screen
//! keeps a single writer. The channel closes once the child's output ends.

use crate::error::{Result, RlpagerError};
use async_trait::async_trait;
use portable_pty::{native_pty_system, ChildKiller, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::thread;
use tokio::sync::mpsc;

/// Control side of a running filter child
pub trait FilterControl: Send {
    /// Forward key bytes to the child
    fn write_input(&mut self, bytes: &[u8]) -> Result<()>;

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()>;

    /// Block until the child exits; returns its exit code
    fn wait(&mut self) -> Result<u32>;

    fn kill(&mut self);
}

/// A started filter: output chunks plus the control handle
pub struct FilterChild {
    pub output: mpsc::UnboundedReceiver<Vec<u8>>,
    pub control: Box<dyn FilterControl>,
}

impl std::fmt::Debug for FilterChild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChild").finish_non_exhaustive()
    }
}

/// Starts filter commands
#[async_trait]
pub trait FilterRunner: Send + Sync {
    async fn spawn(&self, command: &str, cols: u16, rows: u16) -> Result<FilterChild>;
}

/// Runs filters through `sh -c` on a native pseudo-terminal
#[derive(Debug, Clone)]
pub struct PtyFilterRunner {
    shell: String,
    term: Option<String>,
}

impl Default for PtyFilterRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            term: std::env::var("TERM").ok(),
        }
    }
}

impl PtyFilterRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}

fn pty_size(cols: u16, rows: u16) -> PtySize {
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

fn pty_error<E: std::fmt::Display>(context: &str, err: E) -> RlpagerError {
    RlpagerError::filter(format!("{}: {}", context, err))
}

#[async_trait]
impl FilterRunner for PtyFilterRunner {
    async fn spawn(&self, command: &str, cols: u16, rows: u16) -> Result<FilterChild> {
        let mut cmd = CommandBuilder::new(&self.shell);
        cmd.args(["-c", command]);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }
        if let Some(term) = &self.term {
            cmd.env("TERM", term);
        }

        let pair = native_pty_system()
            .openpty(pty_size(cols, rows))
            .map_err(|e| pty_error("cannot open pseudo-terminal", e))?;
        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| pty_error("cannot start filter", e))?;
        // the child holds its own slave; ours must close for EOF to reach the reader
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| pty_error("cannot read pseudo-terminal", e))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| pty_error("cannot write pseudo-terminal", e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let relay = thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                    // EIO once the child side closes
                    Err(_) => break,
                }
            }
        });

        log::info!("filter started: {}", command);
        Ok(FilterChild {
            output: rx,
            control: Box::new(PtyControl {
                child,
                master: pair.master,
                writer,
                relay: Some(relay),
            }),
        })
    }
}

struct PtyControl {
    child: Box<dyn portable_pty::Child + Send + Sync>,
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    relay: Option<thread::JoinHandle<()>>,
}

impl FilterControl for PtyControl {
    fn write_input(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.writer
            .write_all(bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| pty_error("cannot send input to filter", e))
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.master
            .resize(pty_size(cols, rows))
            .map_err(|e| pty_error("cannot resize pseudo-terminal", e))
    }

    fn wait(&mut self) -> Result<u32> {
        let status = self
            .child
            .wait()
            .map_err(|e| pty_error("waiting for filter", e))?;
        if let Some(relay) = self.relay.take() {
            let _ = relay.join();
        }
        Ok(status.exit_code())
    }

    fn kill(&mut self) {
        let _ = self.child.kill();
    }
}

impl Drop for PtyControl {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn collect_output(child: &mut FilterChild) -> Vec<u8> {
        let mut output = Vec::new();
        while let Ok(Some(chunk)) =
            tokio::time::timeout(Duration::from_secs(5), child.output.recv()).await
        {
            output.extend(chunk);
        }
        output
    }

    #[tokio::test]
    async fn test_filter_output_is_relayed() {
        let runner = PtyFilterRunner::new();
        let mut child = runner.spawn("printf filtered-output", 80, 24).await.unwrap();

        let output = collect_output(&mut child).await;
        assert!(output
            .windows(b"filtered-output".len())
            .any(|w| w == b"filtered-output"));
        assert_eq!(child.control.wait().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exit_code_and_size() {
        let runner = PtyFilterRunner::new();
        let mut child = runner.spawn("stty size; exit 3", 100, 30).await.unwrap();

        let output = String::from_utf8_lossy(&collect_output(&mut child).await).into_owned();
        assert!(output.contains("30 100"), "unexpected output {:?}", output);
        assert_eq!(child.control.wait().unwrap(), 3);
    }
}
