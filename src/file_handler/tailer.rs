//! Background tailer that keeps the line index in step with a growing file.
//!
//! The tailer polls the file size on a fixed interval, scans newly appended bytes,
//! resets the index when the file shrinks, and signals readiness once enough lines are
//! available. It exits cooperatively when the shared generation counter moves on.

use crate::file_handler::line_index::{LineScanner, SharedLineIndex};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Bytes read per scan step
const READ_CHUNK: usize = 64 * 1024;

/// One-shot readiness signal sent by the tailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The requested number of lines is indexed, or the input is exhausted
    Ready,
    /// The file could not be read; no further growth will be indexed
    Failed,
}

/// Notices the tailer reports to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    Truncated { previous_size: u64, new_size: u64 },
    Failed(String),
}

/// Shared counter identifying the current file
///
/// Each tailer remembers the value at spawn time and exits once it differs.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate every running tailer; returns the new generation
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Result of one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// Lines added during this poll
    pub appended: u64,
    /// `(previous, current)` size when the file shrank
    pub truncated: Option<(u64, u64)>,
    /// Every byte present at the time of the poll has been scanned
    pub at_eof: bool,
}

/// Scanning state carried between polls
#[derive(Debug)]
pub struct TailState {
    index: SharedLineIndex,
    scanner: LineScanner,
    last_size: u64,
}

impl TailState {
    pub fn new(index: SharedLineIndex) -> Self {
        Self {
            index,
            scanner: LineScanner::new(),
            last_size: 0,
        }
    }

    /// Detect truncation, then index whatever was appended since the previous poll
    pub async fn poll(&mut self, file: &mut File) -> std::io::Result<PollOutcome> {
        let size = file.metadata().await?.len();
        let mut outcome = PollOutcome::default();

        if size < self.last_size {
            self.index.reset();
            self.scanner.reset();
            outcome.truncated = Some((self.last_size, size));
        }
        self.last_size = size;

        let before = self.index.line_count();
        let mut buf = vec![0u8; READ_CHUNK];

        while self.scanner.position() < size {
            let want = ((size - self.scanner.position()) as usize).min(READ_CHUNK);
            file.seek(std::io::SeekFrom::Start(self.scanner.position()))
                .await?;
            let read = file.read(&mut buf[..want]).await?;
            if read == 0 {
                break;
            }
            let lines = self.scanner.feed(&buf[..read]);
            if !lines.is_empty() {
                self.index.append(&lines);
            }
        }

        outcome.appended = self.index.line_count().saturating_sub(before);
        outcome.at_eof = self.scanner.position() >= size;
        Ok(outcome)
    }
}

/// Handle returned by [`Tailer::spawn`]
#[derive(Debug)]
pub struct TailerHandle {
    /// Fires once: ready, or failed before becoming ready
    pub ready: Option<oneshot::Receiver<Readiness>>,
    /// Truncation and failure notices
    pub events: mpsc::UnboundedReceiver<TailEvent>,
    pub task: JoinHandle<()>,
}

/// Background task growing a [`SharedLineIndex`]
pub struct Tailer {
    path: PathBuf,
    index: SharedLineIndex,
    poll_interval: Duration,
    wanted_lines: u64,
    generation: Generation,
}

impl Tailer {
    pub fn new(
        path: impl AsRef<Path>,
        index: SharedLineIndex,
        poll_interval: Duration,
        generation: Generation,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            index,
            poll_interval,
            wanted_lines: 1,
            generation,
        }
    }

    /// Number of lines (SOF included) after which readiness is signalled
    pub fn wanted_lines(mut self, lines: u64) -> Self {
        self.wanted_lines = lines;
        self
    }

    /// Start polling; the tailer belongs to the generation current at this call
    pub fn spawn(self) -> TailerHandle {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let my_generation = self.generation.current();
        let task = tokio::spawn(self.run(my_generation, ready_tx, events_tx));
        TailerHandle {
            ready: Some(ready_rx),
            events: events_rx,
            task,
        }
    }

    async fn run(
        self,
        my_generation: u64,
        ready_tx: oneshot::Sender<Readiness>,
        events_tx: mpsc::UnboundedSender<TailEvent>,
    ) {
        let mut ready_tx = Some(ready_tx);

        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(err) => {
                Self::fail(&self.path, err, &mut ready_tx, &events_tx);
                return;
            }
        };

        let mut state = TailState::new(self.index.clone());
        loop {
            if self.generation.current() != my_generation {
                log::debug!("tailer for {} retired", self.path.display());
                return;
            }

            match state.poll(&mut file).await {
                Ok(outcome) => {
                    if let Some((previous_size, new_size)) = outcome.truncated {
                        log::info!(
                            "{} truncated from {} to {} bytes",
                            self.path.display(),
                            previous_size,
                            new_size
                        );
                        let _ = events_tx.send(TailEvent::Truncated {
                            previous_size,
                            new_size,
                        });
                    }
                    if outcome.appended > 0 {
                        log::debug!(
                            "indexed {} new lines of {}",
                            outcome.appended,
                            self.path.display()
                        );
                    }
                    if ready_tx.is_some()
                        && (outcome.at_eof || self.index.line_count() >= self.wanted_lines)
                    {
                        if let Some(tx) = ready_tx.take() {
                            let _ = tx.send(Readiness::Ready);
                        }
                    }
                }
                Err(err) => {
                    Self::fail(&self.path, err, &mut ready_tx, &events_tx);
                    return;
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn fail(
        path: &Path,
        err: std::io::Error,
        ready_tx: &mut Option<oneshot::Sender<Readiness>>,
        events_tx: &mpsc::UnboundedSender<TailEvent>,
    ) {
        log::warn!("tailing {} stopped: {}", path.display(), err);
        if let Some(tx) = ready_tx.take() {
            let _ = tx.send(Readiness::Failed);
        }
        let _ = events_tx.send(TailEvent::Failed(err.to_string()));
    }
}
