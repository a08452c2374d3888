//! Application orchestration layer
//!
//! Owns the terminal for the lifetime of the pager and walks the file list, running one
//! [`Dispatcher`] per file and persisting the session record when an exit asks for it.

pub mod context;
pub mod dispatcher;
pub mod filter;
pub mod help;
pub mod signals;

pub use context::PagerContext;
pub use dispatcher::{
    await_first_page, unmodified_for, Dispatcher, ExitRequest, StartState, StartupWait,
};
pub use filter::{FilterChild, FilterControl, FilterRunner, PtyFilterRunner};
pub use signals::ShutdownSignal;

use crate::config::PagerConfig;
use crate::error::Result;
use crate::file_handler::FileSession;
use crate::input::{spawn_input_thread, InputEvent};
use crate::render::terminal::{install_panic_hook, terminal_size};
use crate::render::{Screen, ScrollMode, TerminalGuard};
use crate::session::SessionRecord;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One entry of the file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTarget {
    Path(PathBuf),
    Stdin,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Where exits that save the session write the record
    pub session_path: Option<PathBuf>,
    /// Record applied to the first file
    pub restore: Option<SessionRecord>,
}

pub struct Application {
    config: PagerConfig,
    targets: Vec<FileTarget>,
    session: SessionOptions,
    start_mode: ScrollMode,
}

impl Application {
    pub fn new(config: PagerConfig, targets: Vec<FileTarget>, session: SessionOptions) -> Self {
        Self {
            config,
            targets,
            session,
            start_mode: ScrollMode::None,
        }
    }

    /// Scroll mode every file starts in
    pub fn with_start_mode(mut self, mode: ScrollMode) -> Self {
        self.start_mode = mode;
        self
    }

    /// Take over the terminal and page every target
    pub async fn run(self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::enter()?;
        let (cols, rows) = terminal_size()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let input_thread = spawn_input_thread(tx, Arc::clone(&shutdown), self.config.key_timeout());

        let mut ctx = PagerContext::new(
            Screen::new(std::io::stdout(), cols, rows),
            self.config.clone(),
            rx,
            ShutdownSignal::install()?,
            Box::new(PtyFilterRunner::new()),
        );
        let result = self.browse(&mut ctx).await;

        shutdown.store(true, Ordering::SeqCst);
        if input_thread.join().is_err() {
            log::warn!("input thread panicked");
        }
        drop(guard);
        result
    }

    /// Walk the file list on an existing context
    pub async fn browse<W: Write>(&self, ctx: &mut PagerContext<W>) -> Result<()> {
        let mut restore = self.session.restore.clone();
        if let Some(pattern) = restore.as_ref().and_then(|r| r.pattern.as_deref()) {
            if let Err(err) = ctx.search.re_compile(pattern) {
                log::warn!("ignoring restored pattern {:?}: {}", pattern, err);
            }
        }

        for target in &self.targets {
            let file = match Self::open(target, &ctx.config) {
                Ok(file) => file,
                Err(err) if err.is_recoverable() => {
                    log::warn!("cannot open {:?}: {}", target, err);
                    if report_open_failure(ctx, &err.to_string()).await? {
                        continue;
                    }
                    break;
                }
                Err(err) => return Err(err),
            };

            let mut start = match restore.take() {
                Some(record) if restored_path(&record) == file.path() => StartState {
                    top: record.top_line,
                    marks: Some(record.marks),
                    title: record.title,
                    ..StartState::default()
                },
                other => {
                    restore = other;
                    StartState::default()
                }
            };
            start.mode = self.start_mode;

            let exit = Dispatcher::new(ctx, file, start).run().await?;
            if exit.save_session {
                self.save_session(&exit.record);
            }
            if exit.unwind {
                break;
            }
        }
        Ok(())
    }

    fn open(target: &FileTarget, config: &PagerConfig) -> Result<FileSession> {
        match target {
            FileTarget::Path(path) => FileSession::open(path, config),
            FileTarget::Stdin => FileSession::from_stdin(config),
        }
    }

    fn save_session(&self, record: &SessionRecord) {
        let Some(path) = &self.session.session_path else {
            return;
        };
        match record.save(path) {
            Ok(()) => log::info!("session saved to {}", path.display()),
            Err(err) => log::warn!("session not saved: {}", err),
        }
    }
}

/// Canonical form of a session record's path, as open files report theirs
fn restored_path(record: &SessionRecord) -> PathBuf {
    std::fs::canonicalize(&record.path).unwrap_or_else(|_| record.path.clone())
}

/// Show an open failure and wait for a key; false when the pager should stop instead
async fn report_open_failure<W: Write>(ctx: &mut PagerContext<W>, message: &str) -> Result<bool> {
    ctx.screen.clear_all()?;
    ctx.screen
        .draw_status(&format!("{} (press a key)", message), ctx.theme.status_alert)?;
    ctx.screen.flush()?;

    loop {
        let event = tokio::select! {
            event = ctx.input.recv() => event,
            _ = ctx.signals.recv() => None,
        };
        match event {
            Some(InputEvent::Key(_)) => return Ok(true),
            Some(InputEvent::Resize { cols, rows }) => ctx.screen.resize(cols, rows),
            None => return Ok(false),
        }
    }
}
