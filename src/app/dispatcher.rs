//! Command dispatcher: the event loop for one file.
//!
//! Each iteration drains tailer notices, then waits for a key with the key timeout. A
//! key runs one command; a timeout runs one scroll-mode tick. Quit commands and
//! termination signals end the loop with an [`ExitRequest`].

use crate::app::context::PagerContext;
use crate::app::help::{help_lines, HELP_TITLE};
use crate::error::{Result, RlpagerError};
use crate::file_handler::path::substitute_current;
use crate::file_handler::{resolve_path, FileSession, LineSource, Readiness, TailEvent, TailerHandle};
use crate::input::{command_code, encode_key, Command, Decoded, InputEvent, KeyDecoder};
use crate::input::{LineEditor, PromptAction};
use crate::render::{RenderContext, Screen, ScrollMode, StatusLine, Viewport};
use crate::search::{PageGeometry, SearchDirection, SearchEngine, SearchOutcome};
use crate::session::{SessionRecord, MARK_COUNT};
use ratatui::crossterm::event::KeyEvent;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::oneshot;

/// How the dispatcher left the current file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    pub save_session: bool,
    /// Abandon the rest of the file list
    pub unwind: bool,
    pub record: SessionRecord,
}

/// Initial view for a file, e.g. from a restored session
#[derive(Debug, Clone, Default)]
pub struct StartState {
    pub top: u64,
    pub marks: Option<[u64; MARK_COUNT]>,
    pub title: Option<String>,
    pub mode: ScrollMode,
}

enum Step {
    Input(InputEvent),
    Tick,
    Terminate(&'static str),
}

enum FilterStep {
    Output(Option<Vec<u8>>),
    Input(Option<InputEvent>),
    Terminate(&'static str),
}

/// How the startup wait for the first page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupWait {
    Ready,
    /// The tailer failed; the failure itself arrives as a tail event
    Failed,
    /// The file has not changed for the static cutoff
    Static,
    /// Every retry elapsed; the view clamps to whatever is indexed
    TimedOut,
}

/// Wait up to `retries` intervals for the readiness signal, stopping early once
/// `is_static` reports a file that is no longer growing
pub async fn await_first_page(
    ready: &mut oneshot::Receiver<Readiness>,
    retries: u32,
    interval: Duration,
    is_static: impl Fn() -> bool,
) -> StartupWait {
    for attempt in 1..=retries {
        match tokio::time::timeout(interval, &mut *ready).await {
            Ok(Ok(Readiness::Ready)) => return StartupWait::Ready,
            Ok(Ok(Readiness::Failed)) | Ok(Err(_)) => return StartupWait::Failed,
            Err(_) if is_static() => return StartupWait::Static,
            Err(_) => log::debug!("waiting for first page ({}/{})", attempt, retries),
        }
    }
    StartupWait::TimedOut
}

/// True when `path` was last modified at least `cutoff` ago
pub fn unmodified_for(path: &Path, cutoff: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age >= cutoff)
}

pub struct Dispatcher<'a, W: Write> {
    ctx: &'a mut PagerContext<W>,
    file: FileSession,
    tail: TailerHandle,
    viewport: Viewport,
    status: StatusLine,
    decoder: KeyDecoder,
    start_top: u64,
    exit: Option<ExitRequest>,
}

impl<'a, W: Write> Dispatcher<'a, W> {
    /// Take over `file` and start its tailer. Must be called inside a tokio runtime.
    pub fn new(ctx: &'a mut PagerContext<W>, mut file: FileSession, start: StartState) -> Self {
        let (cols, rows) = (ctx.screen.cols(), ctx.screen.rows());
        let mut viewport = Viewport::new(cols, rows, ctx.config.shift_increment);
        viewport.state_mut().show_line_numbers = ctx.config.show_line_numbers;
        if let Some(marks) = start.marks {
            viewport.state_mut().marks = marks;
        }
        viewport.set_mode(start.mode);
        if let Some(title) = start.title {
            file.set_title(title);
        }

        ctx.generation.advance();
        ctx.search.reset();
        let wanted = start.top.saturating_add(u64::from(rows)).saturating_add(1);
        let tail = file.start_tailer(&ctx.config, ctx.generation.clone(), wanted);

        Self {
            ctx,
            file,
            tail,
            viewport,
            status: StatusLine::new(),
            decoder: KeyDecoder::new(),
            start_top: start.top,
            exit: None,
        }
    }

    pub async fn run(mut self) -> Result<ExitRequest> {
        log::info!("viewing {}", self.file.path().display());
        self.wait_until_ready().await;
        self.show(self.start_top)?;

        loop {
            if let Some(exit) = self.exit.take() {
                self.ctx.generation.advance();
                return Ok(exit);
            }
            self.drain_tail_events()?;

            let timeout = self.ctx.config.key_timeout();
            let step = tokio::select! {
                event = self.ctx.input.recv() => match event {
                    Some(event) => Step::Input(event),
                    None => Step::Terminate("input closed"),
                },
                _ = tokio::time::sleep(timeout) => Step::Tick,
                name = self.ctx.signals.recv() => Step::Terminate(name),
            };

            match step {
                Step::Tick => self.tick()?,
                Step::Input(InputEvent::Resize { cols, rows }) => self.resize(cols, rows)?,
                Step::Input(InputEvent::Key(key)) => self.handle_key(key).await?,
                Step::Terminate(reason) => {
                    log::info!("shutting down: {}", reason);
                    self.request_exit(true, true);
                }
            }
        }
    }

    /// Wait for the tailer to index the first page, giving up early on static files
    async fn wait_until_ready(&mut self) {
        let Some(mut ready) = self.tail.ready.take() else {
            return;
        };
        let path = self.file.path().to_path_buf();
        let cutoff = self.ctx.config.static_cutoff();
        let wait = await_first_page(
            &mut ready,
            self.ctx.config.ready_retries,
            self.ctx.config.ready_retry_interval(),
            || unmodified_for(&path, cutoff),
        )
        .await;
        log::debug!("{}: startup wait ended with {:?}", path.display(), wait);
        if wait == StartupWait::Static {
            self.file.eof = true;
        }
    }

    fn drain_tail_events(&mut self) -> Result<()> {
        while let Ok(event) = self.tail.events.try_recv() {
            match event {
                TailEvent::Truncated {
                    previous_size,
                    new_size,
                } => {
                    self.file.eof = false;
                    self.file.shown_eof = false;
                    self.alert(format!(
                        "File truncated ({} -> {} bytes)",
                        previous_size, new_size
                    ));
                    self.viewport.state_mut().screen_valid = false;
                    self.show(self.viewport.first_row())?;
                }
                TailEvent::Failed(message) => {
                    log::warn!("{}", message);
                    self.alert(message);
                    self.redraw_status()?;
                }
            }
        }
        Ok(())
    }

    /// Run `f` with the viewport, the screen and a render context for the current file
    fn with_view<R>(
        &mut self,
        f: impl FnOnce(&mut Viewport, &mut Screen<W>, &RenderContext<'_>) -> Result<R>,
    ) -> Result<R> {
        let render = RenderContext {
            source: self.file.source(),
            search: &self.ctx.search,
            theme: &self.ctx.theme,
            title: self.file.title(),
            status: &self.status,
        };
        f(&mut self.viewport, &mut self.ctx.screen, &render)
    }

    fn show(&mut self, top: u64) -> Result<()> {
        self.with_view(|view, screen, render| view.print_page(screen, render, top))
    }

    fn repaint(&mut self) -> Result<()> {
        self.with_view(|view, screen, render| view.repaint(screen, render))
    }

    fn redraw_status(&mut self) -> Result<()> {
        self.with_view(|view, screen, render| {
            view.draw_status(screen, render)?;
            screen.hide_cursor()?;
            screen.flush()
        })
    }

    fn inform(&mut self, message: impl Into<String>) {
        self.status.set_info(message);
        self.file.shown_message = true;
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.status.set_alert(message);
        self.file.shown_message = true;
    }

    fn tick(&mut self) -> Result<()> {
        self.with_view(|view, screen, render| view.tick(screen, render))?;
        self.file.shown_eof |= self.viewport.state().eof_shown;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        if self.viewport.resize(&mut self.ctx.screen, cols, rows) {
            log::debug!("terminal resized to {}x{}", cols, rows);
            self.ctx.screen.clear_all()?;
            self.show(self.viewport.first_row())?;
        }
        Ok(())
    }

    fn record(&self) -> SessionRecord {
        let state = self.viewport.state();
        SessionRecord {
            path: self.file.path().to_path_buf(),
            top_line: state.first_row,
            pattern: self.ctx.search.pattern_text(),
            marks: state.marks,
            title: Some(self.file.title().to_string()),
        }
    }

    fn request_exit(&mut self, save_session: bool, unwind: bool) {
        self.exit = Some(ExitRequest {
            save_session: save_session && !self.file.is_from_stdin(),
            unwind,
            record: self.record(),
        });
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(code) = command_code(&key) else {
            return Ok(());
        };
        let command = match self.decoder.decode(code) {
            Decoded::Command(command) => command,
            Decoded::Pending => return Ok(()),
            Decoded::Unknown(code) => {
                log::debug!("unbound key {:#04x}", code);
                return Ok(());
            }
        };

        match self.execute(command).await {
            Err(err) if err.is_recoverable() => {
                log::debug!("command {:?} failed: {}", command, err);
                self.alert(err.to_string());
                self.redraw_status()
            }
            other => other,
        }
    }

    /// Run one decoded command
    pub async fn execute(&mut self, command: Command) -> Result<()> {
        if !command.keeps_scroll_mode() {
            self.viewport.set_mode(ScrollMode::None);
        }
        if self.file.shown_message {
            self.status.clear();
            self.file.shown_message = false;
        }

        let page = self.viewport.page_rows();
        match command {
            Command::LineDown => self.scroll_down(1),
            Command::LineUp => self.scroll_up(1),
            Command::PageDown => self.scroll_down(page),
            Command::PageUp => self.scroll_up(page),
            Command::HalfPageDown => self.scroll_down((page / 2).max(1)),
            Command::HalfPageUp => self.scroll_up((page / 2).max(1)),
            Command::ShiftRight => {
                self.with_view(|view, screen, render| view.shift_right(screen, render))
            }
            Command::ShiftLeft => {
                self.with_view(|view, screen, render| view.shift_left(screen, render))
            }
            Command::ShiftHome => {
                self.with_view(|view, screen, render| view.shift_home(screen, render))
            }
            Command::ShiftLongest => self
                .with_view(|view, screen, render| view.shift_to_longest(screen, render))
                .map(|_| ()),
            Command::GoToStart => self.show(0),
            Command::GoToEnd => self.show(self.file.line_count()),
            Command::GoToLine => self.go_to_line().await,
            Command::ToggleLineNumbers => self
                .with_view(|view, screen, render| view.toggle_line_numbers(screen, render))
                .map(|_| ()),
            Command::ToggleMode(requested) => {
                let mode = self.viewport.mode().toggle(requested);
                log::debug!("scroll mode {:?}", mode);
                self.viewport.set_mode(mode);
                self.redraw_status()
            }
            Command::SetMark(digit) => {
                self.viewport.set_mark(digit);
                let top = self.viewport.first_row();
                self.inform(format!("Mark {} set at line {}", digit, top));
                self.redraw_status()
            }
            Command::JumpToMark(digit) => match self.viewport.mark(digit) {
                Some(top) => self.show(top),
                None => Err(RlpagerError::invalid_argument(format!("No mark {}", digit))),
            },
            Command::Search(direction) => self.search_prompt(direction).await,
            Command::RepeatSearch => {
                let direction = self.ctx.search.direction();
                self.run_search("", direction, true)
            }
            Command::RepeatSearchReverse => {
                let direction = self.ctx.search.direction().reversed();
                self.run_search("", direction, true)
            }
            Command::ToggleCase => {
                let insensitive = self.ctx.search.toggle_case()?;
                self.inform(if insensitive {
                    "Case-insensitive search"
                } else {
                    "Case-sensitive search"
                });
                self.repaint()
            }
            Command::ShowPattern => {
                match self.ctx.search.pattern_text() {
                    Some(pattern) => self.inform(format!("Pattern: {}", pattern)),
                    None => self.alert("No pattern"),
                }
                self.redraw_status()
            }
            Command::ClearPattern => {
                self.ctx.search.clear_pattern();
                self.inform("Pattern cleared");
                self.repaint()
            }
            Command::Filter => self.filter().await,
            Command::OpenFile => self.open_file().await,
            Command::Help => self.help().await,
            Command::Redraw => {
                self.ctx.screen.clear_all()?;
                self.repaint()
            }
            Command::FileInfo => {
                let info = self.file_info();
                self.inform(info);
                self.redraw_status()
            }
            Command::Quit {
                save_session,
                unwind,
            } => {
                self.request_exit(save_session, unwind);
                Ok(())
            }
        }
    }

    fn scroll_down(&mut self, n: u64) -> Result<()> {
        let moved = self.with_view(|view, screen, render| view.scroll_down(screen, render, n))?;
        if moved == 0 {
            self.file.shown_eof = true;
            self.redraw_status()?;
        }
        Ok(())
    }

    fn scroll_up(&mut self, n: u64) -> Result<()> {
        self.with_view(|view, screen, render| view.scroll_up(screen, render, n))
            .map(|_| ())
    }

    fn file_info(&self) -> String {
        let state = self.viewport.state();
        let lines = self.file.line_count().saturating_sub(1);
        let mut info = format!(
            "{}  lines {}-{} of {}",
            self.file.title(),
            state.first_row.max(1).min(lines),
            state.last_row.min(lines),
            lines
        );
        if let Some(bytes) = self.file.byte_size() {
            info.push_str(&format!("  {} bytes", bytes));
        }
        if !self.file.is_from_stdin() {
            info.push_str(&format!("  {}", self.file.path().display()));
        }
        info
    }

    /// Next input event, or `None` once the pager is shutting down
    async fn next_input(&mut self) -> Option<InputEvent> {
        let event = tokio::select! {
            event = self.ctx.input.recv() => event,
            name = self.ctx.signals.recv() => {
                log::info!("shutting down: {}", name);
                None
            }
        };
        if event.is_none() {
            self.request_exit(true, true);
        }
        event
    }

    /// Read a line on the status row; `None` when cancelled
    async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut editor = LineEditor::new(prompt);
        loop {
            self.ctx.screen.draw_prompt(editor.prompt(), editor.buffer())?;
            self.ctx.screen.flush()?;

            let key = match self.next_input().await {
                Some(InputEvent::Key(key)) => key,
                Some(InputEvent::Resize { cols, rows }) => {
                    self.resize(cols, rows)?;
                    continue;
                }
                None => return Ok(None),
            };

            match editor.handle_key(&key) {
                PromptAction::Continue => {}
                PromptAction::Submit(text) => {
                    self.ctx.screen.hide_cursor()?;
                    return Ok(Some(text));
                }
                PromptAction::Cancel => {
                    self.redraw_status()?;
                    return Ok(None);
                }
            }
        }
    }

    async fn go_to_line(&mut self) -> Result<()> {
        let Some(input) = self.prompt(":").await? else {
            return Ok(());
        };
        let input = input.trim();
        if input.is_empty() {
            return self.redraw_status();
        }
        let line = input
            .parse::<u64>()
            .map_err(|_| RlpagerError::invalid_argument(format!("Not a line number: {}", input)))?;
        self.show(line)
    }

    async fn search_prompt(&mut self, direction: SearchDirection) -> Result<()> {
        let Some(pattern) = self.prompt(&direction.prompt_char().to_string()).await? else {
            return Ok(());
        };
        if pattern.is_empty() {
            // repeat the active pattern in the requested direction
            self.run_search("", direction, true)?;
        } else {
            // a bad pattern must leave the previous search untouched
            self.ctx.search.re_compile(&pattern)?;
            self.ctx.search.reset();
            self.run_search(&pattern, direction, false)?;
        }
        self.ctx.search.set_direction(direction);
        Ok(())
    }

    /// Search and move the view to the match
    pub fn run_search(
        &mut self,
        pattern: &str,
        direction: SearchDirection,
        is_repeat: bool,
    ) -> Result<()> {
        let page = PageGeometry {
            first_row: self.viewport.first_row(),
            rows: self.viewport.page_rows(),
        };
        let outcome =
            self.ctx
                .search
                .search_file(self.file.source(), pattern, direction, is_repeat, page)?;

        match outcome {
            SearchOutcome::Found { line, top, notice } => {
                log::debug!("match at line {}", line);
                if let Some(notice) = notice {
                    self.inform(notice.message());
                }
                if !is_repeat {
                    self.viewport.state_mut().screen_valid = false;
                }
                self.show(top)
            }
            SearchOutcome::NotFound { notice } => {
                match notice {
                    Some(notice) => self.alert(format!("{}: Pattern not found", notice.message())),
                    None => self.alert("Pattern not found"),
                }
                self.redraw_status()
            }
        }
    }

    async fn open_file(&mut self) -> Result<()> {
        let Some(input) = self.prompt("Examine: ").await? else {
            return Ok(());
        };
        if input.trim().is_empty() {
            return self.redraw_status();
        }
        let path = resolve_path(&input, Some(self.file.path()))?;
        let file = FileSession::open(&path, &self.ctx.config)?;
        self.switch_to(file).await
    }

    async fn switch_to(&mut self, file: FileSession) -> Result<()> {
        log::info!("switching to {}", file.path().display());
        self.ctx.generation.advance();
        let wanted = u64::from(self.ctx.screen.rows()) + 1;
        self.tail = file.start_tailer(&self.ctx.config, self.ctx.generation.clone(), wanted);
        self.file = file;
        self.viewport.state_mut().reset_for_new_file();
        self.ctx.search.reset();
        self.wait_until_ready().await;
        self.show(0)
    }

    async fn filter(&mut self) -> Result<()> {
        let Some(input) = self.prompt("|").await? else {
            return Ok(());
        };
        let input = input.trim();
        if input.is_empty() {
            return self.redraw_status();
        }
        let command = substitute_current(input, Some(self.file.path()))?;
        let (cols, rows) = (self.ctx.screen.cols(), self.ctx.screen.rows());

        let mut child = self.ctx.filter.spawn(&command, cols, rows).await?;
        self.ctx.screen.clear_all()?;
        self.ctx.screen.flush()?;

        loop {
            let step = tokio::select! {
                biased;
                chunk = child.output.recv() => FilterStep::Output(chunk),
                event = self.ctx.input.recv() => FilterStep::Input(event),
                name = self.ctx.signals.recv() => FilterStep::Terminate(name),
            };
            match step {
                FilterStep::Output(Some(bytes)) => {
                    self.ctx.screen.write_raw(&bytes)?;
                    self.ctx.screen.flush()?;
                }
                FilterStep::Output(None) => break,
                FilterStep::Input(Some(InputEvent::Key(key))) => {
                    child.control.write_input(&encode_key(&key))?;
                }
                FilterStep::Input(Some(InputEvent::Resize { cols, rows })) => {
                    self.viewport.resize(&mut self.ctx.screen, cols, rows);
                    child.control.resize(cols, rows)?;
                }
                FilterStep::Input(None) => {
                    child.control.kill();
                    self.request_exit(true, true);
                    return Ok(());
                }
                FilterStep::Terminate(name) => {
                    log::info!("shutting down during filter: {}", name);
                    child.control.kill();
                    self.request_exit(true, true);
                    return Ok(());
                }
            }
        }

        let mut control = child.control;
        let code = tokio::task::spawn_blocking(move || control.wait())
            .await
            .map_err(|e| RlpagerError::filter(format!("filter wait failed: {}", e)))??;
        log::info!("filter exited with status {}", code);

        let message = match code {
            0 => "Done (press a key)".to_string(),
            code => format!("Exit status {} (press a key)", code),
        };
        self.ctx.screen.draw_status(&message, self.ctx.theme.status_info)?;
        self.ctx.screen.flush()?;
        self.wait_any_key().await?;

        self.ctx.screen.clear_all()?;
        self.repaint()
    }

    async fn wait_any_key(&mut self) -> Result<()> {
        loop {
            match self.next_input().await {
                Some(InputEvent::Key(_)) | None => return Ok(()),
                Some(InputEvent::Resize { cols, rows }) => {
                    self.viewport.resize(&mut self.ctx.screen, cols, rows);
                }
            }
        }
    }

    /// Full-screen key summary; space pages, any other key returns
    async fn help(&mut self) -> Result<()> {
        let lines = help_lines();
        let plain = SearchEngine::new(false);
        let status = StatusLine::new();
        let mut view = Viewport::new(
            self.ctx.screen.cols(),
            self.ctx.screen.rows(),
            self.ctx.config.shift_increment,
        );

        let mut top = 0;
        loop {
            let render = RenderContext {
                source: &lines,
                search: &plain,
                theme: &self.ctx.theme,
                title: HELP_TITLE,
                status: &status,
            };
            view.print_page(&mut self.ctx.screen, &render, top)?;

            match self.next_input().await {
                None => return Ok(()),
                Some(InputEvent::Resize { cols, rows }) => {
                    view.resize(&mut self.ctx.screen, cols, rows);
                    self.viewport.state_mut().resize(cols, rows);
                    top = view.first_row();
                }
                Some(InputEvent::Key(key)) => {
                    let at_end = view.state().at_last_page(lines.line_count());
                    if command_code(&key) == Some(b' ') && !at_end {
                        top = view.first_row() + view.page_rows();
                    } else {
                        break;
                    }
                }
            }
        }

        self.repaint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tokio::time::Instant;

    #[tokio::test]
    async fn test_startup_wait_gives_up_after_retries() {
        let (_tx, mut rx) = oneshot::channel::<Readiness>();
        let started = Instant::now();
        let wait = await_first_page(&mut rx, 3, Duration::from_millis(20), || false).await;
        assert_eq!(wait, StartupWait::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_startup_wait_stops_early_for_static_file() {
        let (_tx, mut rx) = oneshot::channel::<Readiness>();
        let checks = std::cell::Cell::new(0);
        let wait = await_first_page(&mut rx, 1000, Duration::from_millis(10), || {
            checks.set(checks.get() + 1);
            checks.get() >= 2
        })
        .await;
        assert_eq!(wait, StartupWait::Static);
        assert_eq!(checks.get(), 2);
    }

    #[tokio::test]
    async fn test_startup_wait_reports_signal() {
        let (tx, mut rx) = oneshot::channel();
        tx.send(Readiness::Ready).unwrap();
        let wait = await_first_page(&mut rx, 5, Duration::from_millis(10), || false).await;
        assert_eq!(wait, StartupWait::Ready);

        let (tx, mut rx) = oneshot::channel();
        tx.send(Readiness::Failed).unwrap();
        let wait = await_first_page(&mut rx, 5, Duration::from_millis(10), || false).await;
        assert_eq!(wait, StartupWait::Failed);

        let (tx, mut rx) = oneshot::channel::<Readiness>();
        drop(tx);
        let wait = await_first_page(&mut rx, 5, Duration::from_millis(10), || false).await;
        assert_eq!(wait, StartupWait::Failed);
    }

    #[test]
    fn test_modification_age_against_cutoff() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(!unmodified_for(temp.path(), Duration::from_secs(3)));

        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        temp.as_file().set_modified(an_hour_ago).unwrap();
        assert!(unmodified_for(temp.path(), Duration::from_secs(3)));
        assert!(!unmodified_for(temp.path(), Duration::from_secs(7200)));

        assert!(!unmodified_for(Path::new("/no/such/file"), Duration::ZERO));
    }
}
