//! Process-wide pager state shared by every file in the list

use crate::app::filter::FilterRunner;
use crate::app::signals::ShutdownSignal;
use crate::config::PagerConfig;
use crate::file_handler::Generation;
use crate::input::InputEvent;
use crate::render::{Screen, Theme};
use crate::search::SearchEngine;
use std::io::Write;
use tokio::sync::mpsc::UnboundedReceiver;

pub struct PagerContext<W: Write> {
    pub screen: Screen<W>,
    pub config: PagerConfig,
    pub theme: Theme,
    /// Retires the tailer of the previous file on every switch
    pub generation: Generation,
    pub input: UnboundedReceiver<InputEvent>,
    pub signals: ShutdownSignal,
    pub filter: Box<dyn FilterRunner>,
    /// Survives file switches; the match position is reset per file
    pub search: SearchEngine,
}

impl<W: Write> PagerContext<W> {
    pub fn new(
        screen: Screen<W>,
        config: PagerConfig,
        input: UnboundedReceiver<InputEvent>,
        signals: ShutdownSignal,
        filter: Box<dyn FilterRunner>,
    ) -> Self {
        let theme = Theme::for_config(config.monochrome);
        let search = SearchEngine::new(config.case_insensitive);
        Self {
            screen,
            config,
            theme,
            generation: Generation::new(),
            input,
            signals,
            filter,
            search,
        }
    }
}
