use chrono::NaiveDate;
use crossterm::event::KeyEvent;

use crate::composer::{ComposeSnapshot, ComposerError};
use crate::error::{ErrorInfo, ErrorPopup};
use crate::notes::DayDocument;
use crate::stream::render_width;

use super::nav::{LoadRequest, Navigator};

/// Rows taken by the header and the status bar.
const CHROME_ROWS: u16 = 2;
const COMPOSE_ROWS_SHORT: u16 = 8;
const COMPOSE_ROWS_TALL: u16 = 12;
const SHORT_TERMINAL: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stream,
    Compose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeKind {
    /// Appended to today's file under a timestamp.
    NewEntry,
    /// Replaces the whole day file.
    EditDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeTarget {
    pub kind: ComposeKind,
    pub date: NaiveDate,
}

/// Work for the compose worker, executed strictly in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerCommand {
    Start { target: ComposeTarget },
    Input(KeyEvent),
    Save { target: ComposeTarget, quit: bool },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Key(KeyEvent),
    Resize(u16, u16),
    StreamLoaded {
        days: Vec<DayDocument>,
        has_more: bool,
        anchor: Option<NaiveDate>,
    },
    StreamLoadFailed(ErrorInfo),
    SyncFinished {
        date: NaiveDate,
        result: Result<(), String>,
    },
    /// Poll tick for the compose session with this generation.
    ComposePoll(u64),
    ComposeStarted(ComposeSnapshot),
    ComposeStartFailed(ErrorInfo),
    ComposeSnapshot(ComposeSnapshot),
    ComposeFailed(ComposerError),
    ComposeSaved {
        date: NaiveDate,
        quit: bool,
        snapshot: ComposeSnapshot,
    },
    ComposeSaveSkipped {
        quit: bool,
    },
    ComposeSaveFailed {
        error: ErrorInfo,
        quit: bool,
    },
}

/// Side effects requested by the handlers; the run loop turns them into tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadStream(LoadRequest),
    Composer(ComposerCommand),
    PushNote(NaiveDate),
    SchedulePoll(u64),
}

pub struct AppState {
    pub nav: Navigator,
    pub mode: Mode,
    pub compose_target: Option<ComposeTarget>,
    /// A start request is with the worker and not answered yet.
    pub compose_pending: bool,
    pub saving: bool,
    /// Generation of the current compose session; stale poll ticks carry an older one.
    pub session: u64,
    pub snapshot: ComposeSnapshot,
    pub load_step: usize,
    pub sync_enabled: bool,
    pub status_message: Option<String>,
    pub hints: Vec<(String, &'static str)>,
    pub error_popup: Option<ErrorPopup>,
    pub show_help: bool,
    pub should_quit: bool,
    pub term_width: u16,
    pub term_height: u16,
}

impl AppState {
    pub fn new(
        initial_days: usize,
        load_step: usize,
        hints: Vec<(String, &'static str)>,
        (term_width, term_height): (u16, u16),
    ) -> Self {
        let mut state = Self {
            nav: Navigator::new(initial_days, render_width(term_width), 1),
            mode: Mode::Stream,
            compose_target: None,
            compose_pending: false,
            saving: false,
            session: 0,
            snapshot: ComposeSnapshot::default(),
            load_step,
            sync_enabled: false,
            status_message: None,
            hints,
            error_popup: None,
            show_help: false,
            should_quit: false,
            term_width,
            term_height,
        };
        state.relayout();
        state
    }

    /// Height of the compose pane, borders included. A single rule while
    /// browsing the stream.
    pub fn compose_rows(&self) -> u16 {
        match self.mode {
            Mode::Stream => 1,
            Mode::Compose if self.term_height < SHORT_TERMINAL => COMPOSE_ROWS_SHORT + 2,
            Mode::Compose => COMPOSE_ROWS_TALL + 2,
        }
    }

    pub fn stream_rows(&self) -> u16 {
        self.term_height
            .saturating_sub(CHROME_ROWS + self.compose_rows())
            .max(1)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.term_width = width;
        self.term_height = height;
        self.relayout();
    }

    /// Re-fits the navigator after a terminal or mode change.
    pub fn relayout(&mut self) {
        self.nav
            .resize(render_width(self.term_width), self.stream_rows() as usize);
    }

    pub fn show_error(&mut self, info: &ErrorInfo) {
        self.error_popup = Some(ErrorPopup::from_error_info(info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_pane_grows_with_terminal() {
        let mut state = AppState::new(60, 60, Vec::new(), (100, 20));
        assert_eq!(state.compose_rows(), 1);
        assert_eq!(state.stream_rows(), 17);

        state.mode = Mode::Compose;
        assert_eq!(state.compose_rows(), 10);
        state.resize(100, 40);
        assert_eq!(state.compose_rows(), 14);
        assert_eq!(state.stream_rows(), 24);
        assert_eq!(state.nav.height(), 24);
    }

    #[test]
    fn stream_rows_never_zero() {
        let state = AppState::new(60, 60, Vec::new(), (10, 2));
        assert_eq!(state.stream_rows(), 1);
    }
}
