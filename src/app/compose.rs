//! Stream/Compose mode transitions.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::composer::{ComposeSnapshot, ComposerError, PendingRequests};
use crate::error::ErrorInfo;

use super::state::{AppState, ComposerCommand, Effect, Mode};

/// Keys the host keeps for itself while the editor has focus.
fn host_key(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers == KeyModifiers::CONTROL => match c {
            'c' | 'g' | 's' => Some(c),
            _ => None,
        },
        _ => None,
    }
}

pub(super) fn handle_compose_key(state: &mut AppState, key: KeyEvent) -> Vec<Effect> {
    if state.error_popup.take().is_some() {
        return Vec::new();
    }

    match host_key(&key) {
        Some('c') => {
            state.should_quit = true;
            Vec::new()
        }
        Some('g') => {
            state.status_message = Some("discarded".into());
            leave_compose(state)
        }
        Some('s') => request_save(state, false),
        _ => vec![Effect::Composer(ComposerCommand::Input(key))],
    }
}

pub(super) fn handle_compose_started(state: &mut AppState, snapshot: ComposeSnapshot) -> Vec<Effect> {
    state.compose_pending = false;
    if state.compose_target.is_none() {
        return vec![Effect::Composer(ComposerCommand::Close)];
    }
    state.mode = Mode::Compose;
    state.session += 1;
    state.snapshot = snapshot;
    state.status_message = None;
    state.relayout();
    vec![Effect::SchedulePoll(state.session)]
}

pub(super) fn handle_compose_start_failed(state: &mut AppState, error: ErrorInfo) {
    tracing::warn!(?error, "editor failed to start");
    state.compose_pending = false;
    state.compose_target = None;
    state.status_message = None;
    state.show_error(&error);
}

/// Consumes the editor's pending requests for the session `generation`.
/// Ticks from an earlier session are dropped without re-arming.
pub(super) fn handle_compose_poll(
    state: &mut AppState,
    generation: u64,
    take_requests: impl FnOnce() -> PendingRequests,
) -> Vec<Effect> {
    if state.mode != Mode::Compose || generation != state.session {
        return Vec::new();
    }
    if state.saving {
        return vec![Effect::SchedulePoll(generation)];
    }

    let pending = take_requests();
    if pending.save {
        let mut effects = request_save(state, pending.wants_exit());
        effects.push(Effect::SchedulePoll(generation));
        effects
    } else if pending.quit {
        leave_compose(state)
    } else {
        vec![Effect::SchedulePoll(generation)]
    }
}

fn request_save(state: &mut AppState, quit: bool) -> Vec<Effect> {
    let Some(target) = state.compose_target else {
        return Vec::new();
    };
    if state.saving {
        return Vec::new();
    }
    state.saving = true;
    state.status_message = Some("saving".into());
    vec![Effect::Composer(ComposerCommand::Save { target, quit })]
}

pub(super) fn handle_compose_saved(
    state: &mut AppState,
    date: NaiveDate,
    quit: bool,
    snapshot: ComposeSnapshot,
) -> Vec<Effect> {
    tracing::info!(%date, "note saved");
    state.saving = false;
    state.status_message = Some("saved".into());

    let mut effects: Vec<Effect> = state
        .nav
        .reload_request(Some(date))
        .into_iter()
        .map(Effect::LoadStream)
        .collect();
    if state.sync_enabled {
        state.status_message = Some("syncing".into());
        effects.push(Effect::PushNote(date));
    }

    if quit {
        effects.extend(leave_compose(state));
    } else if state.mode == Mode::Compose {
        state.snapshot = snapshot;
    }
    effects
}

pub(super) fn handle_compose_save_skipped(state: &mut AppState, quit: bool) -> Vec<Effect> {
    state.saving = false;
    state.status_message = Some("empty note".into());
    if quit {
        leave_compose(state)
    } else {
        Vec::new()
    }
}

/// A failed write never leaves compose mode, so the buffer survives.
pub(super) fn handle_compose_save_failed(state: &mut AppState, error: ErrorInfo) {
    tracing::error!(?error, "save failed");
    state.saving = false;
    state.status_message = None;
    state.show_error(&error);
}

pub(super) fn handle_compose_snapshot(state: &mut AppState, snapshot: ComposeSnapshot) {
    if state.mode == Mode::Compose {
        state.snapshot = snapshot;
    }
}

pub(super) fn handle_compose_failed(state: &mut AppState, error: ComposerError) -> Vec<Effect> {
    state.saving = false;
    if error.is_session_closed() {
        tracing::info!(%error, "editor went away, leaving compose");
        state.status_message = Some("editor closed".into());
        return leave_compose(state);
    }
    tracing::warn!(%error, "editor request failed");
    state.show_error(&ErrorInfo::Editor(error.to_string()));
    Vec::new()
}

/// Back to the stream. The worker kills the editor process.
pub(super) fn leave_compose(state: &mut AppState) -> Vec<Effect> {
    let was_composing = state.mode == Mode::Compose;
    state.mode = Mode::Stream;
    state.compose_target = None;
    state.saving = false;
    state.snapshot = ComposeSnapshot::default();
    if was_composing {
        state.relayout();
    }
    vec![Effect::Composer(ComposerCommand::Close)]
}
