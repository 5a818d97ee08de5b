mod actions;
mod compose;
mod nav;
mod state;
mod tasks;

pub use state::{AppState, ComposeKind, Mode};
use state::{AppMessage, ComposerCommand, Effect};

use actions::handle_action;
use compose::{
    handle_compose_failed, handle_compose_key, handle_compose_poll, handle_compose_save_failed,
    handle_compose_save_skipped, handle_compose_saved, handle_compose_snapshot,
    handle_compose_start_failed, handle_compose_started,
};
use tasks::{spawn_compose_poll, spawn_compose_worker, spawn_load_stream, spawn_push_note};

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::api::client::SyncClient;
use crate::composer::nvim::NvimLauncher;
use crate::composer::{Composer, RequestFlags};
use crate::config::AppConfig;
use crate::error::{ErrorInfo, Result};
use crate::keys::KeybindingMap;
use crate::notes::DayStore;

const WORKER_SHUTDOWN: Duration = Duration::from_secs(1);

/// Everything the run loop needs to turn an [`Effect`] into a task.
struct Runtime {
    store: DayStore,
    sync: Option<SyncClient>,
    composer_tx: mpsc::UnboundedSender<ComposerCommand>,
    requests: Arc<RequestFlags>,
    poll_interval: Duration,
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl Runtime {
    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadStream(request) => spawn_load_stream(&self.store, request, &self.tx),
                Effect::Composer(cmd) => {
                    if self.composer_tx.send(cmd).is_err() {
                        tracing::error!("compose worker is gone");
                    }
                }
                Effect::PushNote(date) => {
                    if let Some(client) = &self.sync {
                        spawn_push_note(client, &self.store, date, &self.tx);
                    }
                }
                Effect::SchedulePoll(generation) => {
                    spawn_compose_poll(self.poll_interval, generation, &self.tx)
                }
            }
        }
    }
}

fn handle_stream_key(state: &mut AppState, key: &KeyEvent, keybindings: &KeybindingMap) -> Vec<Effect> {
    if state.error_popup.is_some() {
        state.error_popup = None;
        return Vec::new();
    }
    if state.show_help {
        // Any key closes help
        state.show_help = false;
        return Vec::new();
    }
    match keybindings.resolve(key) {
        Some(action) => handle_action(state, action),
        None => Vec::new(),
    }
}

pub fn handle_stream_loaded(
    state: &mut AppState,
    days: Vec<crate::notes::DayDocument>,
    has_more: bool,
    anchor: Option<chrono::NaiveDate>,
) -> Vec<Effect> {
    tracing::debug!(days = days.len(), has_more, "stream loaded");
    let queued = state.nav.apply_loaded(days, has_more, anchor);
    if matches!(
        state.status_message.as_deref(),
        Some("loading older notes" | "reloading")
    ) {
        state.status_message = None;
    }
    queued.into_iter().map(Effect::LoadStream).collect()
}

pub fn handle_stream_load_failed(state: &mut AppState, error: ErrorInfo) -> Vec<Effect> {
    tracing::error!(?error, "stream load failed");
    let queued = state.nav.load_failed();
    state.status_message = None;
    state.show_error(&error);
    queued.into_iter().map(Effect::LoadStream).collect()
}

fn handle_sync_finished(state: &mut AppState, result: std::result::Result<(), String>) {
    state.status_message = Some(match result {
        Ok(()) => "synced".into(),
        Err(_) => "sync failed".into(),
    });
}

/// Routes one message to its handler and returns what the run loop should do next.
fn handle_message(
    state: &mut AppState,
    msg: AppMessage,
    keybindings: &KeybindingMap,
    requests: &RequestFlags,
) -> Vec<Effect> {
    match msg {
        AppMessage::Key(key) => match state.mode {
            Mode::Stream => handle_stream_key(state, &key, keybindings),
            Mode::Compose => handle_compose_key(state, key),
        },
        AppMessage::Resize(w, h) => {
            state.resize(w, h);
            Vec::new()
        }
        AppMessage::StreamLoaded {
            days,
            has_more,
            anchor,
        } => handle_stream_loaded(state, days, has_more, anchor),
        AppMessage::StreamLoadFailed(error) => handle_stream_load_failed(state, error),
        AppMessage::SyncFinished { date, result } => {
            tracing::info!(%date, ok = result.is_ok(), "sync finished");
            handle_sync_finished(state, result);
            Vec::new()
        }
        AppMessage::ComposePoll(generation) => {
            handle_compose_poll(state, generation, || requests.take())
        }
        AppMessage::ComposeStarted(snapshot) => handle_compose_started(state, snapshot),
        AppMessage::ComposeStartFailed(error) => {
            handle_compose_start_failed(state, error);
            Vec::new()
        }
        AppMessage::ComposeSnapshot(snapshot) => {
            handle_compose_snapshot(state, snapshot);
            Vec::new()
        }
        AppMessage::ComposeFailed(error) => handle_compose_failed(state, error),
        AppMessage::ComposeSaved {
            date,
            quit,
            snapshot,
        } => handle_compose_saved(state, date, quit, snapshot),
        AppMessage::ComposeSaveSkipped { quit } => handle_compose_save_skipped(state, quit),
        AppMessage::ComposeSaveFailed { error, quit } => {
            tracing::debug!(quit, "save failed, staying in compose");
            handle_compose_save_failed(state, error);
            Vec::new()
        }
    }
}

pub async fn run(config: &AppConfig, terminal: &mut DefaultTerminal) -> Result<()> {
    let keybindings =
        KeybindingMap::from_preset(&config.keybindings.preset, &config.keybindings.bindings)?;

    let store = DayStore::new(config.notes_dir());
    store.ensure_dir()?;
    tracing::info!(dir = %store.dir().display(), "notes directory ready");

    let sync = SyncClient::new(&config.sync.server_url, &config.sync.api_key);

    let size = terminal.size()?;
    let mut state = AppState::new(
        config.stream.initial_days,
        config.stream.load_step,
        keybindings.hints(),
        (size.width, size.height),
    );
    state.sync_enabled = sync.is_some();

    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();

    let composer = Composer::new(NvimLauncher::new(&config.editor.command));
    let requests = composer.requests();
    let (composer_tx, worker) = spawn_compose_worker(composer, store.clone(), tx.clone());

    let runtime = Runtime {
        store,
        sync,
        composer_tx,
        requests,
        poll_interval: Duration::from_millis(config.editor.poll_interval_ms),
        tx: tx.clone(),
    };

    runtime.dispatch(
        state
            .nav
            .reload_request(None)
            .into_iter()
            .map(Effect::LoadStream)
            .collect(),
    );

    // Spawn event reader task
    let event_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            let msg = match reader.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => AppMessage::Key(key),
                Some(Ok(Event::Resize(w, h))) => AppMessage::Resize(w, h),
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => break,
            };
            if event_tx.send(msg).is_err() {
                break;
            }
        }
    });

    // Main loop
    loop {
        terminal.draw(|frame| crate::ui::render(frame, &state))?;

        let Some(msg) = rx.recv().await else {
            break;
        };
        let effects = handle_message(&mut state, msg, &keybindings, &runtime.requests);
        runtime.dispatch(effects);

        if state.should_quit {
            break;
        }
    }

    drop(runtime);
    if tokio::time::timeout(WORKER_SHUTDOWN, worker).await.is_err() {
        tracing::warn!("compose worker did not stop in time");
    }
    tracing::info!("scrbl exiting");

    Ok(())
}
