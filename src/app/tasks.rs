use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::client::SyncClient;
use crate::composer::{ComposeSnapshot, Composer, ComposerError};
use crate::error::{self, ErrorInfo, ScrblError};
use crate::notes::{self, DayStore};

use super::nav::LoadRequest;
use super::state::{AppMessage, ComposeKind, ComposeTarget, ComposerCommand};

/// Runs a store call on the blocking pool so file I/O never stalls the
/// executor that drives the UI and the editor RPC.
async fn with_store<T, F>(store: &DayStore, f: F) -> error::Result<T>
where
    F: FnOnce(&DayStore) -> error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    match tokio::task::spawn_blocking(move || f(&store)).await {
        Ok(result) => result,
        Err(e) => Err(ScrblError::Io(std::io::Error::other(e))),
    }
}

pub(super) fn spawn_load_stream(
    store: &DayStore,
    request: LoadRequest,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let store = store.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let loaded =
            tokio::task::spawn_blocking(move || store.load_recent(request.limit, notes::today()))
                .await;
        let msg = match loaded {
            Ok(Ok((days, has_more))) => AppMessage::StreamLoaded {
                days,
                has_more,
                anchor: request.anchor,
            },
            Ok(Err(e)) => AppMessage::StreamLoadFailed(ErrorInfo::from_scrbl_error(&e)),
            Err(e) => AppMessage::StreamLoadFailed(ErrorInfo::Read(e.to_string())),
        };
        let _ = tx.send(msg);
    });
}

/// Uploads the day as it is on disk after a save.
pub(super) fn spawn_push_note(
    client: &SyncClient,
    store: &DayStore,
    date: NaiveDate,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client = client.clone();
    let store = store.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match with_store(&store, move |s| s.read_day(date)).await {
            Ok(content) => client.push_note(date, &content).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::warn!(%date, error = %e, "sync push failed");
        }
        let _ = tx.send(AppMessage::SyncFinished {
            date,
            result: result.map_err(|e| e.to_string()),
        });
    });
}

pub(super) fn spawn_compose_poll(
    interval: Duration,
    generation: u64,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(interval).await;
        let _ = tx.send(AppMessage::ComposePoll(generation));
    });
}

/// Owns the composer and runs its commands one at a time. Dropping the
/// returned sender stops the worker and kills any live editor.
pub(super) fn spawn_compose_worker(
    mut composer: Composer,
    store: DayStore,
    tx: mpsc::UnboundedSender<AppMessage>,
) -> (mpsc::UnboundedSender<ComposerCommand>, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<ComposerCommand>();
    let handle = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            run_command(&mut composer, &store, cmd, &tx).await;
        }
        composer.close().await;
    });
    (cmd_tx, handle)
}

async fn run_command(
    composer: &mut Composer,
    store: &DayStore,
    cmd: ComposerCommand,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let msg = match cmd {
        ComposerCommand::Start { target } => match start_compose(composer, store, target).await {
            Ok(snapshot) => AppMessage::ComposeStarted(snapshot),
            Err(error) => {
                composer.close().await;
                AppMessage::ComposeStartFailed(error)
            }
        },
        ComposerCommand::Input(key) => match composer.input(&key).await {
            Ok(()) => match composer.try_snapshot().await {
                Ok(snapshot) => AppMessage::ComposeSnapshot(snapshot),
                Err(e) => AppMessage::ComposeFailed(e),
            },
            Err(ComposerError::NotStarted) => return,
            Err(e) => AppMessage::ComposeFailed(e),
        },
        ComposerCommand::Save { target, quit } => save_compose(composer, store, target, quit).await,
        ComposerCommand::Close => {
            composer.close().await;
            return;
        }
    };
    let _ = tx.send(msg);
}

async fn start_compose(
    composer: &mut Composer,
    store: &DayStore,
    target: ComposeTarget,
) -> Result<ComposeSnapshot, ErrorInfo> {
    let (text, insert) = match target.kind {
        ComposeKind::EditDay => {
            let date = target.date;
            let content = with_store(store, move |s| s.read_day(date))
                .await
                .map_err(|e| ErrorInfo::Read(e.to_string()))?;
            if content.trim().is_empty() {
                (notes::day_template(target.date), false)
            } else {
                (content, false)
            }
        }
        ComposeKind::NewEntry => (String::new(), true),
    };

    let editor_err = |e: ComposerError| ErrorInfo::Editor(e.to_string());
    composer.start().await.map_err(editor_err)?;
    composer.set_content(&text, insert).await.map_err(editor_err)?;
    Ok(composer.snapshot().await)
}

/// Pulls the buffer fresh from the editor so keys still in flight are
/// part of what gets written.
async fn save_compose(
    composer: &mut Composer,
    store: &DayStore,
    target: ComposeTarget,
    quit: bool,
) -> AppMessage {
    let snapshot = match composer.try_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_session_closed() => return AppMessage::ComposeFailed(e),
        Err(e) => {
            return AppMessage::ComposeSaveFailed {
                error: ErrorInfo::Editor(e.to_string()),
                quit,
            }
        }
    };

    match target.kind {
        ComposeKind::EditDay => {
            let date = target.date;
            let text = notes::normalize_for_save(&snapshot.text, date);
            match with_store(store, move |s| s.write_day(date, &text)).await {
                Ok(()) => AppMessage::ComposeSaved {
                    date: target.date,
                    quit,
                    snapshot,
                },
                Err(e) => AppMessage::ComposeSaveFailed {
                    error: ErrorInfo::Write(e.to_string()),
                    quit,
                },
            }
        }
        ComposeKind::NewEntry => {
            if snapshot.text.trim().is_empty() {
                return AppMessage::ComposeSaveSkipped { quit };
            }
            let now = Local::now();
            let date = now.date_naive();
            let time = now.time();
            let entry = snapshot.text.clone();
            if let Err(e) = with_store(store, move |s| s.append_entry(date, time, &entry)).await {
                return AppMessage::ComposeSaveFailed {
                    error: ErrorInfo::Write(e.to_string()),
                    quit,
                };
            }

            let snapshot = if quit {
                snapshot
            } else {
                if let Err(e) = composer.clear().await {
                    tracing::warn!(error = %e, "could not clear editor after save");
                }
                composer.snapshot().await
            };
            AppMessage::ComposeSaved {
                date,
                quit,
                snapshot,
            }
        }
    }
}
