//! Editor bridge: drives an embedded, headless Neovim over msgpack-RPC.
//!
//! The editor never writes files. Its `:w`, `:wq` and `:q` family are
//! rewritten into RPC notifications that raise [`RequestFlags`], and the host
//! decides what to persist.

pub mod keys;
pub mod nvim;
pub mod requests;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::KeyEvent;

pub use keys::translate_key;
pub use requests::{PendingRequests, RequestFlags, Trigger};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeSnapshot {
    pub text: String,
    pub mode: String,
    /// 1-based line.
    pub cursor_row: usize,
    /// 0-based byte column.
    pub cursor_col: usize,
}

impl ComposeSnapshot {
    pub fn is_insert(&self) -> bool {
        self.mode.starts_with('i')
    }

    pub fn mode_label(&self) -> &'static str {
        match self.mode.chars().next() {
            Some('i') => "INSERT",
            Some('v') | Some('V') | Some('\u{16}') => "VISUAL",
            Some('R') => "REPLACE",
            Some('c') => "COMMAND",
            Some(_) => "NORMAL",
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    #[error("could not start editor: {0}")]
    Spawn(String),
    #[error("could not configure editor: {0}")]
    Setup(String),
    #[error("composer is not started")]
    NotStarted,
    #[error("editor session closed: {0}")]
    SessionClosed(String),
    #[error("editor request failed: {0}")]
    Rpc(String),
}

impl ComposerError {
    /// Classifies a failed RPC call by its message. Failures caused by the
    /// editor process going away become [`ComposerError::SessionClosed`].
    pub fn from_rpc(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_session_closed_message(&message) {
            Self::SessionClosed(message)
        } else {
            Self::Rpc(message)
        }
    }

    pub fn is_session_closed(&self) -> bool {
        matches!(self, Self::SessionClosed(_))
    }
}

fn is_session_closed_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    [
        "session closed",
        "channel closed",
        "broken pipe",
        "error receiving response",
        "error sending request",
        "connection reset",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}

/// One running editor process.
#[async_trait]
pub trait EditorSession: Send {
    async fn command(&mut self, cmd: &str) -> Result<(), ComposerError>;
    async fn input(&mut self, keys: &str) -> Result<(), ComposerError>;
    async fn lines(&mut self) -> Result<Vec<String>, ComposerError>;
    async fn set_lines(&mut self, lines: Vec<String>) -> Result<(), ComposerError>;
    async fn mode(&mut self) -> Result<String, ComposerError>;
    /// (1-based row, 0-based byte column)
    async fn cursor(&mut self) -> Result<(i64, i64), ComposerError>;
    async fn set_cursor(&mut self, row: i64, col: i64) -> Result<(), ComposerError>;
    /// RPC channel the editor uses to reach this host.
    fn channel_id(&self) -> i64;
    async fn shutdown(&mut self);
}

#[async_trait]
pub trait EditorLauncher: Send + Sync {
    /// Spawns a session whose notifications raise `requests`.
    async fn launch(
        &self,
        requests: Arc<RequestFlags>,
    ) -> Result<Box<dyn EditorSession>, ComposerError>;
}

/// Commands that turn a bare Neovim into the compose buffer.
pub fn setup_commands(channel: i64) -> Vec<String> {
    let mut cmds: Vec<String> = [
        "enew",
        "setlocal buftype=nofile bufhidden=wipe noswapfile",
        "setlocal filetype=markdown",
        "setlocal nowrap",
        "set noshowmode noruler noshowcmd",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for trigger in Trigger::ALL {
        cmds.push(format!(
            "command! {} call rpcnotify({}, '{}')",
            trigger.command(),
            channel,
            trigger.name()
        ));
    }

    let redirects = [
        ("w", Trigger::Save),
        ("wq", Trigger::SaveThenQuit),
        ("x", Trigger::SaveThenQuit),
        ("q", Trigger::Quit),
        ("q!", Trigger::Quit),
        ("qa", Trigger::Quit),
        ("qa!", Trigger::Quit),
        ("quit", Trigger::Quit),
        ("quit!", Trigger::Quit),
    ];
    for (typed, trigger) in redirects {
        cmds.push(format!(
            "cnoreabbrev <expr> {typed} (getcmdtype() == ':' && getcmdline() ==# '{typed}') ? '{}' : '{typed}'",
            trigger.command()
        ));
    }

    cmds.push("startinsert".into());
    cmds
}

pub struct Composer {
    launcher: Box<dyn EditorLauncher>,
    session: Option<Box<dyn EditorSession>>,
    requests: Arc<RequestFlags>,
}

impl Composer {
    pub fn new(launcher: impl EditorLauncher + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
            session: None,
            requests: Arc::new(RequestFlags::new()),
        }
    }

    /// Shared flags, polled by the UI loop while composing.
    pub fn requests(&self) -> Arc<RequestFlags> {
        Arc::clone(&self.requests)
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Reuses a live session or spawns and configures a new one. Any
    /// failure leaves the composer idle with no process behind.
    pub async fn start(&mut self) -> Result<(), ComposerError> {
        if let Some(session) = self.session.as_mut() {
            if session.mode().await.is_ok() {
                return Ok(());
            }
            self.close().await;
        }

        self.requests.clear();
        let mut session = self.launcher.launch(Arc::clone(&self.requests)).await?;
        tracing::info!(channel = session.channel_id(), "editor started");

        for cmd in setup_commands(session.channel_id()) {
            if let Err(e) = session.command(&cmd).await {
                tracing::warn!(error = %e, command = %cmd, "editor setup failed");
                session.shutdown().await;
                self.requests.clear();
                return Err(ComposerError::Setup(e.to_string()));
            }
        }

        self.session = Some(session);
        Ok(())
    }

    pub async fn input(&mut self, key: &KeyEvent) -> Result<(), ComposerError> {
        let session = self.session.as_mut().ok_or(ComposerError::NotStarted)?;
        let keys = translate_key(key);
        if keys.is_empty() {
            return Ok(());
        }
        session.input(&keys).await
    }

    /// Buffer text, mode and cursor. Mode and cursor fall back to defaults
    /// when only those queries fail.
    pub async fn try_snapshot(&mut self) -> Result<ComposeSnapshot, ComposerError> {
        let session = self.session.as_mut().ok_or(ComposerError::NotStarted)?;
        let lines = session.lines().await?;
        let mode = session.mode().await.unwrap_or_default();
        let (row, col) = session.cursor().await.unwrap_or((1, 0));

        Ok(ComposeSnapshot {
            text: lines.join("\n"),
            mode,
            cursor_row: row.max(1) as usize,
            cursor_col: col.max(0) as usize,
        })
    }

    /// Like [`Composer::try_snapshot`], but idle or failing sessions yield
    /// an empty snapshot.
    pub async fn snapshot(&mut self) -> ComposeSnapshot {
        self.try_snapshot().await.unwrap_or_default()
    }

    pub async fn set_content(&mut self, text: &str, insert_mode: bool) -> Result<(), ComposerError> {
        let session = self.session.as_mut().ok_or(ComposerError::NotStarted)?;

        let normalized = text.replace("\r\n", "\n");
        let lines: Vec<String> = normalized.split('\n').map(str::to_string).collect();
        session.set_lines(lines).await?;
        let _ = session.set_cursor(1, 0).await;

        session
            .command(if insert_mode { "startinsert" } else { "stopinsert" })
            .await
    }

    pub async fn clear(&mut self) -> Result<(), ComposerError> {
        self.set_content("", true).await
    }

    pub fn consume_requests(&self) -> PendingRequests {
        self.requests.take()
    }

    /// Kills the editor process. Safe to call when idle.
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.shutdown().await;
            tracing::info!("editor closed");
        }
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeEditor, FakeLauncher};
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn composer() -> (Composer, FakeEditor) {
        let editor = FakeEditor::new();
        (Composer::new(FakeLauncher::new(editor.clone())), editor)
    }

    #[tokio::test]
    async fn start_runs_setup_and_enters_insert() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();

        assert!(composer.is_running());
        let commands = editor.commands();
        assert_eq!(commands.first().map(String::as_str), Some("enew"));
        assert!(commands
            .iter()
            .any(|c| c == "command! ScrblWrite call rpcnotify(3, 'scrbl_write')"));
        assert!(commands.iter().any(|c| c.starts_with("cnoreabbrev <expr> wq ")));
        assert_eq!(commands.last().map(String::as_str), Some("startinsert"));
    }

    #[tokio::test]
    async fn start_reuses_live_session() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();
        composer.start().await.unwrap();
        assert_eq!(editor.launches(), 1);
    }

    #[tokio::test]
    async fn start_replaces_dead_session() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();
        editor.kill();
        composer.start().await.unwrap();
        assert_eq!(editor.launches(), 2);
    }

    #[tokio::test]
    async fn launch_failure_leaves_composer_idle() {
        let (mut composer, editor) = composer();
        editor.fail_launch();
        let err = composer.start().await.unwrap_err();
        assert!(matches!(err, ComposerError::Spawn(_)));
        assert!(!composer.is_running());
    }

    #[tokio::test]
    async fn setup_failure_shuts_process_down() {
        let (mut composer, editor) = composer();
        editor.fail_command("cnoreabbrev");
        let err = composer.start().await.unwrap_err();

        assert!(matches!(err, ComposerError::Setup(_)));
        assert!(!composer.is_running());
        assert_eq!(editor.shutdowns(), 1);
    }

    #[tokio::test]
    async fn input_translates_and_skips_unmapped_keys() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();

        composer
            .input(&KeyEvent::new(KeyCode::Char('<'), KeyModifiers::NONE))
            .await
            .unwrap();
        composer
            .input(&KeyEvent::new(KeyCode::F(9), KeyModifiers::NONE))
            .await
            .unwrap();

        assert_eq!(editor.inputs(), vec!["<lt>".to_string()]);
    }

    #[tokio::test]
    async fn input_without_session_is_not_started() {
        let (mut composer, _editor) = composer();
        let err = composer
            .input(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
            .await
            .unwrap_err();
        assert_eq!(err, ComposerError::NotStarted);
    }

    #[tokio::test]
    async fn set_content_normalizes_and_positions_cursor() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();
        composer.set_content("a\r\nb\n", false).await.unwrap();

        let snap = composer.snapshot().await;
        assert_eq!(snap.text, "a\nb\n");
        assert_eq!((snap.cursor_row, snap.cursor_col), (1, 0));
        assert_eq!(editor.commands().last().map(String::as_str), Some("stopinsert"));
        assert!(!snap.is_insert());
    }

    #[tokio::test]
    async fn snapshot_is_empty_when_idle_or_dead() {
        let (mut composer, editor) = composer();
        assert_eq!(composer.snapshot().await, ComposeSnapshot::default());

        composer.start().await.unwrap();
        editor.kill();
        assert_eq!(composer.snapshot().await, ComposeSnapshot::default());
        assert!(composer.try_snapshot().await.unwrap_err().is_session_closed());
    }

    #[tokio::test]
    async fn consume_requests_sees_editor_triggers() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();
        editor.trigger(Trigger::Save);

        let pending = composer.consume_requests();
        assert!(pending.save && !pending.quit && !pending.quit_after_save);
        assert!(composer.consume_requests().is_empty());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_clears_flags() {
        let (mut composer, editor) = composer();
        composer.start().await.unwrap();
        editor.trigger(Trigger::Quit);

        composer.close().await;
        composer.close().await;

        assert!(!composer.is_running());
        assert_eq!(editor.shutdowns(), 1);
        assert!(composer.consume_requests().is_empty());
    }

    #[test]
    fn rpc_errors_are_classified_by_message() {
        assert!(ComposerError::from_rpc("Error receiving response: channel closed").is_session_closed());
        assert!(ComposerError::from_rpc("write: Broken pipe (os error 32)").is_session_closed());
        assert!(!ComposerError::from_rpc("Vim:E492: Not an editor command").is_session_closed());
    }

    #[test]
    fn mode_labels() {
        let snap = |mode: &str| ComposeSnapshot {
            mode: mode.into(),
            ..Default::default()
        };
        assert_eq!(snap("i").mode_label(), "INSERT");
        assert_eq!(snap("n").mode_label(), "NORMAL");
        assert_eq!(snap("V").mode_label(), "VISUAL");
        assert_eq!(snap("").mode_label(), "");
    }
}
