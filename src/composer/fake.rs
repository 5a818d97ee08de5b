//! In-memory editor backend for composer and mode tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ComposerError, EditorLauncher, EditorSession, RequestFlags, Trigger};

const CHANNEL: i64 = 3;

#[derive(Default)]
struct State {
    commands: Vec<String>,
    inputs: Vec<String>,
    lines: Vec<String>,
    mode: String,
    cursor: (i64, i64),
    alive: bool,
    launches: usize,
    shutdowns: usize,
    fail_launch: bool,
    fail_command: Option<String>,
    requests: Option<Arc<RequestFlags>>,
}

/// Handle to the fake editor's state, shared with every session it launches.
#[derive(Clone, Default)]
pub struct FakeEditor {
    state: Arc<Mutex<State>>,
}

impl FakeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.lock().inputs.clone()
    }

    pub fn text(&self) -> String {
        self.lock().lines.join("\n")
    }

    pub fn set_text(&self, text: &str) {
        self.lock().lines = text.split('\n').map(str::to_string).collect();
    }

    pub fn launches(&self) -> usize {
        self.lock().launches
    }

    pub fn shutdowns(&self) -> usize {
        self.lock().shutdowns
    }

    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    pub fn fail_launch(&self) {
        self.lock().fail_launch = true;
    }

    /// Commands starting with `prefix` fail with an RPC error.
    pub fn fail_command(&self, prefix: &str) {
        self.lock().fail_command = Some(prefix.to_string());
    }

    /// Simulates the process dying underneath the host.
    pub fn kill(&self) {
        self.lock().alive = false;
    }

    /// Simulates the user typing `:w`, `:wq` or `:q` inside the editor.
    pub fn trigger(&self, trigger: Trigger) {
        if let Some(flags) = self.lock().requests.as_ref() {
            flags.raise(trigger);
        }
    }
}

pub struct FakeLauncher {
    editor: FakeEditor,
}

impl FakeLauncher {
    pub fn new(editor: FakeEditor) -> Self {
        Self { editor }
    }
}

#[async_trait]
impl EditorLauncher for FakeLauncher {
    async fn launch(
        &self,
        requests: Arc<RequestFlags>,
    ) -> Result<Box<dyn EditorSession>, ComposerError> {
        let mut state = self.editor.lock();
        state.launches += 1;
        if state.fail_launch {
            return Err(ComposerError::Spawn("No such file or directory".into()));
        }
        state.alive = true;
        state.mode = "n".into();
        state.lines = vec![String::new()];
        state.cursor = (1, 0);
        state.requests = Some(requests);
        Ok(Box::new(FakeSession {
            editor: self.editor.clone(),
        }))
    }
}

struct FakeSession {
    editor: FakeEditor,
}

impl FakeSession {
    fn live(&self) -> Result<MutexGuard<'_, State>, ComposerError> {
        let state = self.editor.lock();
        if state.alive {
            Ok(state)
        } else {
            Err(ComposerError::from_rpc("Error receiving response: channel closed"))
        }
    }
}

#[async_trait]
impl EditorSession for FakeSession {
    async fn command(&mut self, cmd: &str) -> Result<(), ComposerError> {
        let mut state = self.live()?;
        if state
            .fail_command
            .as_deref()
            .is_some_and(|prefix| cmd.starts_with(prefix))
        {
            return Err(ComposerError::from_rpc(format!("Vim:E492: {}", cmd)));
        }
        match cmd {
            "startinsert" => state.mode = "i".into(),
            "stopinsert" => state.mode = "n".into(),
            _ => {}
        }
        state.commands.push(cmd.to_string());
        Ok(())
    }

    async fn input(&mut self, keys: &str) -> Result<(), ComposerError> {
        let mut state = self.live()?;
        state.inputs.push(keys.to_string());
        match keys {
            "<CR>" => state.lines.push(String::new()),
            "<Esc>" => state.mode = "n".into(),
            k if !k.starts_with('<') => {
                if let Some(last) = state.lines.last_mut() {
                    last.push_str(k);
                }
            }
            _ => {}
        }
        let row = state.lines.len().max(1) as i64;
        let col = state.lines.last().map_or(0, |l| l.len()) as i64;
        state.cursor = (row, col);
        Ok(())
    }

    async fn lines(&mut self) -> Result<Vec<String>, ComposerError> {
        Ok(self.live()?.lines.clone())
    }

    async fn set_lines(&mut self, lines: Vec<String>) -> Result<(), ComposerError> {
        self.live()?.lines = lines;
        Ok(())
    }

    async fn mode(&mut self) -> Result<String, ComposerError> {
        Ok(self.live()?.mode.clone())
    }

    async fn cursor(&mut self) -> Result<(i64, i64), ComposerError> {
        Ok(self.live()?.cursor)
    }

    async fn set_cursor(&mut self, row: i64, col: i64) -> Result<(), ComposerError> {
        self.live()?.cursor = (row, col);
        Ok(())
    }

    fn channel_id(&self) -> i64 {
        CHANNEL
    }

    async fn shutdown(&mut self) {
        let mut state = self.editor.lock();
        state.alive = false;
        state.shutdowns += 1;
    }
}
