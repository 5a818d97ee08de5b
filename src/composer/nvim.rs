use std::sync::Arc;

use async_trait::async_trait;
use nvim_rs::compat::tokio::Compat;
use nvim_rs::create::tokio as create;
use nvim_rs::error::LoopError;
use nvim_rs::{Handler, Neovim, Value};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use super::{ComposerError, EditorLauncher, EditorSession, RequestFlags, Trigger};

type Writer = Compat<ChildStdin>;

/// No user config, no shada, no swap: every session starts identical.
const EMBED_ARGS: [&str; 7] = ["--embed", "--headless", "-u", "NONE", "-n", "-i", "NONE"];

#[derive(Clone)]
struct NotifyHandler {
    requests: Arc<RequestFlags>,
}

#[async_trait]
impl Handler for NotifyHandler {
    type Writer = Writer;

    async fn handle_notify(&self, name: String, _args: Vec<Value>, _neovim: Neovim<Writer>) {
        match Trigger::from_name(&name) {
            Some(trigger) => {
                tracing::debug!(trigger = trigger.name(), "editor trigger received");
                self.requests.raise(trigger);
            }
            None => tracing::trace!(%name, "ignoring editor notification"),
        }
    }
}

pub struct NvimLauncher {
    command: String,
}

impl NvimLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl EditorLauncher for NvimLauncher {
    async fn launch(
        &self,
        requests: Arc<RequestFlags>,
    ) -> Result<Box<dyn EditorSession>, ComposerError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(EMBED_ARGS).kill_on_drop(true);

        let (nvim, io_handle, child) = create::new_child_cmd(&mut cmd, NotifyHandler { requests })
            .await
            .map_err(|e| ComposerError::Spawn(format!("{}: {}", self.command, e)))?;

        let mut session = NvimSession {
            nvim,
            io_handle,
            child,
            channel: 0,
        };

        match session.nvim.get_api_info().await {
            Ok(info) => {
                session.channel = info.first().and_then(Value::as_i64).unwrap_or(0);
            }
            Err(e) => {
                session.shutdown().await;
                return Err(ComposerError::Spawn(e.to_string()));
            }
        }

        Ok(Box::new(session))
    }
}

pub struct NvimSession {
    nvim: Neovim<Writer>,
    io_handle: JoinHandle<Result<(), Box<LoopError>>>,
    child: Child,
    channel: i64,
}

fn rpc_error(e: impl std::fmt::Display) -> ComposerError {
    ComposerError::from_rpc(e.to_string())
}

#[async_trait]
impl EditorSession for NvimSession {
    async fn command(&mut self, cmd: &str) -> Result<(), ComposerError> {
        self.nvim.command(cmd).await.map_err(rpc_error)
    }

    async fn input(&mut self, keys: &str) -> Result<(), ComposerError> {
        self.nvim.input(keys).await.map(|_| ()).map_err(rpc_error)
    }

    async fn lines(&mut self) -> Result<Vec<String>, ComposerError> {
        let buf = self.nvim.get_current_buf().await.map_err(rpc_error)?;
        buf.get_lines(0, -1, false).await.map_err(rpc_error)
    }

    async fn set_lines(&mut self, lines: Vec<String>) -> Result<(), ComposerError> {
        let buf = self.nvim.get_current_buf().await.map_err(rpc_error)?;
        buf.set_lines(0, -1, false, lines).await.map_err(rpc_error)
    }

    async fn mode(&mut self) -> Result<String, ComposerError> {
        let pairs = self.nvim.get_mode().await.map_err(rpc_error)?;
        Ok(pairs
            .into_iter()
            .find(|(k, _)| k.as_str() == Some("mode"))
            .and_then(|(_, v)| v.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    async fn cursor(&mut self) -> Result<(i64, i64), ComposerError> {
        let win = self.nvim.get_current_win().await.map_err(rpc_error)?;
        win.get_cursor().await.map_err(rpc_error)
    }

    async fn set_cursor(&mut self, row: i64, col: i64) -> Result<(), ComposerError> {
        let win = self.nvim.get_current_win().await.map_err(rpc_error)?;
        win.set_cursor((row, col)).await.map_err(rpc_error)
    }

    fn channel_id(&self) -> i64 {
        self.channel
    }

    async fn shutdown(&mut self) {
        self.io_handle.abort();
        if let Err(e) = self.child.kill().await {
            tracing::debug!(error = %e, "editor process already gone");
        }
    }
}
