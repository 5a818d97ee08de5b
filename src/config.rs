use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrblError};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NotesConfig {
    /// Empty means `<config dir>/notes`.
    #[serde(default)]
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "default_editor_command")]
    pub command: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            command: default_editor_command(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StreamConfig {
    #[serde(default = "default_initial_days")]
    pub initial_days: usize,
    #[serde(default = "default_load_step")]
    pub load_step: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_days: default_initial_days(),
            load_step: default_load_step(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeybindingsConfig {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            bindings: HashMap::new(),
        }
    }
}

fn default_editor_command() -> String {
    "nvim".into()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_initial_days() -> usize {
    60
}

fn default_load_step() -> usize {
    60
}

fn default_preset() -> String {
    "vim".into()
}

impl AppConfig {
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::defaults()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SCRBL_").split("__"))
            .extract()
            .map_err(|e| ScrblError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.editor.command.trim().is_empty() {
            return Err(ScrblError::Config("editor.command is required".into()));
        }
        if self.editor.poll_interval_ms == 0 {
            return Err(ScrblError::Config(
                "editor.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.stream.initial_days == 0 || self.stream.load_step == 0 {
            return Err(ScrblError::Config(
                "stream.initial_days and stream.load_step must be greater than zero".into(),
            ));
        }
        let url = self.sync.server_url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ScrblError::Config(format!(
                "sync.server_url must start with http:// or https:// (got {})",
                url
            )));
        }
        Ok(())
    }

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|xdg| PathBuf::from(xdg).join("scrbl"))
            .or_else(|| {
                directories::BaseDirs::new()
                    .map(|dirs| dirs.home_dir().join(".config").join("scrbl"))
            })
    }

    /// Resolved notes directory: `notes.dir` with `~` expanded, or `<config dir>/notes`.
    pub fn notes_dir(&self) -> PathBuf {
        let raw = self.notes.dir.trim();
        if raw.is_empty() {
            return Self::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("notes");
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(raw)
    }

    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let body = toml::to_string_pretty(&AppConfig::defaults())?;
        let content = format!(
            "# scrbl configuration\n\
             # notes.dir defaults to <config dir>/notes; an empty sync.server_url disables sync.\n\
             # Environment overrides use SCRBL_ and __ for nesting, e.g. SCRBL_SYNC__API_KEY.\n\n{}",
            body
        );

        std::fs::write(path, content)?;
        Ok(())
    }

    fn defaults() -> Self {
        Self {
            notes: NotesConfig::default(),
            sync: SyncConfig::default(),
            editor: EditorConfig::default(),
            stream: StreamConfig::default(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}
