use std::fmt;

#[derive(Debug)]
pub enum ScrblError {
    Api { status: u16, message: String },
    Http(reqwest::Error),
    Config(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    TomlSer(toml::ser::Error),
}

impl fmt::Display for ScrblError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { status, message } => write!(f, "server returned {}: {}", status, message),
            Self::Http(e) => write!(f, "sync error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::TomlSer(e) => write!(f, "TOML encode error: {}", e),
        }
    }
}

impl std::error::Error for ScrblError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::TomlSer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScrblError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for ScrblError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScrblError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<toml::ser::Error> for ScrblError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSer(e)
    }
}

pub type Result<T> = std::result::Result<T, ScrblError>;

/// Structured error data for the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Read(String),
    Write(String),
    Editor(String),
}

impl ErrorInfo {
    /// Loading the stream is the only path that surfaces a [`ScrblError`]
    /// in a popup; sync failures only reach the status bar.
    pub fn from_scrbl_error(e: &ScrblError) -> Self {
        ErrorInfo::Read(e.to_string())
    }
}

/// Ready-to-render error popup data
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub hint: String,
}

impl ErrorPopup {
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Read(msg) => Self {
                title: "Load Failed".into(),
                message: truncate(msg, 80),
                hint: "Check that the notes directory is readable".into(),
            },
            ErrorInfo::Write(msg) => Self {
                title: "Write Failed".into(),
                message: truncate(msg, 80),
                hint: "Your changes have not been saved".into(),
            },
            ErrorInfo::Editor(msg) => Self {
                title: "Editor Error".into(),
                message: truncate(msg, 80),
                hint: "Check editor.command in config.toml".into(),
            },
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
