// Re-export library modules so binary-internal modules can use crate::api:: and friends
pub(crate) use scrbl::{api, error, notes};

mod app;
mod composer;
mod config;
mod keys;
mod markdown;
mod stream;
mod ui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::AppConfig;

const LOG_ENV: &str = "SCRBL_LOG";

fn config_path() -> PathBuf {
    AppConfig::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Logs go to a file next to the config; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("scrbl.log"))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();

    if !path.exists() {
        AppConfig::write_default(&path)?;
        eprintln!("Created default config at: {}", path.display());
    }

    let config = match AppConfig::load_from_path(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            eprintln!("Fix the config file or delete it to regenerate defaults.");
            return Ok(());
        }
    };

    let log_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    if let Err(e) = init_logging(&log_dir) {
        eprintln!("Logging disabled: {}", e);
    }
    tracing::info!(config = %path.display(), "scrbl starting");

    let mut terminal = ratatui::init();

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let result = app::run(&config, &mut terminal).await;

    ratatui::restore();

    if let Err(e) = result {
        tracing::error!(error = %e, "scrbl exited with an error");
        eprintln!("Error: {}", e);
    }

    Ok(())
}
