mod app;
mod client;
mod config;
mod error;
mod provider;
mod session;
mod ui;

use std::{fs::OpenOptions, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, error::Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}

/// Logs go to a file, the terminal belongs to the UI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "finsync_tui={level},engine={level}",
            level = config.log_level
        )))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("finsync_tui started against {}", config.base_url);
    Ok(())
}
