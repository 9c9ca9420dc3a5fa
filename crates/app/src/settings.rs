//! Handles settings for the service. Configuration is read from
//! `config/finsync.toml` when present and from `FINSYNC__*` environment
//! variables (e.g. `FINSYNC__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/finsync";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// Start with the demo records instead of an empty store.
    pub seed: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            seed: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_sources(DEFAULT_CONFIG_PATH, "FINSYNC")
    }

    fn from_sources(path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
