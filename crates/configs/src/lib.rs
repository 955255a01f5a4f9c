//! Layered configuration: defaults, then an optional `agora.toml`, then
//! `AGORA_*` environment variables (highest precedence). A `.env` file is
//! honored for local development.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Absent means the in-memory store.
    pub url: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// An `EnvFilter` directive string, e.g. `info,services=debug`.
    pub filter: String,
}

/// Loads configuration from all layers.
pub fn load() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let config = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("log.filter", "info")?
        .add_source(File::with_name("agora").required(false))
        .add_source(Environment::with_prefix("AGORA").separator("__"))
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    debug!(host = %app.server.host, port = app.server.port, "configuration loaded");
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = load().expect("defaults must load");
        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.log.filter, "info");
    }
}
