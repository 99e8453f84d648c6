use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_FILE: &str = "server";
const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/matters.db".into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Defaults, then `server.toml` when present, then `APP__*` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    build_settings(None, ENV_PREFIX)
}

pub(crate) fn build_settings(file: Option<&Path>, env_prefix: &str) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let file_source = match file {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
    };

    let settings = Config::builder()
        .set_default("bind_addr", defaults.bind_addr)?
        .set_default("database_url", defaults.database_url)?
        .set_default("max_body_bytes", defaults.max_body_bytes as i64)?
        .add_source(file_source)
        .add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to assemble server settings")?;

    let mut settings: Settings = settings
        .try_deserialize()
        .context("invalid server settings")?;
    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

/// Turns a bare file path into a `sqlite://` URL; URLs pass through.
pub(crate) fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
