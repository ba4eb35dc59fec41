use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use client_core::{
    catalog::DEFAULT_CATALOG_SOURCE,
    chat::{ChatOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL},
    completion::{DEFAULT_COMPLETION_URL, DEFAULT_REQUEST_TIMEOUT},
    EndpointSettings,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "advisor.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog: String,
    pub database_url: String,
    pub completion_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG_SOURCE.into(),
            database_url: "sqlite://./data/advisor.db".into(),
            completion_url: DEFAULT_COMPLETION_URL.into(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        }
    }

    pub fn endpoint_settings(&self) -> Result<EndpointSettings> {
        let mut endpoint = EndpointSettings::new(&self.completion_url)?;
        endpoint.api_key = self.api_key.clone().filter(|key| !key.is_empty());
        endpoint.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(endpoint)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    catalog: Option<String>,
    database_url: Option<String>,
    completion_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables. An explicit
/// `config_path` must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if required || path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.catalog {
        settings.catalog = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.completion_url {
        settings.completion_url = v;
    }
    if let Some(v) = file_cfg.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_cfg.model {
        settings.model = v;
    }
    if let Some(v) = file_cfg.max_tokens {
        settings.max_tokens = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(key));

    if let Some(v) = first(&["APP__CATALOG", "ADVISOR_CATALOG"]) {
        settings.catalog = v;
    }
    if let Some(v) = first(&["APP__DATABASE_URL", "ADVISOR_DATABASE_URL"]) {
        settings.database_url = v;
    }
    if let Some(v) = first(&["APP__COMPLETION_URL", "ADVISOR_COMPLETION_URL"]) {
        settings.completion_url = v;
    }
    if let Some(v) = first(&["APP__API_KEY", "ADVISOR_API_KEY", "OPENAI_API_KEY"]) {
        settings.api_key = Some(v);
    }
    if let Some(v) = first(&["APP__MODEL", "ADVISOR_MODEL"]) {
        settings.model = v;
    }
    if let Some(v) = first(&["APP__MAX_TOKENS", "ADVISOR_MAX_TOKENS"]) {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.max_tokens = parsed;
        }
    }
    if let Some(v) = first(&["APP__REQUEST_TIMEOUT_SECS", "ADVISOR_REQUEST_TIMEOUT_SECS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

/// Accepts plain file paths as well as sqlite URLs.
pub fn normalize_database_url(raw_database_url: &str) -> String {
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
