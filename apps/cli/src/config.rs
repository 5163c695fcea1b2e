use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub session_database_url: String,
    pub login_latency_ms: u64,
    pub login_timeout_ms: u64,
    pub utc_offset_minutes: i32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_database_url: "sqlite://./data/session.db".into(),
            login_latency_ms: 1000,
            login_timeout_ms: 5000,
            utc_offset_minutes: 0,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }

    /// Offset "today" and "this week" are evaluated in.
    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!(
                    "utc_offset_minutes {} is outside -1439..=1439",
                    self.utc_offset_minutes
                )
            })
    }
}

/// Defaults, then `config_path` if it exists, then environment variables.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    let text = |key: &str| -> Option<String> {
        match file_cfg.get(key)? {
            toml::Value::String(v) => Some(v.clone()),
            toml::Value::Integer(v) => Some(v.to_string()),
            _ => None,
        }
    };

    if let Some(v) = text("session_database_url") {
        settings.session_database_url = v;
    }
    if let Some(v) = text("login_latency_ms").and_then(|v| v.parse().ok()) {
        settings.login_latency_ms = v;
    }
    if let Some(v) = text("login_timeout_ms").and_then(|v| v.parse().ok()) {
        settings.login_timeout_ms = v;
    }
    if let Some(v) = text("utc_offset_minutes").and_then(|v| v.parse().ok()) {
        settings.utc_offset_minutes = v;
    }
    if let Some(v) = text("log_filter") {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CRM_SESSION_DB") {
        settings.session_database_url = v;
    }
    if let Some(v) = var("APP__SESSION_DATABASE_URL") {
        settings.session_database_url = v;
    }

    if let Some(v) = var("APP__LOGIN_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.login_latency_ms = parsed;
        }
    }
    if let Some(v) = var("APP__LOGIN_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.login_timeout_ms = parsed;
        }
    }
    if let Some(v) = var("APP__UTC_OFFSET_MINUTES") {
        if let Ok(parsed) = v.parse::<i32>() {
            settings.utc_offset_minutes = parsed;
        }
    }

    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// Normalises a configured session database into a `sqlite://` url.
///
/// The parent directory is created by `LocalStore::new` when it opens the url.
pub fn prepare_database_url(raw_database_url: &str) -> String {
    normalize_database_url(raw_database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().session_database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
