use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::BodyEncoding;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "forum_client.toml";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub login_path: String,
    pub body_encoding: BodyEncoding,
    pub request_timeout_secs: u64,
    pub session_token: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            login_path: "/login".into(),
            body_encoding: BodyEncoding::Json,
            request_timeout_secs: 10,
            session_token: None,
        }
    }
}

impl ClientSettings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        Url::parse(self.base_url.trim())
            .with_context(|| format!("invalid base url '{}'", self.base_url))
    }

    pub fn login_url(&self) -> anyhow::Result<Url> {
        let base = self.base_url()?;
        base.join(&self.login_path)
            .with_context(|| format!("invalid login path '{}'", self.login_path))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    login_path: Option<String>,
    body_encoding: Option<String>,
    request_timeout_secs: Option<u64>,
    session_token: Option<String>,
}

pub fn load_settings() -> ClientSettings {
    let mut settings = load_settings_from(Path::new(DEFAULT_SETTINGS_FILE));
    apply_env_overrides(&mut settings);
    settings
}

/// Defaults overlaid with whatever the file provides. A missing or
/// unreadable file leaves the defaults in place.
pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    let Ok(raw) = fs::read_to_string(path) else {
        return settings;
    };
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "ignoring unparsable settings file");
        }
    }

    settings
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.login_path {
        settings.login_path = v;
    }
    if let Some(v) = file_cfg.body_encoding {
        match v.parse() {
            Ok(encoding) => settings.body_encoding = encoding,
            Err(error) => tracing::warn!(%error, "ignoring body_encoding from settings file"),
        }
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.session_token {
        settings.session_token = Some(v);
    }
}

fn apply_env_overrides(settings: &mut ClientSettings) {
    if let Ok(v) = std::env::var("FORUM_BASE_URL") {
        settings.base_url = v;
    }
    if let Ok(v) = std::env::var("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Ok(v) = std::env::var("APP__LOGIN_PATH") {
        settings.login_path = v;
    }

    if let Ok(v) = std::env::var("APP__BODY_ENCODING") {
        if let Ok(parsed) = v.parse() {
            settings.body_encoding = parsed;
        }
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Ok(v) = std::env::var("FORUM_SESSION_TOKEN") {
        settings.session_token = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
