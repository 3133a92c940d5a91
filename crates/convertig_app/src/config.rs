//! RON configuration file plus environment overrides.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use convertig_engine::{
    EngineConfig, FetchSettings, ProviderKeys, DEFAULT_CONVERSION_DEADLINE, DEFAULT_DRIVE_API_URL,
    DEFAULT_SERVICE_URL,
};
use convertig_logging::cv_info;
use serde::{Deserialize, Serialize};
use url::Url;

pub const ENV_API_URL: &str = "CONVERTIG_API_URL";
pub const ENV_GOOGLE_CLIENT_ID: &str = "CONVERTIG_GOOGLE_CLIENT_ID";
pub const ENV_GOOGLE_API_KEY: &str = "CONVERTIG_GOOGLE_API_KEY";
pub const ENV_DROPBOX_APP_KEY: &str = "CONVERTIG_DROPBOX_APP_KEY";

/// Every field is optional; missing ones take the engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub drive_api_url: Option<String>,
    pub google_client_id: Option<String>,
    pub google_api_key: Option<String>,
    pub dropbox_app_key: Option<String>,
    pub conversion_deadline_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_bytes: Option<u64>,
    pub vault_dir: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Overlay values from `lookup`, normally [`std::env::var`].
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(value) = read(ENV_API_URL) {
            self.api_url = Some(value);
        }
        if let Some(value) = read(ENV_GOOGLE_CLIENT_ID) {
            self.google_client_id = Some(value);
        }
        if let Some(value) = read(ENV_GOOGLE_API_KEY) {
            self.google_api_key = Some(value);
        }
        if let Some(value) = read(ENV_DROPBOX_APP_KEY) {
            self.dropbox_app_key = Some(value);
        }
    }

    pub fn from_env_and_file(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Resolve into an engine config; `save_dir` from the command line wins.
    pub fn engine_config(&self, save_dir: Option<PathBuf>) -> Result<EngineConfig> {
        let service_url = parse_url(self.api_url.as_deref().unwrap_or(DEFAULT_SERVICE_URL))?;
        let drive_api_url =
            parse_url(self.drive_api_url.as_deref().unwrap_or(DEFAULT_DRIVE_API_URL))?;
        let save_dir = save_dir
            .or_else(|| self.save_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let defaults = FetchSettings::default();
        let fetch = FetchSettings {
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            request_timeout: self
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            max_bytes: self.max_bytes.unwrap_or(defaults.max_bytes),
        };

        let mut config = EngineConfig::new(service_url, drive_api_url, save_dir).with_deadline(
            self.conversion_deadline_ms
                .map_or(DEFAULT_CONVERSION_DEADLINE, Duration::from_millis),
        );
        config.fetch = fetch;
        config.vault_dir = self.vault_dir.clone();
        config.providers = ProviderKeys {
            google_client_id: self.google_client_id.clone(),
            google_api_key: self.google_api_key.clone(),
            dropbox_app_key: self.dropbox_app_key.clone(),
        };
        cv_info!(
            "conversion service {} (deadline {:?})",
            config.service_url,
            config.conversion_deadline
        );
        Ok(config)
    }
}

fn parse_url(text: &str) -> Result<Url> {
    Url::parse(text).with_context(|| format!("invalid url {text:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn missing_file_argument_gives_defaults() {
        let config = AppConfig::load(None).unwrap();
        let engine = config.engine_config(None).unwrap();
        assert_eq!(engine.service_url.as_str(), "https://convertorbackend.onrender.com/");
        assert_eq!(engine.conversion_deadline, Duration::from_millis(120_000));
        assert_eq!(engine.save_dir, PathBuf::from("."));
    }

    #[test]
    fn partial_ron_file_is_accepted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("convertig.ron");
        fs::write(
            &path,
            r#"(api_url: Some("http://localhost:5000"), conversion_deadline_ms: Some(5000))"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:5000"));
        let engine = config.engine_config(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(engine.conversion_deadline, Duration::from_secs(5));
        assert_eq!(engine.save_dir, dir.path());
        assert!(engine.providers.google_api_key.is_none());
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut config = AppConfig {
            api_url: Some("http://file.example".into()),
            dropbox_app_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://env.example"),
            (ENV_GOOGLE_API_KEY, "g-key"),
            (ENV_DROPBOX_APP_KEY, " "),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|name| env.get(name).map(|value| value.to_string()));

        assert_eq!(config.api_url.as_deref(), Some("http://env.example"));
        assert_eq!(config.google_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.dropbox_app_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn invalid_urls_are_reported() {
        let config = AppConfig {
            api_url: Some("not a url".into()),
            ..AppConfig::default()
        };
        let err = config.engine_config(None).unwrap_err();
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn malformed_files_name_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(api_url: ").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }
}
