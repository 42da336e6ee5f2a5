use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::store::settings::Settings;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_DATA_DIR: &str = ".liquidbooks";

pub const BOOK_STORE_FILE: &str = "book-store.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const OUTLINE_FILE: &str = "outline.yaml";
pub const TEMPLATES_FILE: &str = "templates.json";
pub const PROMPTS_FILE: &str = "prompts.json";
pub const RESEARCH_FILE: &str = "research.json";

/// Environment-level configuration, resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Used when the settings carry no backend URL of their own.
    pub default_backend_url: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(data_dir: Option<PathBuf>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = data_dir
            .or_else(|| lookup("LIQUIDBOOKS_HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let default_backend_url =
            lookup("LIQUIDBOOKS_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        validate_url(&default_backend_url).context("LIQUIDBOOKS_BACKEND_URL")?;

        let http_timeout = match lookup("LIQUIDBOOKS_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("LIQUIDBOOKS_HTTP_TIMEOUT_SECS: not a number: {raw}"))?;
                if secs == 0 {
                    anyhow::bail!("LIQUIDBOOKS_HTTP_TIMEOUT_SECS must be > 0");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            data_dir,
            default_backend_url,
            http_timeout,
        })
    }

    /// Flag, then settings, then environment default.
    pub fn backend_url(&self, settings: &Settings, flag: Option<&str>) -> anyhow::Result<String> {
        let url = flag
            .or(settings.backend_url.as_deref())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.default_backend_url);
        validate_url(url)?;
        Ok(url.trim().to_owned())
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn book_store_path(&self) -> PathBuf {
        self.path(BOOK_STORE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.path(SETTINGS_FILE)
    }

    pub fn outline_path(&self) -> PathBuf {
        self.path(OUTLINE_FILE)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.path(TEMPLATES_FILE)
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.path(PROMPTS_FILE)
    }

    pub fn research_path(&self) -> PathBuf {
        self.path(RESEARCH_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

pub fn validate_url(raw: &str) -> anyhow::Result<()> {
    let url = url::Url::parse(raw.trim()).with_context(|| format!("invalid backend url: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("backend url must be http or https (got {other}): {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() -> anyhow::Result<()> {
        let config = AppConfig::from_lookup(None, env(&[]))?;
        assert_eq!(config.data_dir, PathBuf::from(".liquidbooks"));
        assert_eq!(config.default_backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(600));
        Ok(())
    }

    #[test]
    fn flag_beats_environment_for_data_dir() -> anyhow::Result<()> {
        let config = AppConfig::from_lookup(
            Some(PathBuf::from("/tmp/flag")),
            env(&[("LIQUIDBOOKS_HOME", "/tmp/env")]),
        )?;
        assert_eq!(config.book_store_path(), PathBuf::from("/tmp/flag/book-store.json"));
        Ok(())
    }

    #[test]
    fn backend_url_precedence() -> anyhow::Result<()> {
        let config = AppConfig::from_lookup(
            None,
            env(&[("LIQUIDBOOKS_BACKEND_URL", "http://env:9000")]),
        )?;
        let mut settings = Settings::default();
        assert_eq!(config.backend_url(&settings, None)?, "http://env:9000");

        settings.backend_url = Some("https://saved.example".to_owned());
        assert_eq!(config.backend_url(&settings, None)?, "https://saved.example");
        assert_eq!(
            config.backend_url(&settings, Some("http://flag:1"))?,
            "http://flag:1"
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_timeout_and_url() {
        assert!(AppConfig::from_lookup(None, env(&[("LIQUIDBOOKS_HTTP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(None, env(&[("LIQUIDBOOKS_HTTP_TIMEOUT_SECS", "0")])).is_err());
        assert!(AppConfig::from_lookup(None, env(&[("LIQUIDBOOKS_BACKEND_URL", "ftp://x")])).is_err());
    }
}
