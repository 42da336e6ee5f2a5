//! One module per command group. Handlers open the stores they need from the
//! data directory, call into the library and print results to stdout.

use std::time::Duration;

use anyhow::Context as _;

use crate::backend::{HttpBackend, RetryPolicy};
use crate::cli::{Command, GlobalArgs};
use crate::config::AppConfig;
use crate::store::{BookStore, CustomTemplates, PromptLibrary, ResearchStore, SettingsStore};

pub mod artifacts;
pub mod book;
pub mod catalog;
pub mod chapter;
pub mod outline;
pub mod plan;
pub mod prompts;
pub mod publish;
pub mod research;
pub mod settings;
pub mod template;

/// Per-invocation context shared by every handler.
#[derive(Debug)]
pub struct Workspace {
    pub config: AppConfig,
    backend_url: Option<String>,
    retries: Option<u32>,
    retry_delay: Duration,
}

impl Workspace {
    pub fn new(global: GlobalArgs) -> anyhow::Result<Self> {
        let config = AppConfig::from_env(global.data_dir).context("load configuration")?;
        tracing::debug!(data_dir = %config.data_dir.display(), "workspace");
        Ok(Self {
            config,
            backend_url: global.backend_url,
            retries: global.retries,
            retry_delay: Duration::from_millis(global.retry_delay_ms),
        })
    }

    pub fn settings(&self) -> anyhow::Result<SettingsStore> {
        let path = self.config.settings_path();
        SettingsStore::open(&path).with_context(|| format!("open {}", path.display()))
    }

    pub fn books(&self) -> anyhow::Result<BookStore> {
        let path = self.config.book_store_path();
        BookStore::open(&path).with_context(|| format!("open {}", path.display()))
    }

    pub fn templates(&self) -> anyhow::Result<CustomTemplates> {
        let path = self.config.templates_path();
        CustomTemplates::open(&path).with_context(|| format!("open {}", path.display()))
    }

    pub fn prompts(&self) -> anyhow::Result<PromptLibrary> {
        let path = self.config.prompts_path();
        PromptLibrary::open(&path).with_context(|| format!("open {}", path.display()))
    }

    pub fn research(&self) -> anyhow::Result<ResearchStore> {
        let path = self.config.research_path();
        ResearchStore::open(&path).with_context(|| format!("open {}", path.display()))
    }

    /// Client for the URL resolved from flag, settings and environment.
    pub fn backend(&self) -> anyhow::Result<HttpBackend> {
        let settings = self.settings()?;
        let url = self
            .config
            .backend_url(settings.settings(), self.backend_url.as_deref())?;
        tracing::debug!(%url, "backend");
        HttpBackend::new(&url, self.config.http_timeout)
    }

    /// Generation calls only retry when `--retries` asks for it.
    pub fn retry(&self) -> RetryPolicy {
        match self.retries {
            Some(n) => RetryPolicy::fixed(n, self.retry_delay),
            None => RetryPolicy::none(),
        }
    }

    pub fn avatar_retry(&self) -> RetryPolicy {
        let default = RetryPolicy::avatar();
        RetryPolicy::fixed(
            self.retries.unwrap_or(default.max_retries),
            self.retry_delay,
        )
        .retrying_all()
    }
}

pub async fn dispatch(ws: &Workspace, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Settings { command } => settings::run(ws, command).await.context("settings"),
        Command::Catalog { command } => catalog::run(command).context("catalog"),
        Command::Plan { command } => plan::run(ws, command).await.context("plan"),
        Command::Outline { command } => outline::run(ws, command).context("outline"),
        Command::Template { command } => template::run(ws, command).await.context("template"),
        Command::Prompts { command } => prompts::run(ws, command).context("prompts"),
        Command::Chapter { command } => chapter::run(ws, command).await.context("chapter"),
        Command::Book { command } => book::run(ws, command).context("book"),
        Command::Publish { command } => publish::run(ws, command).await.context("publish"),
        Command::Research { command } => research::run(ws, command).await.context("research"),
        Command::Artifacts { command } => artifacts::run(ws, command).await.context("artifacts"),
    }
}

/// Splits comma-separated values and drops blanks.
pub(crate) fn split_ids(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(retries: Option<u32>) -> Workspace {
        Workspace {
            config: AppConfig {
                data_dir: "/tmp/unused".into(),
                default_backend_url: "http://localhost:8000".to_owned(),
                http_timeout: Duration::from_secs(1),
            },
            backend_url: None,
            retries,
            retry_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn generation_does_not_retry_by_default() {
        assert_eq!(workspace(None).retry().attempts(), 1);
        assert_eq!(workspace(Some(3)).retry().attempts(), 4);
    }

    #[test]
    fn avatar_keeps_two_retries_unless_overridden() {
        let policy = workspace(None).avatar_retry();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.delay, Duration::from_millis(5));
        assert!(policy.retry_all);
        assert!(!workspace(Some(2)).retry().retry_all);
        assert_eq!(workspace(Some(0)).avatar_retry().attempts(), 1);
    }

    #[test]
    fn split_ids_accepts_commas_and_repeats() {
        let ids = split_ids(&["a, b".to_owned(), "".to_owned(), "c".to_owned()]);
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
