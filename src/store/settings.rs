use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::persist;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    Openai,
    Claude,
    Openrouter,
}

impl AiProvider {
    pub const ALL: [AiProvider; 3] = [Self::Openai, Self::Claude, Self::Openrouter];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Claude => "claude",
            Self::Openrouter => "openrouter",
        }
    }

    /// Name the backend's model listing expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Claude => "anthropic",
            other => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_keys: BTreeMap<AiProvider, String>,
    pub selected_provider: AiProvider,
    pub selected_model: String,
    /// Unset means the environment default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub default_features: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: BTreeMap::new(),
            selected_provider: AiProvider::Claude,
            selected_model: DEFAULT_MODEL.to_owned(),
            backend_url: None,
            default_features: Vec::new(),
        }
    }
}

impl Settings {
    pub fn api_key(&self, provider: AiProvider) -> Option<&str> {
        self.api_keys
            .get(&provider)
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    pub fn masked_key(&self, provider: AiProvider) -> String {
        match self.api_key(provider) {
            Some(key) if key.chars().count() > 8 => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}...{tail}")
            }
            Some(_) => "****".to_owned(),
            None => "(not set)".to_owned(),
        }
    }
}

/// Process-wide configuration with its own lifecycle, independent of the book.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: Settings,
}

impl SettingsStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            settings: Settings::default(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let settings = persist::read_json(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_api_key(&mut self, provider: AiProvider, key: &str) -> anyhow::Result<()> {
        self.settings.api_keys.insert(provider, key.to_owned());
        self.persist()
    }

    pub fn set_provider(&mut self, provider: AiProvider) -> anyhow::Result<()> {
        self.settings.selected_provider = provider;
        self.persist()
    }

    pub fn set_model(&mut self, model: &str) -> anyhow::Result<()> {
        self.settings.selected_model = model.to_owned();
        self.persist()
    }

    pub fn set_backend_url(&mut self, url: Option<&str>) -> anyhow::Result<()> {
        self.settings.backend_url = url.map(str::to_owned);
        self.persist()
    }

    pub fn set_default_features(&mut self, features: Vec<String>) -> anyhow::Result<()> {
        self.settings.default_features = features;
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => persist::write_json_atomic(path, &self.settings),
            None => Ok(()),
        }
    }
}
