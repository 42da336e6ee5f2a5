use anyhow::Context as _;

use crate::backend::AuthoringBackend as _;
use crate::catalog::features::{FeatureSelection, Preset};
use crate::cli::{FeatureChoiceArgs, SettingsCommand};
use crate::commands::{Workspace, split_ids};
use crate::config;
use crate::error::ValidationError;
use crate::store::settings::AiProvider;

pub async fn run(ws: &Workspace, command: SettingsCommand) -> anyhow::Result<()> {
    let mut store = ws.settings()?;
    match command {
        SettingsCommand::Show => {
            let settings = store.settings();
            println!("provider: {}", settings.selected_provider.as_str());
            println!("model: {}", settings.selected_model);
            for provider in AiProvider::ALL {
                println!("key {}: {}", provider.as_str(), settings.masked_key(provider));
            }
            match &settings.backend_url {
                Some(url) => println!("backend url: {url}"),
                None => println!("backend url: {} (default)", ws.config.default_backend_url),
            }
            if settings.default_features.is_empty() {
                println!("default features: (outline recommendations)");
            } else {
                println!("default features: {}", settings.default_features.join(", "));
            }
        }
        SettingsCommand::SetKey { provider, key } => {
            store.set_api_key(provider, key.trim())?;
            println!("saved {} key", provider.as_str());
        }
        SettingsCommand::SetProvider { provider } => {
            store.set_provider(provider)?;
            println!("provider: {}", provider.as_str());
        }
        SettingsCommand::SetModel { model } => {
            let model = model.trim();
            if model.is_empty() {
                anyhow::bail!("model must not be empty");
            }
            store.set_model(model)?;
            println!("model: {model}");
        }
        SettingsCommand::SetBackendUrl { url, clear } => {
            if clear {
                store.set_backend_url(None)?;
                println!("backend url: {} (default)", ws.config.default_backend_url);
            } else if let Some(url) = url {
                config::validate_url(&url)?;
                store.set_backend_url(Some(url.trim()))?;
                println!("backend url: {}", url.trim());
            } else {
                anyhow::bail!("pass a URL or --clear");
            }
        }
        SettingsCommand::SetDefaultFeatures(args) => {
            let ids = feature_choice(&args)?;
            println!("default features: {}", ids.len());
            store.set_default_features(ids)?;
        }
        SettingsCommand::Models { provider } => {
            let provider = provider.unwrap_or(store.settings().selected_provider);
            let backend = ws.backend()?;
            let models = backend
                .list_models(provider)
                .await
                .with_context(|| format!("list {} models", provider.as_str()))?;
            for model in models {
                let selected = if model.id == store.settings().selected_model {
                    "*"
                } else {
                    " "
                };
                match model.context_length {
                    Some(ctx) => println!("{selected} {}\t{}\t{ctx} tokens", model.id, model.name),
                    None => println!("{selected} {}\t{}", model.id, model.name),
                }
            }
        }
    }
    Ok(())
}

/// Preset first, then explicit ids switched on. Empty when neither is given.
pub(crate) fn feature_choice(args: &FeatureChoiceArgs) -> anyhow::Result<Vec<String>> {
    let mut selection = FeatureSelection::default();
    if let Some(name) = &args.preset {
        selection.apply_preset(parse_preset(name)?);
    }
    for id in split_ids(&args.features) {
        selection.set(&id, true)?;
    }
    Ok(selection.ids())
}

pub(crate) fn parse_preset(name: &str) -> Result<Preset, ValidationError> {
    Preset::parse(name).ok_or_else(|| ValidationError::UnknownCatalogValue {
        kind: "preset",
        value: name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_and_extra_ids_combine() -> anyhow::Result<()> {
        let ids = feature_choice(&FeatureChoiceArgs {
            features: vec!["quizzes".to_owned()],
            preset: Some("minimal".to_owned()),
        })?;
        assert!(ids.contains(&"quizzes".to_owned()));
        assert!(ids.len() > 1);
        Ok(())
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let err = feature_choice(&FeatureChoiceArgs {
            features: vec!["teleport".to_owned()],
            preset: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(parse_preset("everything").is_err());
        assert_eq!(parse_preset("complete"), Ok(Preset::Complete));
    }
}
