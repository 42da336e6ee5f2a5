use anyhow::Context as _;

use crate::backend::wire::{OutlineRequest, PromptPreview};
use crate::backend::{AuthoringBackend, RetryPolicy};
use crate::catalog::book_types;
use crate::error::ValidationError;
use crate::formats::BookOutline;

pub const CUSTOM_TONE: &str = "custom";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToneSpec {
    Catalog(String),
    /// Free-text description sent in place of a catalog tone.
    Custom(String),
}

impl ToneSpec {
    /// `custom` selects the free-text description.
    pub fn from_parts(tone: &str, custom: Option<&str>) -> Self {
        if tone == CUSTOM_TONE {
            Self::Custom(custom.unwrap_or_default().to_owned())
        } else {
            Self::Catalog(tone.to_owned())
        }
    }

    pub fn wire_value(&self) -> &str {
        match self {
            Self::Catalog(value) => value,
            Self::Custom(text) => text.trim(),
        }
    }
}

/// Everything the planner collects before asking for an outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub topic: String,
    pub book_type: String,
    pub tone: ToneSpec,
    pub target_audience: String,
    pub num_chapters: Option<u32>,
    pub pages_per_chapter: Option<u32>,
    pub requirements: Option<String>,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        if book_types::book_type(&self.book_type).is_none() {
            return Err(ValidationError::UnknownCatalogValue {
                kind: "book type",
                value: self.book_type.clone(),
            });
        }
        match &self.tone {
            ToneSpec::Custom(text) if text.trim().is_empty() => {
                return Err(ValidationError::MissingCustomTone);
            }
            ToneSpec::Catalog(value) if book_types::tone(value).is_none() => {
                return Err(ValidationError::UnknownCatalogValue {
                    kind: "tone",
                    value: value.clone(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    pub fn to_wire(&self) -> OutlineRequest {
        OutlineRequest {
            topic: self.topic.trim().to_owned(),
            book_type: self.book_type.clone(),
            tone: self.tone.wire_value().to_owned(),
            target_audience: self.target_audience.clone(),
            num_chapters: self.num_chapters.filter(|n| *n > 0),
            pages_per_chapter: self.pages_per_chapter.filter(|n| *n > 0),
            requirements: self
                .requirements
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_owned),
            custom_system_prompt: None,
            custom_user_prompt: None,
            return_prompts: false,
        }
    }
}

pub async fn preview_prompt(
    backend: &dyn AuthoringBackend,
    request: &PlanRequest,
) -> anyhow::Result<PromptPreview> {
    request.validate()?;
    let preview = backend
        .preview_prompt(&request.to_wire())
        .await
        .context("preview outline prompt")?;
    Ok(preview)
}

/// Optional prompt overrides, e.g. after the user edited a previewed prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOverrides {
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
}

/// Requests an outline. A non-empty `feature_override` replaces the
/// features the model recommended.
pub async fn generate_outline(
    backend: &dyn AuthoringBackend,
    request: &PlanRequest,
    overrides: &PromptOverrides,
    feature_override: &[String],
    retry: RetryPolicy,
) -> anyhow::Result<BookOutline> {
    request.validate()?;

    let mut wire = request.to_wire();
    wire.custom_system_prompt = overrides.system_prompt.clone();
    wire.custom_user_prompt = overrides.user_prompt.clone();

    tracing::info!(
        topic = %wire.topic,
        book_type = %wire.book_type,
        num_chapters = ?wire.num_chapters,
        "generate outline"
    );
    let mut outline = retry
        .run("generate outline", || backend.generate_outline(&wire))
        .await
        .context("generate outline")?;

    if !feature_override.is_empty() {
        outline.recommended_features = feature_override.to_vec();
    }
    let meta = &mut outline.book;
    if meta.book_type.trim().is_empty() {
        meta.book_type = request.book_type.clone();
    }
    if meta.tone.trim().is_empty() {
        meta.tone = request.tone.wire_value().to_owned();
    }
    if meta.target_audience.trim().is_empty() {
        meta.target_audience = request.target_audience.clone();
    }
    if outline.chapters.is_empty() {
        anyhow::bail!("backend returned an outline without chapters");
    }
    Ok(outline)
}
