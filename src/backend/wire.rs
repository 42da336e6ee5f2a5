//! Request and response bodies for the authoring backend's JSON endpoints.
//!
//! Responses carry a `success` flag that the client checks before these types
//! are deserialized; the structs below only describe the payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formats::{
    Artifact, ArtifactKind, Book, BookOutline, Enhancement, LegalClauses, PublishingInfo, ToolInfo,
};
use crate::research::model::{Avatar, DiaryEntries, MarketingAssets};

pub const GENERATE_OUTLINE: &str = "/api/ai/generate-outline";
pub const PREVIEW_PROMPT: &str = "/api/ai/preview-prompt";
pub const GENERATE_CHAPTER: &str = "/api/ai/generate-chapter-content";
pub const ENHANCE_BOOK: &str = "/api/ai/enhance-book";
pub const GENERATE_ARTIFACTS: &str = "/api/ai/generate-artifacts";
pub const GENERATE_TEMPLATE: &str = "/api/ai/generate-template";
pub const LIST_MODELS: &str = "/api/ai/models";
pub const GENERATE_AVATAR: &str = "/api/ai/generate-single-avatar";
pub const GENERATE_DIARY: &str = "/api/ai/generate-avatar-diary";
pub const GENERATE_BRAND: &str = "/api/ai/generate-brand-identity";
pub const GENERATE_LANDING_PAGE: &str = "/api/ai/generate-landing-page-spec";
pub const GENERATE_MARKETING: &str = "/api/ai/generate-marketing-assets";
pub const BUILD: &str = "/api/build";
pub const DOWNLOAD_BOOK: &str = "/api/ai/download-book";

/// Inputs shared by prompt preview and outline generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlineRequest {
    pub topic: String,
    pub book_type: String,
    /// Catalog id, or the free-text description for a custom tone.
    pub tone: String,
    pub target_audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_chapters: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_per_chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_user_prompt: Option<String>,
    pub return_prompts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPreview {
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(default)]
    pub estimated_tokens: Option<u64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutlineResponse {
    /// JSON text, frequently inside a code fence.
    pub outline: OutlinePayload,
}

/// Some backends return the outline already decoded.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OutlinePayload {
    Text(String),
    Parsed(Box<BookOutline>),
}

/// Flat context for one chapter generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChapterRequest {
    pub book_title: String,
    pub book_description: String,
    pub book_type: String,
    pub tone: String,
    pub target_audience: String,
    pub chapter_number: u32,
    pub chapter_title: String,
    pub chapter_description: String,
    pub learning_objectives: Vec<String>,
    pub suggested_components: Vec<String>,
    pub estimated_words: u32,
    pub chapter_template: String,
    pub template_structure: Vec<String>,
    pub enabled_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_to_previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_to_next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterResponse {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterText {
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhanceRequest {
    pub book_title: String,
    pub book_description: String,
    pub chapters: Vec<ChapterText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnhanceResponse {
    #[serde(default)]
    pub enhancements: Vec<Enhancement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactsRequest {
    pub book_title: String,
    pub book_description: String,
    pub book_type: String,
    pub tone: String,
    pub target_audience: String,
    pub chapters: Vec<ChapterText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsResponse {
    #[serde(default)]
    pub artifacts: Vec<WireArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireArtifact {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub artifact_type_id: String,
    pub artifact_name: String,
    pub category: ArtifactKind,
    #[serde(default)]
    pub tool: Option<String>,
    pub chapter_number: u32,
    #[serde(default)]
    pub generated_prompt: Option<String>,
    #[serde(default)]
    pub placement_guidelines: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl WireArtifact {
    pub fn into_artifact(self) -> Artifact {
        Artifact {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| crate::formats::timestamp_id("artifact")),
            kind: self.category,
            category: self.artifact_type_id,
            chapter_number: self.chapter_number,
            title: self.artifact_name,
            description: self.description,
            prompt: self.generated_prompt,
            content: None,
            tool_info: self.tool.filter(|t| !t.is_empty()).map(|name| ToolInfo { name, url: None }),
            placement_guideline: self.placement_guidelines,
            created_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateResponse {
    pub template: TemplatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TemplatePayload {
    Text(String),
    Parsed(TemplateDraft),
}

/// Unvalidated chapter template proposed by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub structure: Vec<String>,
    #[serde(default)]
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Questionnaire answers keyed by question id.
pub type OfferContext = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarRequest {
    pub prompt: String,
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvatarResponse {
    pub avatar: Option<Avatar>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// A generated avatar plus any caveat the backend attached (e.g. partial data).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAvatar {
    pub avatar: Avatar,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryRequest<'a> {
    pub avatar_profile: &'a Avatar,
    pub diary_type: &'static str,
    pub offer_context: &'a OfferContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiaryResponse {
    pub diary_entry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandRequest<'a> {
    pub problem_aware_avatar: &'a Avatar,
    pub diary_entries: &'a DiaryEntries,
    pub offer_context: &'a OfferContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandResponse {
    pub brand_identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandingPageRequest<'a> {
    pub problem_aware_avatar: &'a Avatar,
    pub brand_identity: &'a str,
    pub diary_entries: &'a DiaryEntries,
    pub offer_context: &'a OfferContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LandingPageResponse {
    pub landing_page_spec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingRequest<'a> {
    pub problem_aware_avatar: &'a Avatar,
    pub brand_identity: &'a str,
    pub diary_entries: &'a DiaryEntries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page_spec: Option<&'a str>,
    pub offer_context: &'a OfferContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketingResponse {
    pub marketing_assets: MarketingAssets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildChapter {
    pub id: String,
    pub title: String,
    pub content: String,
    /// One-based.
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub chapters: Vec<BuildChapter>,
    #[serde(rename = "publishingInfo", skip_serializing_if = "Option::is_none")]
    pub publishing_info: Option<PublishingInfo>,
    #[serde(rename = "legalClauses", skip_serializing_if = "Option::is_none")]
    pub legal_clauses: Option<LegalClauses>,
}

impl BuildBook {
    pub fn from_book(book: &Book) -> Self {
        let mut chapters: Vec<&crate::formats::Chapter> = book.chapters.iter().collect();
        chapters.sort_by_key(|c| c.order);
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            chapters: chapters
                .into_iter()
                .enumerate()
                .map(|(idx, c)| BuildChapter {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    content: c.content.clone(),
                    order: idx + 1,
                })
                .collect(),
            publishing_info: book.publishing_info.clone(),
            legal_clauses: book.legal_clauses.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubTarget {
    pub github_username: String,
    pub github_token: String,
    pub repo_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildRequest {
    pub book: BuildBook,
    pub features: Vec<String>,
    #[serde(flatten)]
    pub github: Option<GithubTarget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub build_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest<'a> {
    pub build_dir: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Chapter;

    #[test]
    fn build_payload_orders_chapters_from_one() -> anyhow::Result<()> {
        let mut book = Book::new("T", "A");
        for (order, id) in [(1, "b"), (0, "a")] {
            book.chapters.push(Chapter {
                id: id.to_owned(),
                title: id.to_uppercase(),
                order,
                ..Chapter::default()
            });
        }
        let request = BuildRequest {
            book: BuildBook::from_book(&book),
            features: vec!["admonitions".to_owned()],
            github: None,
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["book"]["chapters"][0]["id"], "a");
        assert_eq!(value["book"]["chapters"][0]["order"], 1);
        assert_eq!(value["book"]["chapters"][1]["order"], 2);
        assert!(value.get("github_username").is_none());
        assert!(value["book"].get("publishingInfo").is_none());
        Ok(())
    }

    #[test]
    fn publishing_settings_use_camel_case_keys() -> anyhow::Result<()> {
        let mut book = Book::new("T", "Ada");
        book.publishing_info = Some(PublishingInfo::defaults_for("Ada"));
        book.legal_clauses = Some(LegalClauses::default());

        let value = serde_json::to_value(BuildBook::from_book(&book))?;
        let info = &value["publishingInfo"];
        assert_eq!(info["showAuthorName"], true);
        assert_eq!(info["penName"], "Ada");
        assert!(info.get("yearOfPublication").is_some());
        assert!(info.get("pen_name").is_none());
        assert_eq!(value["legalClauses"]["allRightsReserved"], true);
        assert_eq!(value["legalClauses"]["moralRights"], true);
        Ok(())
    }

    #[test]
    fn github_credentials_sit_beside_book() -> anyhow::Result<()> {
        let request = BuildRequest {
            book: BuildBook::from_book(&Book::new("T", "A")),
            features: Vec::new(),
            github: Some(GithubTarget {
                github_username: "octo".to_owned(),
                github_token: "ghp_x".to_owned(),
                repo_name: "book".to_owned(),
            }),
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(value["github_username"], "octo");
        assert_eq!(value["repo_name"], "book");
        Ok(())
    }

    #[test]
    fn wire_artifact_maps_onto_store_shape() -> anyhow::Result<()> {
        let wire: WireArtifact = serde_json::from_value(serde_json::json!({
            "id": "ch1_hero_image_0",
            "artifact_type_id": "hero_image",
            "artifact_name": "Hero Image",
            "category": "image",
            "tool": "Midjourney",
            "chapter_number": 1,
            "chapter_title": "Intro",
            "generated_prompt": "A lighthouse at dusk",
            "placement_guidelines": "Top of chapter",
            "file_extension": ".png",
            "description": "Opening visual"
        }))?;
        let artifact = wire.into_artifact();
        assert_eq!(artifact.id, "ch1_hero_image_0");
        assert_eq!(artifact.kind, ArtifactKind::Image);
        assert_eq!(artifact.category, "hero_image");
        assert_eq!(artifact.title, "Hero Image");
        assert_eq!(artifact.prompt.as_deref(), Some("A lighthouse at dusk"));
        assert_eq!(artifact.tool_info.map(|t| t.name).as_deref(), Some("Midjourney"));
        Ok(())
    }

    #[test]
    fn outline_request_omits_unset_hints() -> anyhow::Result<()> {
        let value = serde_json::to_value(OutlineRequest {
            topic: "Rust".to_owned(),
            ..OutlineRequest::default()
        })?;
        assert!(value.get("num_chapters").is_none());
        assert_eq!(value["return_prompts"], false);
        Ok(())
    }
}
