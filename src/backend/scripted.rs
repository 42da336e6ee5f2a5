//! In-process `AuthoringBackend` for workflow tests: each operation pops the
//! next queued result, and every request body is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::backend::client::AuthoringBackend;
use crate::backend::error::BackendError;
use crate::backend::wire::*;
use crate::formats::{Artifact, BookOutline, Enhancement};
use crate::research::model::MarketingAssets;
use crate::store::settings::AiProvider;

pub(crate) struct Script<T>(Mutex<VecDeque<Result<T, BackendError>>>);

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Script<T> {
    pub fn ok(&self, value: T) -> &Self {
        self.push(Ok(value))
    }

    pub fn err(&self, err: BackendError) -> &Self {
        self.push(Err(err))
    }

    fn push(&self, result: Result<T, BackendError>) -> &Self {
        if let Ok(mut queue) = self.0.lock() {
            queue.push_back(result);
        }
        self
    }

    fn next(&self, endpoint: &str) -> Result<T, BackendError> {
        self.0
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| Err(BackendError::malformed(endpoint, "nothing scripted")))
    }
}

pub(crate) fn server_error(endpoint: &str) -> BackendError {
    BackendError::Status {
        endpoint: endpoint.to_owned(),
        status: 500,
        message: "boom".to_owned(),
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    pub preview: Script<PromptPreview>,
    pub outline: Script<BookOutline>,
    pub chapter: Script<String>,
    pub enhance: Script<Vec<Enhancement>>,
    pub artifacts: Script<Vec<Artifact>>,
    pub template: Script<TemplateDraft>,
    pub models: Script<Vec<ModelInfo>>,
    pub avatar: Script<GeneratedAvatar>,
    pub diary: Script<String>,
    pub brand: Script<String>,
    pub landing: Script<String>,
    pub marketing: Script<MarketingAssets>,
    pub build: Script<BuildResponse>,
    pub download: Script<Vec<u8>>,
    requests: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl ScriptedBackend {
    fn record<T: Serialize + ?Sized>(&self, endpoint: &'static str, body: &T) {
        let value = serde_json::to_value(body).unwrap_or(serde_json::Value::Null);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((endpoint, value));
        }
    }

    /// Bodies sent to `endpoint`, oldest first.
    pub fn requests(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .map(|requests| {
                requests
                    .iter()
                    .filter(|(e, _)| *e == endpoint)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.requests(endpoint).len()
    }
}

#[async_trait]
impl AuthoringBackend for ScriptedBackend {
    async fn preview_prompt(&self, request: &OutlineRequest) -> Result<PromptPreview, BackendError> {
        self.record(PREVIEW_PROMPT, request);
        self.preview.next(PREVIEW_PROMPT)
    }

    async fn generate_outline(&self, request: &OutlineRequest) -> Result<BookOutline, BackendError> {
        self.record(GENERATE_OUTLINE, request);
        self.outline.next(GENERATE_OUTLINE)
    }

    async fn generate_chapter(&self, request: &ChapterRequest) -> Result<String, BackendError> {
        self.record(GENERATE_CHAPTER, request);
        self.chapter.next(GENERATE_CHAPTER)
    }

    async fn enhance_book(&self, request: &EnhanceRequest) -> Result<Vec<Enhancement>, BackendError> {
        self.record(ENHANCE_BOOK, request);
        self.enhance.next(ENHANCE_BOOK)
    }

    async fn generate_artifacts(
        &self,
        request: &ArtifactsRequest,
    ) -> Result<Vec<Artifact>, BackendError> {
        self.record(GENERATE_ARTIFACTS, request);
        self.artifacts.next(GENERATE_ARTIFACTS)
    }

    async fn generate_template(&self, request: &TemplateRequest) -> Result<TemplateDraft, BackendError> {
        self.record(GENERATE_TEMPLATE, request);
        self.template.next(GENERATE_TEMPLATE)
    }

    async fn list_models(&self, provider: AiProvider) -> Result<Vec<ModelInfo>, BackendError> {
        self.record(LIST_MODELS, provider.wire_name());
        self.models.next(LIST_MODELS)
    }

    async fn generate_avatar(&self, request: &AvatarRequest) -> Result<GeneratedAvatar, BackendError> {
        self.record(GENERATE_AVATAR, request);
        self.avatar.next(GENERATE_AVATAR)
    }

    async fn generate_diary_entry(&self, request: &DiaryRequest<'_>) -> Result<String, BackendError> {
        self.record(GENERATE_DIARY, request);
        self.diary.next(GENERATE_DIARY)
    }

    async fn generate_brand_identity(&self, request: &BrandRequest<'_>) -> Result<String, BackendError> {
        self.record(GENERATE_BRAND, request);
        self.brand.next(GENERATE_BRAND)
    }

    async fn generate_landing_page(
        &self,
        request: &LandingPageRequest<'_>,
    ) -> Result<String, BackendError> {
        self.record(GENERATE_LANDING_PAGE, request);
        self.landing.next(GENERATE_LANDING_PAGE)
    }

    async fn generate_marketing(
        &self,
        request: &MarketingRequest<'_>,
    ) -> Result<MarketingAssets, BackendError> {
        self.record(GENERATE_MARKETING, request);
        self.marketing.next(GENERATE_MARKETING)
    }

    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse, BackendError> {
        self.record(BUILD, request);
        self.build.next(BUILD)
    }

    async fn download_book(&self, build_dir: &str) -> Result<Vec<u8>, BackendError> {
        self.record(DOWNLOAD_BOOK, &DownloadRequest { build_dir });
        self.download.next(DOWNLOAD_BOOK)
    }
}
