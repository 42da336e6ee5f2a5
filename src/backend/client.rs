use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;
use crate::backend::fence::parse_fenced_json;
use crate::backend::wire::{self, *};
use crate::formats::{Artifact, BookOutline, Enhancement};
use crate::research::model::MarketingAssets;
use crate::store::settings::AiProvider;

/// Every remote operation the authoring flows depend on.
///
/// Workflows take `&dyn AuthoringBackend` so tests can substitute a scripted
/// implementation without a socket.
#[async_trait]
pub trait AuthoringBackend: Send + Sync {
    async fn preview_prompt(&self, request: &OutlineRequest) -> Result<PromptPreview, BackendError>;
    async fn generate_outline(&self, request: &OutlineRequest) -> Result<BookOutline, BackendError>;
    async fn generate_chapter(&self, request: &ChapterRequest) -> Result<String, BackendError>;
    async fn enhance_book(&self, request: &EnhanceRequest) -> Result<Vec<Enhancement>, BackendError>;
    async fn generate_artifacts(
        &self,
        request: &ArtifactsRequest,
    ) -> Result<Vec<Artifact>, BackendError>;
    async fn generate_template(&self, request: &TemplateRequest) -> Result<TemplateDraft, BackendError>;
    async fn list_models(&self, provider: AiProvider) -> Result<Vec<ModelInfo>, BackendError>;
    async fn generate_avatar(&self, request: &AvatarRequest) -> Result<GeneratedAvatar, BackendError>;
    async fn generate_diary_entry(&self, request: &DiaryRequest<'_>) -> Result<String, BackendError>;
    async fn generate_brand_identity(&self, request: &BrandRequest<'_>) -> Result<String, BackendError>;
    async fn generate_landing_page(
        &self,
        request: &LandingPageRequest<'_>,
    ) -> Result<String, BackendError>;
    async fn generate_marketing(
        &self,
        request: &MarketingRequest<'_>,
    ) -> Result<MarketingAssets, BackendError>;
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse, BackendError>;
    async fn download_book(&self, build_dir: &str) -> Result<Vec<u8>, BackendError>;
}

/// `AuthoringBackend` over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build backend http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let started = Instant::now();
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        let value = read_envelope(path, response, started).await?;
        serde_json::from_value(value).map_err(|err| BackendError::malformed(path, err.to_string()))
    }
}

fn transport(path: &str, source: reqwest::Error) -> BackendError {
    BackendError::Transport {
        endpoint: path.to_owned(),
        source,
    }
}

async fn read_envelope(
    path: &str,
    response: reqwest::Response,
    started: Instant,
) -> Result<serde_json::Value, BackendError> {
    let status = response.status();
    let raw = response.text().await.map_err(|source| transport(path, source))?;
    tracing::info!(
        endpoint = path,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "backend responded"
    );

    if !status.is_success() {
        return Err(status_error(path, status, &raw));
    }

    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| BackendError::malformed(path, format!("response is not JSON: {err}")))?;
    if value.get("success").and_then(|v| v.as_bool()) == Some(false) {
        return Err(BackendError::rejected(path, error_message(&value)));
    }
    Ok(value)
}

fn status_error(path: &str, status: reqwest::StatusCode, raw: &str) -> BackendError {
    let message = serde_json::from_str(raw)
        .ok()
        .and_then(|v| error_message(&v))
        .unwrap_or_else(|| fallback_message(raw, status));
    BackendError::Status {
        endpoint: path.to_owned(),
        status: status.as_u16(),
        message,
    }
}

fn fallback_message(raw: &str, status: reqwest::StatusCode) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_owned()
    } else {
        raw.chars().take(500).collect()
    }
}

/// Error text from a backend body: `detail`, then `message`, then `error`.
///
/// Request validation failures carry `detail` as a list of `{msg}` objects.
pub(crate) fn error_message(value: &serde_json::Value) -> Option<String> {
    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                return Some(text.clone());
            }
            Some(serde_json::Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }
    None
}

#[async_trait]
impl AuthoringBackend for HttpBackend {
    async fn preview_prompt(&self, request: &OutlineRequest) -> Result<PromptPreview, BackendError> {
        #[derive(Serialize)]
        struct PreviewBody<'a> {
            topic: &'a str,
            book_type: &'a str,
            tone: &'a str,
            target_audience: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            num_chapters: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            requirements: Option<&'a str>,
        }
        let body = PreviewBody {
            topic: &request.topic,
            book_type: &request.book_type,
            tone: &request.tone,
            target_audience: &request.target_audience,
            num_chapters: request.num_chapters,
            requirements: request.requirements.as_deref(),
        };
        self.post(wire::PREVIEW_PROMPT, &body).await
    }

    async fn generate_outline(&self, request: &OutlineRequest) -> Result<BookOutline, BackendError> {
        let response: OutlineResponse = self.post(wire::GENERATE_OUTLINE, request).await?;
        match response.outline {
            OutlinePayload::Text(text) => parse_fenced_json(wire::GENERATE_OUTLINE, &text),
            OutlinePayload::Parsed(outline) => Ok(*outline),
        }
    }

    async fn generate_chapter(&self, request: &ChapterRequest) -> Result<String, BackendError> {
        let response: ChapterResponse = self.post(wire::GENERATE_CHAPTER, request).await?;
        if response.content.trim().is_empty() {
            return Err(BackendError::malformed(wire::GENERATE_CHAPTER, "empty chapter content"));
        }
        Ok(response.content)
    }

    async fn enhance_book(&self, request: &EnhanceRequest) -> Result<Vec<Enhancement>, BackendError> {
        let response: EnhanceResponse = self.post(wire::ENHANCE_BOOK, request).await?;
        Ok(response.enhancements)
    }

    async fn generate_artifacts(
        &self,
        request: &ArtifactsRequest,
    ) -> Result<Vec<Artifact>, BackendError> {
        let response: ArtifactsResponse = self.post(wire::GENERATE_ARTIFACTS, request).await?;
        Ok(response
            .artifacts
            .into_iter()
            .map(WireArtifact::into_artifact)
            .collect())
    }

    async fn generate_template(&self, request: &TemplateRequest) -> Result<TemplateDraft, BackendError> {
        let response: TemplateResponse = self.post(wire::GENERATE_TEMPLATE, request).await?;
        match response.template {
            TemplatePayload::Text(text) => parse_fenced_json(wire::GENERATE_TEMPLATE, &text),
            TemplatePayload::Parsed(draft) => Ok(draft),
        }
    }

    async fn list_models(&self, provider: AiProvider) -> Result<Vec<ModelInfo>, BackendError> {
        let started = Instant::now();
        let response = self
            .client
            .get(self.endpoint(wire::LIST_MODELS))
            .query(&[("provider", provider.wire_name())])
            .send()
            .await
            .map_err(|source| transport(wire::LIST_MODELS, source))?;
        let value = read_envelope(wire::LIST_MODELS, response, started).await?;
        let response: ModelsResponse = serde_json::from_value(value)
            .map_err(|err| BackendError::malformed(wire::LIST_MODELS, err.to_string()))?;
        Ok(response.models)
    }

    async fn generate_avatar(&self, request: &AvatarRequest) -> Result<GeneratedAvatar, BackendError> {
        let response: AvatarResponse = self.post(wire::GENERATE_AVATAR, request).await?;
        let Some(avatar) = response.avatar else {
            return Err(BackendError::malformed(wire::GENERATE_AVATAR, "missing `avatar`"));
        };
        if let Some(warning) = &response.warning {
            tracing::warn!(%warning, "avatar generated with a warning");
        }
        Ok(GeneratedAvatar {
            avatar,
            warning: response.warning,
        })
    }

    async fn generate_diary_entry(&self, request: &DiaryRequest<'_>) -> Result<String, BackendError> {
        let response: DiaryResponse = self.post(wire::GENERATE_DIARY, request).await?;
        Ok(response.diary_entry)
    }

    async fn generate_brand_identity(&self, request: &BrandRequest<'_>) -> Result<String, BackendError> {
        let response: BrandResponse = self.post(wire::GENERATE_BRAND, request).await?;
        Ok(response.brand_identity)
    }

    async fn generate_landing_page(
        &self,
        request: &LandingPageRequest<'_>,
    ) -> Result<String, BackendError> {
        let response: LandingPageResponse = self.post(wire::GENERATE_LANDING_PAGE, request).await?;
        Ok(response.landing_page_spec)
    }

    async fn generate_marketing(
        &self,
        request: &MarketingRequest<'_>,
    ) -> Result<MarketingAssets, BackendError> {
        let response: MarketingResponse = self.post(wire::GENERATE_MARKETING, request).await?;
        Ok(response.marketing_assets)
    }

    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse, BackendError> {
        self.post(wire::BUILD, request).await
    }

    async fn download_book(&self, build_dir: &str) -> Result<Vec<u8>, BackendError> {
        let started = Instant::now();
        let path = wire::DOWNLOAD_BOOK;
        let response = self
            .client
            .post(self.endpoint(path))
            .json(&DownloadRequest { build_dir })
            .send()
            .await
            .map_err(|source| transport(path, source))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.map_err(|source| transport(path, source))?;
            tracing::info!(endpoint = path, status = status.as_u16(), "backend responded");
            return Err(status_error(path, status, &raw));
        }

        let bytes = response.bytes().await.map_err(|source| transport(path, source))?;
        tracing::info!(
            endpoint = path,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );
        if !bytes.starts_with(b"PK") {
            return Err(BackendError::malformed(path, "response is not a zip archive"));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_detail() {
        let value = serde_json::json!({
            "detail": "Build failed: jupyter-book missing",
            "message": "ignored",
            "error": "ignored"
        });
        assert_eq!(
            error_message(&value).as_deref(),
            Some("Build failed: jupyter-book missing")
        );
    }

    #[test]
    fn error_message_falls_through_to_error() {
        let value = serde_json::json!({"success": false, "error": "rate limited"});
        assert_eq!(error_message(&value).as_deref(), Some("rate limited"));
        assert_eq!(error_message(&serde_json::json!({"success": false})), None);
    }

    #[test]
    fn error_message_joins_validation_details() {
        let value = serde_json::json!({
            "detail": [{"loc": ["body", "topic"], "msg": "field required"}]
        });
        assert_eq!(error_message(&value).as_deref(), Some("field required"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() -> anyhow::Result<()> {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1))?;
        assert_eq!(
            backend.endpoint(wire::BUILD),
            "http://localhost:8000/api/build"
        );
        Ok(())
    }
}
