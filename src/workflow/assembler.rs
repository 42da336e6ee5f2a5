//! Book Assembler and Publisher: enhancement suggestions, artifact prompts,
//! backend builds, GitHub Pages deploys and archive downloads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;

use crate::backend::wire::{
    ArtifactsRequest, BuildBook, BuildRequest, ChapterText, EnhanceRequest, GithubTarget,
};
use crate::backend::{AuthoringBackend, BackendError, RetryPolicy};
use crate::error::ValidationError;
use crate::formats::{Artifact, ArtifactKind, Book, BuildResult, Chapter, ChapterStatus};
use crate::store::BookStore;
use crate::workflow::chapters::{self, ordered};
use crate::workflow::progress;

const GITHUB_PAGES_HOST: &str = "github.io";

fn chapter_texts<'a>(chapters: impl Iterator<Item = (usize, &'a Chapter)>) -> Vec<ChapterText> {
    chapters
        .map(|(idx, c)| ChapterText {
            chapter_number: c.chapter_number.unwrap_or(idx as u32 + 1),
            title: c.title.clone(),
            content: c.content.clone(),
        })
        .collect()
}

/// Requests advisory suggestions for every completed chapter and stores them.
/// Chapter content is never touched.
pub async fn enhance(
    store: &mut BookStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<usize> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let completed = chapter_texts(
        ordered(book)
            .into_iter()
            .enumerate()
            .filter(|(_, c)| c.status == ChapterStatus::Complete),
    );
    if completed.is_empty() {
        anyhow::bail!("no completed chapters to enhance");
    }

    let request = EnhanceRequest {
        book_title: book.title.clone(),
        book_description: book.description.clone(),
        chapters: completed,
    };
    let enhancements = progress::track(
        "enhance book",
        progress::DEFAULT_TICK,
        retry.run("enhance book", || backend.enhance_book(&request)),
    )
    .await
    .context("enhance book")?;

    let count = enhancements.len();
    store.set_enhancements(enhancements)?;
    Ok(count)
}

/// Asks for artifact prompts across the whole book, replacing the stored list.
pub async fn generate_artifacts(
    store: &mut BookStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<usize> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    if book.chapters.is_empty() {
        return Err(ValidationError::NoChapters.into());
    }
    let request = ArtifactsRequest {
        book_title: book.title.clone(),
        book_description: book.description.clone(),
        book_type: book.book_type.clone().unwrap_or_default(),
        tone: book.tone.clone().unwrap_or_default(),
        target_audience: book.target_audience.clone().unwrap_or_default(),
        chapters: chapter_texts(ordered(book).into_iter().enumerate()),
    };
    let artifacts = progress::track(
        "generate artifacts",
        progress::DEFAULT_TICK,
        retry.run("generate artifacts", || backend.generate_artifacts(&request)),
    )
    .await
    .context("generate artifacts")?;

    let count = artifacts.len();
    store.set_artifacts(artifacts)?;
    Ok(count)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactFilter {
    pub chapter: Option<u32>,
    pub kind: Option<ArtifactKind>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ArtifactFilter {
    pub fn matches(&self, artifact: &Artifact) -> bool {
        if self.chapter.is_some_and(|n| artifact.chapter_number != n) {
            return false;
        }
        if self.kind.is_some_and(|k| artifact.kind != k) {
            return false;
        }
        if let Some(category) = &self.category
            && !artifact.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(query) if !query.is_empty() => {
                let tool = artifact
                    .tool_info
                    .as_ref()
                    .map(|t| t.name.as_str())
                    .unwrap_or_default();
                [artifact.title.as_str(), artifact.description.as_str(), tool]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            }
            _ => true,
        }
    }
}

pub fn filter_artifacts<'a>(artifacts: &'a [Artifact], filter: &ArtifactFilter) -> Vec<&'a Artifact> {
    artifacts.iter().filter(|a| filter.matches(a)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub total: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    pub by_category: BTreeMap<String, usize>,
}

pub fn summarize_artifacts(artifacts: &[Artifact]) -> ArtifactSummary {
    let mut summary = ArtifactSummary {
        total: artifacts.len(),
        ..ArtifactSummary::default()
    };
    for artifact in artifacts {
        *summary.by_kind.entry(artifact.kind.as_str()).or_default() += 1;
        *summary
            .by_category
            .entry(artifact.category.clone())
            .or_default() += 1;
    }
    summary
}

/// Credentials for a GitHub Pages deploy. All three are required.
pub fn github_target(
    username: Option<&str>,
    token: Option<&str>,
    repo: Option<&str>,
) -> Result<GithubTarget, ValidationError> {
    let field = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned);
    match (field(username), field(token), field(repo)) {
        (Some(github_username), Some(github_token), Some(repo_name)) => Ok(GithubTarget {
            github_username,
            github_token,
            repo_name,
        }),
        _ => Err(ValidationError::MissingGithubCredentials),
    }
}

pub fn build_request(book: &Book, github: Option<GithubTarget>) -> BuildRequest {
    BuildRequest {
        book: BuildBook::from_book(book),
        features: book.enabled_features.clone(),
        github,
    }
}

/// Sends the finished book to the build backend. With `github` set this is a
/// deploy and only a GitHub Pages URL counts as success.
///
/// Never retried: each call reruns the whole backend build.
pub async fn publish(
    store: &mut BookStore,
    backend: &dyn AuthoringBackend,
    github: Option<GithubTarget>,
) -> anyhow::Result<BuildResult> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    chapters::ensure_publishable(book)?;
    let deploy = github.is_some();
    let request = build_request(book, github);
    tracing::info!(
        chapters = request.book.chapters.len(),
        features = request.features.len(),
        deploy,
        "publish book"
    );

    store.set_is_building(true);
    let response = progress::track(
        if deploy { "deploy book" } else { "build book" },
        progress::DEFAULT_TICK,
        backend.build(&request),
    )
    .await;
    store.set_is_building(false);

    let response = response.context(if deploy { "deploy to GitHub Pages" } else { "build book" })?;
    if deploy
        && !response
            .url
            .as_deref()
            .is_some_and(|url| url.contains(GITHUB_PAGES_HOST))
    {
        return Err(BackendError::UnexpectedDeployUrl { got: response.url }.into());
    }

    let result = BuildResult {
        success: true,
        message: response.message,
        url: response.url,
        build_dir: response.build_dir,
        timestamp: Utc::now(),
    };
    store.set_build_result(Some(result.clone()));
    Ok(result)
}

/// `<title with whitespace runs as underscores>_book.zip`.
pub fn archive_file_name(title: &str) -> String {
    let stem = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_");
    if stem.is_empty() {
        "book.zip".to_owned()
    } else {
        format!("{stem}_book.zip")
    }
}

/// Fetches the archive of a build directory and writes it to `out`, or to the
/// default archive name inside `dir`.
pub async fn download(
    backend: &dyn AuthoringBackend,
    build_dir: &str,
    title: &str,
    out: Option<&Path>,
    dir: &Path,
) -> anyhow::Result<PathBuf> {
    let bytes = backend
        .download_book(build_dir)
        .await
        .with_context(|| format!("download build {build_dir}"))?;
    let path = match out {
        Some(path) => path.to_path_buf(),
        None => dir.join(archive_file_name(title)),
    };
    crate::export::write_bytes(&path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "archive saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scripted::{ScriptedBackend, server_error};
    use crate::backend::wire::{self, BuildResponse};
    use crate::formats::ToolInfo;

    fn finished_book() -> Book {
        let mut book = Book::new("Async Rust", "Ferris");
        book.enabled_features = vec!["admonitions".to_owned()];
        for i in 0..2 {
            book.chapters.push(Chapter {
                id: format!("c{i}"),
                title: format!("Chapter {}", i + 1),
                content: format!("# Chapter {}", i + 1),
                order: i,
                status: ChapterStatus::Complete,
                ..Chapter::default()
            });
        }
        book
    }

    fn built(url: &str) -> BuildResponse {
        BuildResponse {
            message: "Book built".to_owned(),
            url: Some(url.to_owned()),
            build_dir: Some("/tmp/builds/abc".to_owned()),
        }
    }

    #[tokio::test]
    async fn publish_sends_features_and_records_result() -> anyhow::Result<()> {
        let mut store = BookStore::in_memory();
        store.set_book(finished_book())?;
        let backend = ScriptedBackend::default();
        backend.build.ok(built("http://localhost:8000/preview/abc"));

        let result = publish(&mut store, &backend, None).await?;
        assert_eq!(result.build_dir.as_deref(), Some("/tmp/builds/abc"));
        assert!(!store.is_building());
        assert_eq!(store.build_result(), Some(&result));

        let sent = &backend.requests(wire::BUILD)[0];
        assert_eq!(sent["features"][0], "admonitions");
        assert_eq!(sent["book"]["chapters"][0]["order"], 1);
        assert!(sent.get("github_token").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn incomplete_book_is_not_sent() -> anyhow::Result<()> {
        let mut store = BookStore::in_memory();
        let mut book = finished_book();
        book.chapters[1].status = ChapterStatus::Draft;
        store.set_book(book)?;
        let backend = ScriptedBackend::default();

        assert!(publish(&mut store, &backend, None).await.is_err());
        assert_eq!(backend.calls(wire::BUILD), 0);
        Ok(())
    }

    #[tokio::test]
    async fn deploy_requires_pages_url() -> anyhow::Result<()> {
        let mut store = BookStore::in_memory();
        store.set_book(finished_book())?;
        let backend = ScriptedBackend::default();
        backend.build.ok(built("http://localhost:8000/preview/abc"));
        backend.build.ok(built("https://ferris.github.io/async-rust/"));

        let target = github_target(Some("ferris"), Some("ghp_x"), Some("async-rust"))?;
        let err = publish(&mut store, &backend, Some(target.clone()))
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected deploy failure"))?;
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::UnexpectedDeployUrl { .. })
        ));
        assert!(store.build_result().is_none());

        let result = publish(&mut store, &backend, Some(target)).await?;
        assert_eq!(result.url.as_deref(), Some("https://ferris.github.io/async-rust/"));
        assert_eq!(backend.requests(wire::BUILD)[1]["repo_name"], "async-rust");
        Ok(())
    }

    #[tokio::test]
    async fn failed_build_is_not_retried() -> anyhow::Result<()> {
        let mut store = BookStore::in_memory();
        store.set_book(finished_book())?;
        let backend = ScriptedBackend::default();
        backend.build.err(server_error(wire::BUILD));
        assert!(publish(&mut store, &backend, None).await.is_err());
        assert_eq!(backend.calls(wire::BUILD), 1);
        assert!(!store.is_building());
        Ok(())
    }

    #[test]
    fn github_fields_are_all_required() {
        assert_eq!(
            github_target(Some("u"), Some(" "), Some("r")),
            Err(ValidationError::MissingGithubCredentials)
        );
        assert!(github_target(Some("u"), Some("t"), None).is_err());
    }

    #[tokio::test]
    async fn enhance_only_sends_completed_chapters() -> anyhow::Result<()> {
        let mut store = BookStore::in_memory();
        let mut book = finished_book();
        book.chapters[0].status = ChapterStatus::Draft;
        store.set_book(book)?;
        let backend = ScriptedBackend::default();
        backend.enhance.ok(Vec::new());

        enhance(&mut store, &backend, RetryPolicy::none()).await?;
        let sent = &backend.requests(wire::ENHANCE_BOOK)[0];
        let chapters = sent["chapters"].as_array().map(Vec::len);
        assert_eq!(chapters, Some(1));
        assert_eq!(sent["chapters"][0]["chapter_number"], 2);
        Ok(())
    }

    #[test]
    fn archive_names_collapse_whitespace() {
        assert_eq!(archive_file_name("Async  Rust\tBook"), "Async_Rust_Book_book.zip");
        assert_eq!(archive_file_name("a/b"), "a_b_book.zip");
        assert_eq!(archive_file_name("  "), "book.zip");
    }

    fn artifact(kind: ArtifactKind, category: &str, chapter: u32, title: &str) -> Artifact {
        Artifact {
            id: format!("{category}-{chapter}"),
            kind,
            category: category.to_owned(),
            chapter_number: chapter,
            title: title.to_owned(),
            description: String::new(),
            prompt: None,
            content: None,
            tool_info: Some(ToolInfo {
                name: "Midjourney".to_owned(),
                url: None,
            }),
            placement_guideline: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn artifact_filters_combine() {
        let artifacts = vec![
            artifact(ArtifactKind::Image, "hero_image", 1, "Opening scene"),
            artifact(ArtifactKind::Diagram, "flowchart", 1, "Request flow"),
            artifact(ArtifactKind::Image, "hero_image", 2, "Second hero"),
        ];
        let filter = ArtifactFilter {
            kind: Some(ArtifactKind::Image),
            chapter: Some(1),
            ..ArtifactFilter::default()
        };
        assert_eq!(filter_artifacts(&artifacts, &filter).len(), 1);

        let search = ArtifactFilter {
            search: Some("MIDJOURNEY".to_owned()),
            ..ArtifactFilter::default()
        };
        assert_eq!(filter_artifacts(&artifacts, &search).len(), 3);

        let summary = summarize_artifacts(&artifacts);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_kind.get("image"), Some(&2));
        assert_eq!(summary.by_category.get("flowchart"), Some(&1));
    }
}
