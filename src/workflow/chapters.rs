//! Chapter Builder: per-chapter generation, editing and completion on top of
//! the book store.

use anyhow::Context as _;

use crate::backend::wire::ChapterRequest;
use crate::backend::{AuthoringBackend, RetryPolicy};
use crate::catalog::features::FeatureSelection;
use crate::catalog::templates::DEFAULT_TEMPLATE_ID;
use crate::error::ValidationError;
use crate::formats::{Book, Chapter, ChapterPatch, ChapterStatus};
use crate::prompt::{ChapterPrompts, chapter_prompts};
use crate::store::{BookStore, CustomTemplates};
use crate::workflow::progress;

const DEFAULT_WORDS: u32 = 1500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub additional_instructions: Option<String>,
    /// Overrides the chapter's own target for this request only.
    pub word_count: Option<u32>,
}

/// Resolves a chapter by id, or by one-based position when `key` is a number.
pub fn find_chapter<'a>(book: &'a Book, key: &str) -> Result<&'a Chapter, ValidationError> {
    if let Some(chapter) = book.chapter(key) {
        return Ok(chapter);
    }
    key.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .and_then(|n| ordered(book).into_iter().nth(n - 1))
        .ok_or_else(|| ValidationError::UnknownChapter(key.to_owned()))
}

/// Chapters sorted by `order`.
pub fn ordered(book: &Book) -> Vec<&Chapter> {
    let mut chapters: Vec<&Chapter> = book.chapters.iter().collect();
    chapters.sort_by_key(|c| c.order);
    chapters
}

/// The chapter's own feature list, else the book's.
pub fn effective_features(book: &Book, chapter: &Chapter) -> Vec<String> {
    chapter
        .features
        .clone()
        .unwrap_or_else(|| book.enabled_features.clone())
}

pub fn chapter_request(
    book: &Book,
    chapter_id: &str,
    templates: &CustomTemplates,
    options: &GenerateOptions,
) -> Result<ChapterRequest, ValidationError> {
    let chapters = ordered(book);
    let position = chapters
        .iter()
        .position(|c| c.id == chapter_id)
        .ok_or_else(|| ValidationError::UnknownChapter(chapter_id.to_owned()))?;
    let chapter = chapters[position];

    let template_id = chapter
        .template
        .as_deref()
        .or(book.chapter_template.as_deref())
        .unwrap_or(DEFAULT_TEMPLATE_ID);
    let template = templates
        .resolve(template_id)
        .ok_or_else(|| ValidationError::UnknownTemplate(template_id.to_owned()))?;

    let previous = position.checked_sub(1).and_then(|i| chapters.get(i));
    let next = chapters.get(position + 1);

    Ok(ChapterRequest {
        book_title: book.title.clone(),
        book_description: book.description.clone(),
        book_type: book.book_type.clone().unwrap_or_default(),
        tone: book.tone.clone().unwrap_or_default(),
        target_audience: book.target_audience.clone().unwrap_or_default(),
        chapter_number: chapter.chapter_number.unwrap_or(position as u32 + 1),
        chapter_title: chapter.title.clone(),
        chapter_description: chapter.description.clone().unwrap_or_default(),
        learning_objectives: chapter.learning_objectives.clone(),
        suggested_components: chapter.suggested_components.clone(),
        estimated_words: options
            .word_count
            .or(chapter.word_count_target)
            .or(chapter.estimated_words)
            .unwrap_or(DEFAULT_WORDS),
        chapter_template: template.id,
        template_structure: template.structure,
        enabled_features: effective_features(book, chapter),
        previous_chapter_title: previous.map(|c| c.title.clone()),
        connection_to_previous: chapter.connection_to_previous.clone(),
        next_chapter_title: next.map(|c| c.title.clone()),
        connection_to_next: chapter.connection_to_next.clone(),
        additional_instructions: options
            .additional_instructions
            .clone()
            .filter(|s| !s.trim().is_empty()),
    })
}

pub fn preview_prompts(
    store: &BookStore,
    chapter_key: &str,
    templates: &CustomTemplates,
    options: &GenerateOptions,
) -> anyhow::Result<ChapterPrompts> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let chapter = find_chapter(book, chapter_key)?;
    let request = chapter_request(book, &chapter.id, templates, options)?;
    Ok(chapter_prompts(&request))
}

/// Generates content for one chapter.
///
/// The chapter is `generating` while the call is in flight. Success replaces
/// the content and leaves it as `draft`; failure restores the prior status
/// and leaves the content untouched.
pub async fn generate(
    store: &mut BookStore,
    backend: &dyn AuthoringBackend,
    templates: &CustomTemplates,
    chapter_key: &str,
    options: &GenerateOptions,
    retry: RetryPolicy,
) -> anyhow::Result<String> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let chapter = find_chapter(book, chapter_key)?;
    let id = chapter.id.clone();
    let prior = chapter.status;
    let request = chapter_request(book, &id, templates, options)?;

    store.set_current_chapter(Some(&id));
    store.update_chapter_status(&id, ChapterStatus::Generating)?;
    tracing::info!(
        chapter = request.chapter_number,
        title = %request.chapter_title,
        words = request.estimated_words,
        features = request.enabled_features.len(),
        "generate chapter"
    );

    let result = progress::track(
        "generate chapter",
        progress::DEFAULT_TICK,
        retry.run("generate chapter", || backend.generate_chapter(&request)),
    )
    .await;

    match result {
        Ok(content) => {
            store.update_chapter_content(&id, &content)?;
            store.update_chapter_status(&id, ChapterStatus::Draft)?;
            Ok(id)
        }
        Err(err) => {
            store.update_chapter_status(&id, prior)?;
            Err(err).with_context(|| format!("generate chapter {}", request.chapter_number))
        }
    }
}

/// Replaces content from the editor; the chapter becomes a draft again.
pub fn edit(store: &mut BookStore, chapter_key: &str, content: &str) -> anyhow::Result<String> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let id = find_chapter(book, chapter_key)?.id.clone();
    store.update_chapter_content(&id, content)?;
    store.update_chapter_status(&id, ChapterStatus::Draft)?;
    store.set_current_chapter(Some(&id));
    Ok(id)
}

/// Marks a chapter complete and moves focus to the next chapter that has not
/// been started, returning its id.
pub fn complete(store: &mut BookStore, chapter_key: &str) -> anyhow::Result<Option<String>> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let id = find_chapter(book, chapter_key)?.id.clone();
    store.update_chapter_status(&id, ChapterStatus::Complete)?;

    let book = store.book().ok_or(ValidationError::NoBook)?;
    let chapters = ordered(book);
    let position = chapters.iter().position(|c| c.id == id).unwrap_or(0);
    let next = chapters
        .iter()
        .skip(position + 1)
        .chain(chapters.iter().take(position))
        .find(|c| c.status == ChapterStatus::NotStarted)
        .map(|c| c.id.clone());

    store.set_current_chapter(next.as_deref());
    Ok(next)
}

/// Replaces a chapter's feature list. Every id must be in the catalog.
pub fn set_features(
    store: &mut BookStore,
    chapter_key: &str,
    update: impl FnOnce(&mut FeatureSelection) -> anyhow::Result<()>,
) -> anyhow::Result<Vec<String>> {
    let book = store.book().ok_or(ValidationError::NoBook)?;
    let chapter = find_chapter(book, chapter_key)?;
    let id = chapter.id.clone();
    let mut selection = FeatureSelection::from_ids(effective_features(book, chapter));
    update(&mut selection)?;

    let ids = selection.ids();
    store.update_chapter(
        &id,
        ChapterPatch {
            features: Some(ids.clone()),
            ..Default::default()
        },
    )?;
    Ok(ids)
}

/// Publishing needs every chapter complete.
pub fn ensure_publishable(book: &Book) -> Result<(), ValidationError> {
    if book.chapters.is_empty() {
        return Err(ValidationError::NoChapters);
    }
    let incomplete = book
        .chapters
        .iter()
        .filter(|c| c.status != ChapterStatus::Complete)
        .count();
    if incomplete > 0 {
        return Err(ValidationError::NotReadyToPublish { incomplete });
    }
    Ok(())
}

/// `(complete, total)`.
pub fn completion(book: &Book) -> (usize, usize) {
    let done = book
        .chapters
        .iter()
        .filter(|c| c.status == ChapterStatus::Complete)
        .count();
    (done, book.chapters.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scripted::{ScriptedBackend, server_error};
    use crate::backend::wire;

    fn store_with(n: usize) -> anyhow::Result<BookStore> {
        let mut store = BookStore::in_memory();
        let mut book = Book::new("Async Rust", "Ferris");
        book.enabled_features = vec!["admonitions".to_owned()];
        book.chapter_template = Some("tutorial".to_owned());
        for i in 0..n {
            book.chapters.push(Chapter {
                id: format!("c{}", i + 1),
                title: format!("Chapter {}", i + 1),
                order: i,
                chapter_number: Some(i as u32 + 1),
                ..Chapter::default()
            });
        }
        store.set_book(book)?;
        Ok(store)
    }

    #[test]
    fn chapters_resolve_by_id_or_position() -> anyhow::Result<()> {
        let store = store_with(3)?;
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        assert_eq!(find_chapter(book, "c2")?.id, "c2");
        assert_eq!(find_chapter(book, "3")?.id, "c3");
        assert!(find_chapter(book, "0").is_err());
        assert!(find_chapter(book, "7").is_err());
        Ok(())
    }

    #[test]
    fn request_uses_continuity_and_book_defaults() -> anyhow::Result<()> {
        let store = store_with(3)?;
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        let templates = CustomTemplates::in_memory();
        let request = chapter_request(book, "c2", &templates, &GenerateOptions::default())?;
        assert_eq!(request.previous_chapter_title.as_deref(), Some("Chapter 1"));
        assert_eq!(request.next_chapter_title.as_deref(), Some("Chapter 3"));
        assert_eq!(request.chapter_template, "tutorial");
        assert!(!request.template_structure.is_empty());
        assert_eq!(request.enabled_features, vec!["admonitions"]);
        assert_eq!(request.estimated_words, 1500);
        Ok(())
    }

    #[test]
    fn word_count_override_wins() -> anyhow::Result<()> {
        let mut store = store_with(1)?;
        store.update_chapter(
            "c1",
            ChapterPatch {
                word_count_target: Some(900),
                ..ChapterPatch::default()
            },
        )?;
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        let templates = CustomTemplates::in_memory();
        let saved = chapter_request(book, "c1", &templates, &GenerateOptions::default())?;
        assert_eq!(saved.estimated_words, 900);
        let once = chapter_request(
            book,
            "c1",
            &templates,
            &GenerateOptions {
                word_count: Some(2500),
                ..GenerateOptions::default()
            },
        )?;
        assert_eq!(once.estimated_words, 2500);
        Ok(())
    }

    #[test]
    fn edit_turns_complete_back_into_draft() -> anyhow::Result<()> {
        let mut store = store_with(1)?;
        store.update_chapter_status("c1", ChapterStatus::Complete)?;
        edit(&mut store, "c1", "# New text")?;
        let chapter = store.current_chapter().ok_or_else(|| anyhow::anyhow!("no current"))?;
        assert_eq!(chapter.status, ChapterStatus::Draft);
        assert_eq!(chapter.content, "# New text");
        Ok(())
    }

    #[test]
    fn completing_the_last_chapter_unlocks_publishing() -> anyhow::Result<()> {
        let mut store = store_with(3)?;
        assert_eq!(complete(&mut store, "c1")?.as_deref(), Some("c2"));
        assert_eq!(complete(&mut store, "c2")?.as_deref(), Some("c3"));
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        assert_eq!(
            ensure_publishable(book),
            Err(ValidationError::NotReadyToPublish { incomplete: 1 })
        );

        assert_eq!(complete(&mut store, "c3")?, None);
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        assert_eq!(ensure_publishable(book), Ok(()));
        assert_eq!(completion(book), (3, 3));
        Ok(())
    }

    #[test]
    fn chapter_features_start_from_book_set() -> anyhow::Result<()> {
        let mut store = store_with(1)?;
        let ids = set_features(&mut store, "c1", |s| {
            s.toggle("tables")?;
            Ok(())
        })?;
        assert_eq!(ids, vec!["admonitions", "tables"]);
        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        assert_eq!(book.enabled_features, vec!["admonitions"]);
        Ok(())
    }

    #[test]
    fn empty_book_is_not_publishable() {
        assert_eq!(
            ensure_publishable(&Book::new("T", "A")),
            Err(ValidationError::NoChapters)
        );
    }

    #[tokio::test]
    async fn generated_content_lands_as_draft() -> anyhow::Result<()> {
        let mut store = store_with(2)?;
        set_features(&mut store, "c1", |s| {
            s.toggle("tables")?;
            Ok(())
        })?;
        let backend = ScriptedBackend::default();
        backend.chapter.ok("# Chapter 1\n\nBody".to_owned());

        let templates = CustomTemplates::in_memory();
        let options = GenerateOptions {
            additional_instructions: Some("More examples".to_owned()),
            word_count: None,
        };
        let id = generate(&mut store, &backend, &templates, "1", &options, RetryPolicy::none()).await?;
        assert_eq!(id, "c1");

        let chapter = store.current_chapter().ok_or_else(|| anyhow::anyhow!("no current"))?;
        assert_eq!(chapter.status, ChapterStatus::Draft);
        assert_eq!(chapter.content, "# Chapter 1\n\nBody");
        assert_eq!(
            chapter.features.as_deref(),
            Some(&["admonitions".to_owned(), "tables".to_owned()][..])
        );

        let sent = backend.requests(wire::GENERATE_CHAPTER);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["additional_instructions"], "More examples");
        assert_eq!(sent[0]["next_chapter_title"], "Chapter 2");
        assert!(sent[0].get("previous_chapter_title").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_generation_restores_status() -> anyhow::Result<()> {
        let mut store = store_with(1)?;
        edit(&mut store, "c1", "kept")?;
        let backend = ScriptedBackend::default();
        backend.chapter.err(server_error(wire::GENERATE_CHAPTER));

        let templates = CustomTemplates::in_memory();
        let result = generate(
            &mut store,
            &backend,
            &templates,
            "c1",
            &GenerateOptions::default(),
            RetryPolicy::none(),
        )
        .await;
        assert!(result.is_err());

        let book = store.book().ok_or_else(|| anyhow::anyhow!("no book"))?;
        let chapter = book.chapter("c1").ok_or_else(|| anyhow::anyhow!("missing"))?;
        assert_eq!(chapter.status, ChapterStatus::Draft);
        assert_eq!(chapter.content, "kept");
        Ok(())
    }
}
