use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::formats::{
    Artifact, Book, BookPatch, BuildResult, Chapter, ChapterPatch, ChapterStatus, Enhancement,
    timestamp_id,
};
use crate::store::persist;

const DEFAULT_CHAPTER_TITLE: &str = "New Chapter";

/// Durable slice of the store. Everything else is session-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedBookState {
    #[serde(default)]
    pub book: Option<Book>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub enhancements: Vec<Enhancement>,
}

/// Owner of the in-progress book. Mutations on a store with no book loaded are no-ops;
/// the only errors come from writing the persisted slice.
#[derive(Debug)]
pub struct BookStore {
    path: Option<PathBuf>,
    state: PersistedBookState,
    current_chapter_id: Option<String>,
    build_result: Option<BuildResult>,
    is_building: bool,
}

impl BookStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: PersistedBookState::default(),
            current_chapter_id: None,
            build_result: None,
            is_building: false,
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let state = persist::read_json(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            state,
            current_chapter_id: None,
            build_result: None,
            is_building: false,
        })
    }

    pub fn book(&self) -> Option<&Book> {
        self.state.book.as_ref()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.state.artifacts
    }

    pub fn enhancements(&self) -> &[Enhancement] {
        &self.state.enhancements
    }

    pub fn build_result(&self) -> Option<&BuildResult> {
        self.build_result.as_ref()
    }

    pub fn is_building(&self) -> bool {
        self.is_building
    }

    /// Resolved from the chapter list on every read, so it can never drift.
    pub fn current_chapter(&self) -> Option<&Chapter> {
        let id = self.current_chapter_id.as_deref()?;
        self.book()?.chapter(id)
    }

    pub fn set_current_chapter(&mut self, id: Option<&str>) {
        self.current_chapter_id = id.map(str::to_owned);
    }

    pub fn set_book(&mut self, book: Book) -> anyhow::Result<()> {
        self.state.book = Some(book);
        self.persist()
    }

    pub fn update_book(&mut self, patch: BookPatch) -> anyhow::Result<()> {
        let Some(book) = self.state.book.as_mut() else {
            return Ok(());
        };
        patch.apply(book);
        self.persist()
    }

    pub fn clear_book(&mut self) -> anyhow::Result<()> {
        self.state = PersistedBookState::default();
        self.current_chapter_id = None;
        self.build_result = None;
        self.is_building = false;
        self.persist()
    }

    pub fn update_chapter(&mut self, id: &str, patch: ChapterPatch) -> anyhow::Result<()> {
        self.with_chapter(id, |chapter| patch.apply(chapter))
    }

    pub fn update_chapter_content(&mut self, id: &str, content: &str) -> anyhow::Result<()> {
        self.with_chapter(id, |chapter| chapter.content = content.to_owned())
    }

    pub fn update_chapter_status(&mut self, id: &str, status: ChapterStatus) -> anyhow::Result<()> {
        self.with_chapter(id, |chapter| chapter.status = status)
    }

    /// Appends a chapter and returns its id, or `None` when no book is loaded.
    pub fn add_chapter(&mut self, patch: ChapterPatch) -> anyhow::Result<Option<String>> {
        let Some(book) = self.state.book.as_mut() else {
            return Ok(None);
        };

        let title = patch
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAPTER_TITLE.to_owned());
        let mut chapter = Chapter {
            id: timestamp_id("chapter"),
            content: format!("# {title}\n\nStart writing here..."),
            title,
            order: book.chapters.len(),
            status: ChapterStatus::NotStarted,
            ..Chapter::default()
        };
        patch.apply(&mut chapter);
        let id = chapter.id.clone();
        book.chapters.push(chapter);

        self.persist()?;
        Ok(Some(id))
    }

    pub fn delete_chapter(&mut self, id: &str) -> anyhow::Result<()> {
        let Some(book) = self.state.book.as_mut() else {
            return Ok(());
        };
        let before = book.chapters.len();
        book.chapters.retain(|c| c.id != id);
        if book.chapters.len() == before {
            return Ok(());
        }
        book.renumber();

        if self.current_chapter_id.as_deref() == Some(id) {
            self.current_chapter_id = None;
        }
        self.persist()
    }

    /// Replaces the chapter list wholesale and rewrites every `order` to match position.
    pub fn reorder_chapters(&mut self, chapters: Vec<Chapter>) -> anyhow::Result<()> {
        let Some(book) = self.state.book.as_mut() else {
            return Ok(());
        };
        book.chapters = chapters;
        book.renumber();
        self.persist()
    }

    pub fn move_chapter(&mut self, id: &str, to_index: usize) -> anyhow::Result<()> {
        let Some(book) = self.state.book.as_ref() else {
            return Ok(());
        };
        let mut chapters = book.chapters.clone();
        let Some(from) = chapters.iter().position(|c| c.id == id) else {
            return Ok(());
        };
        let chapter = chapters.remove(from);
        let to = to_index.min(chapters.len());
        chapters.insert(to, chapter);
        self.reorder_chapters(chapters)
    }

    pub fn set_artifacts(&mut self, artifacts: Vec<Artifact>) -> anyhow::Result<()> {
        self.state.artifacts = artifacts;
        self.persist()
    }

    pub fn add_artifact(&mut self, artifact: Artifact) -> anyhow::Result<()> {
        self.state.artifacts.push(artifact);
        self.persist()
    }

    pub fn update_artifact(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut Artifact),
    ) -> anyhow::Result<()> {
        let Some(artifact) = self.state.artifacts.iter_mut().find(|a| a.id == id) else {
            return Ok(());
        };
        update(artifact);
        self.persist()
    }

    pub fn delete_artifact(&mut self, id: &str) -> anyhow::Result<()> {
        self.state.artifacts.retain(|a| a.id != id);
        self.persist()
    }

    pub fn clear_artifacts(&mut self) -> anyhow::Result<()> {
        self.state.artifacts.clear();
        self.persist()
    }

    pub fn set_enhancements(&mut self, enhancements: Vec<Enhancement>) -> anyhow::Result<()> {
        self.state.enhancements = enhancements;
        self.persist()
    }

    pub fn clear_enhancements(&mut self) -> anyhow::Result<()> {
        self.state.enhancements.clear();
        self.persist()
    }

    pub fn set_build_result(&mut self, result: Option<BuildResult>) {
        self.build_result = result;
    }

    pub fn set_is_building(&mut self, building: bool) {
        self.is_building = building;
    }

    fn with_chapter(&mut self, id: &str, update: impl FnOnce(&mut Chapter)) -> anyhow::Result<()> {
        let Some(chapter) = self.state.book.as_mut().and_then(|b| b.chapter_mut(id)) else {
            return Ok(());
        };
        update(chapter);
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => persist::write_json_atomic(path, &self.state),
            None => Ok(()),
        }
    }
}
