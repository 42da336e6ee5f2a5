//! Outline Review: an AI-proposed outline being edited before it becomes a book.
//!
//! The draft lives in its own YAML document until `accept` turns it into a
//! `Book`. Chapter numbers are one-based and rewritten after every structural
//! edit.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::features::{FeatureCategory, FeatureSelection, Preset, UnknownFeature};
use crate::catalog::templates::{ChapterTemplate, DEFAULT_TEMPLATE_ID};
use crate::error::ValidationError;
use crate::formats::{Book, BookOutline, Chapter, ChapterOutline, ChapterStatus, timestamp_id};
use crate::store::persist;

pub const WORDS_PER_PAGE: u32 = 250;
const NEW_CHAPTER_WORDS: u32 = 1500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineDraft {
    pub outline: BookOutline,
    #[serde(default)]
    pub enabled_features: Vec<String>,
    #[serde(default = "default_template")]
    pub chapter_template: String,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE_ID.to_owned()
}

#[derive(Debug, Clone, Default)]
pub struct OutlineBookPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub target_audience: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChapterOutlinePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub learning_objectives: Option<Vec<String>>,
    pub suggested_components: Option<Vec<String>>,
    pub connection_to_previous: Option<String>,
    pub connection_to_next: Option<String>,
    pub estimated_words: Option<u32>,
    pub target_pages: Option<u32>,
    pub chapter_template: Option<String>,
}

impl OutlineDraft {
    /// Starts a review. Recommended features outside the catalog are dropped.
    pub fn new(outline: BookOutline) -> Self {
        let enabled_features = FeatureSelection::from_ids(&outline.recommended_features).ids();
        let mut draft = Self {
            outline,
            enabled_features,
            chapter_template: default_template(),
        };
        draft.renumber();
        draft
    }

    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        persist::read_yaml(path)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        persist::write_yaml_atomic(path, self)
    }

    pub fn discard(path: &Path) -> anyhow::Result<()> {
        persist::remove_if_exists(path)
    }

    pub fn chapters(&self) -> &[ChapterOutline] {
        &self.outline.chapters
    }

    pub fn edit_book(&mut self, patch: OutlineBookPatch) {
        let book = &mut self.outline.book;
        if let Some(v) = patch.title {
            book.title = v;
        }
        if let Some(v) = patch.description {
            book.description = v;
        }
        if let Some(v) = patch.author {
            book.author = v;
        }
        if let Some(v) = patch.target_audience {
            book.target_audience = v;
        }
        if let Some(v) = patch.theme {
            book.theme = v;
        }
    }

    pub fn edit_chapter(
        &mut self,
        number: u32,
        patch: ChapterOutlinePatch,
    ) -> Result<(), ValidationError> {
        let chapter = self.chapter_mut(number)?;
        if let Some(v) = patch.title {
            chapter.title = v;
        }
        if let Some(v) = patch.description {
            chapter.description = v;
        }
        if let Some(v) = patch.learning_objectives {
            chapter.learning_objectives = v;
        }
        if let Some(v) = patch.suggested_components {
            chapter.suggested_components = v;
        }
        if let Some(v) = patch.connection_to_previous {
            chapter.connection_to_previous = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = patch.connection_to_next {
            chapter.connection_to_next = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = patch.estimated_words {
            chapter.estimated_words = v;
        }
        if let Some(v) = patch.target_pages {
            chapter.target_pages = Some(v).filter(|p| *p > 0);
        }
        if let Some(v) = patch.chapter_template {
            chapter.chapter_template = Some(v).filter(|s| !s.is_empty());
        }
        self.refresh_totals();
        Ok(())
    }

    /// Appends a placeholder chapter and returns its number.
    pub fn add_chapter(&mut self) -> u32 {
        let number = self.outline.chapters.len() as u32 + 1;
        self.outline.chapters.push(ChapterOutline {
            chapter_number: number,
            title: "New Chapter".to_owned(),
            description: "Chapter description".to_owned(),
            estimated_words: NEW_CHAPTER_WORDS,
            ..ChapterOutline::default()
        });
        self.refresh_totals();
        number
    }

    pub fn delete_chapter(&mut self, number: u32) -> Result<ChapterOutline, ValidationError> {
        let idx = self.index_of(number)?;
        let removed = self.outline.chapters.remove(idx);
        self.renumber();
        Ok(removed)
    }

    /// Moves chapter `number` so it ends up numbered `to` (clamped to the end).
    pub fn move_chapter(&mut self, number: u32, to: u32) -> Result<(), ValidationError> {
        let from = self.index_of(number)?;
        let chapter = self.outline.chapters.remove(from);
        let to = (to.max(1) as usize - 1).min(self.outline.chapters.len());
        self.outline.chapters.insert(to, chapter);
        self.renumber();
        Ok(())
    }

    pub fn features(&self) -> FeatureSelection {
        FeatureSelection::from_ids(&self.enabled_features)
    }

    /// Returns whether the feature is now on.
    pub fn toggle_feature(&mut self, id: &str) -> Result<bool, UnknownFeature> {
        let mut selection = self.features();
        let on = selection.toggle(id)?;
        self.enabled_features = selection.ids();
        Ok(on)
    }

    pub fn toggle_category(&mut self, category: FeatureCategory) {
        let mut selection = self.features();
        selection.toggle_category(category);
        self.enabled_features = selection.ids();
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        let mut selection = self.features();
        selection.apply_preset(preset);
        self.enabled_features = selection.ids();
    }

    /// Restores the set the outline recommended.
    pub fn reset_features(&mut self) {
        self.enabled_features = FeatureSelection::from_ids(&self.outline.recommended_features).ids();
    }

    pub fn set_template(&mut self, template: &ChapterTemplate) {
        self.chapter_template = template.id.clone();
    }

    pub fn total_words(&self) -> u32 {
        self.outline
            .chapters
            .iter()
            .map(|c| c.estimated_words)
            .sum()
    }

    /// Sum of target pages when any are set, otherwise derived from word count.
    pub fn estimated_pages(&self) -> u32 {
        let target: u32 = self
            .outline
            .chapters
            .iter()
            .filter_map(|c| c.target_pages)
            .sum();
        if target > 0 {
            target
        } else {
            self.total_words().div_ceil(WORDS_PER_PAGE)
        }
    }

    /// Commits the reviewed outline as a fresh book.
    pub fn accept(&self) -> Result<Book, ValidationError> {
        let meta = &self.outline.book;
        if meta.title.trim().is_empty() {
            return Err(ValidationError::MissingTitleOrAuthor);
        }
        if self.outline.chapters.is_empty() {
            return Err(ValidationError::NoChapters);
        }

        let mut book = Book::new(meta.title.trim(), meta.author.trim());
        book.description = meta.description.clone();
        book.book_type = Some(meta.book_type.clone()).filter(|s| !s.is_empty());
        book.tone = Some(meta.tone.clone()).filter(|s| !s.is_empty());
        book.target_audience = Some(meta.target_audience.clone()).filter(|s| !s.is_empty());
        book.enabled_features = self.enabled_features.clone();
        book.chapter_template = Some(self.chapter_template.clone());
        book.chapters = self
            .outline
            .chapters
            .iter()
            .enumerate()
            .map(|(idx, c)| Chapter {
                id: timestamp_id("chapter"),
                title: c.title.clone(),
                content: String::new(),
                order: idx,
                status: ChapterStatus::NotStarted,
                description: Some(c.description.clone()).filter(|s| !s.is_empty()),
                chapter_number: Some(c.chapter_number),
                learning_objectives: c.learning_objectives.clone(),
                suggested_components: c.suggested_components.clone(),
                connection_to_previous: c.connection_to_previous.clone(),
                connection_to_next: c.connection_to_next.clone(),
                estimated_words: Some(c.estimated_words).filter(|w| *w > 0),
                word_count_target: None,
                template: c.chapter_template.clone(),
                features: Some(self.enabled_features.clone()),
            })
            .collect();
        Ok(book)
    }

    fn renumber(&mut self) {
        for (idx, chapter) in self.outline.chapters.iter_mut().enumerate() {
            chapter.chapter_number = idx as u32 + 1;
        }
        self.refresh_totals();
    }

    fn refresh_totals(&mut self) {
        self.outline.total_estimated_words = self.total_words();
        self.outline.estimated_pages = self.estimated_pages();
    }

    fn index_of(&self, number: u32) -> Result<usize, ValidationError> {
        self.outline
            .chapters
            .iter()
            .position(|c| c.chapter_number == number)
            .ok_or_else(|| ValidationError::UnknownChapter(number.to_string()))
    }

    fn chapter_mut(&mut self, number: u32) -> Result<&mut ChapterOutline, ValidationError> {
        let idx = self.index_of(number)?;
        Ok(&mut self.outline.chapters[idx])
    }
}
