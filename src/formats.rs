use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    #[default]
    NotStarted,
    Generating,
    Draft,
    Complete,
}

impl ChapterStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Generating => "generating",
            Self::Draft => "draft",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Zero-based; always equal to the chapter's index in `Book::chapters`.
    pub order: usize,
    #[serde(default)]
    pub status: ChapterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_objectives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_to_previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_to_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_words: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_target: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Per-chapter override of `Book::enabled_features`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Partial update applied by `BookStore::update_chapter`/`add_chapter`.
#[derive(Debug, Clone, Default)]
pub struct ChapterPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ChapterStatus>,
    pub description: Option<String>,
    pub learning_objectives: Option<Vec<String>>,
    pub word_count_target: Option<u32>,
    pub template: Option<String>,
    pub features: Option<Vec<String>>,
}

impl ChapterPatch {
    pub fn apply(self, chapter: &mut Chapter) {
        if let Some(title) = self.title {
            chapter.title = title;
        }
        if let Some(content) = self.content {
            chapter.content = content;
        }
        if let Some(status) = self.status {
            chapter.status = status;
        }
        if let Some(description) = self.description {
            chapter.description = Some(description);
        }
        if let Some(objectives) = self.learning_objectives {
            chapter.learning_objectives = objectives;
        }
        if let Some(target) = self.word_count_target {
            chapter.word_count_target = Some(target);
        }
        if let Some(template) = self.template {
            chapter.template = Some(template);
        }
        if let Some(features) = self.features {
            chapter.features = Some(features);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalClauses {
    pub all_rights_reserved: bool,
    pub fiction: bool,
    pub moral_rights: bool,
    pub external_content: bool,
    pub designations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_clauses: Option<String>,
}

impl Default for LegalClauses {
    fn default() -> Self {
        Self {
            all_rights_reserved: true,
            fiction: false,
            moral_rights: true,
            external_content: false,
            designations: false,
            additional_clauses: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Isbns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kindle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paperback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardcover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingInfo {
    pub show_author_name: bool,
    pub pen_name: String,
    pub edition: String,
    pub year_of_publication: i32,
    #[serde(default)]
    pub publisher_name: String,
    #[serde(default)]
    pub isbns: Isbns,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<Collaborator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epigraph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_the_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub also_by_the_author: Option<String>,
}

impl PublishingInfo {
    pub fn defaults_for(author: &str) -> Self {
        Self {
            show_author_name: true,
            pen_name: author.to_owned(),
            edition: "First edition".to_owned(),
            year_of_publication: Utc::now().year(),
            publisher_name: String::new(),
            isbns: Isbns::default(),
            collaborators: Vec::new(),
            epigraph: None,
            foreword: None,
            dedication: None,
            preface: None,
            acknowledgements: None,
            about_the_author: None,
            also_by_the_author: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    #[serde(default)]
    pub enabled_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing_info: Option<PublishingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_clauses: Option<LegalClauses>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("book-{}", now.timestamp_millis()),
            title: title.into(),
            author: author.into(),
            description: String::new(),
            chapters: Vec::new(),
            book_type: None,
            tone: None,
            target_audience: None,
            special_requirements: None,
            enabled_features: Vec::new(),
            chapter_template: None,
            publishing_info: None,
            legal_clauses: None,
            created_at: now,
        }
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_mut(&mut self, id: &str) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id == id)
    }

    pub fn renumber(&mut self) {
        for (idx, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.order = idx;
        }
    }

    pub fn all_complete(&self) -> bool {
        !self.chapters.is_empty()
            && self
                .chapters
                .iter()
                .all(|c| c.status == ChapterStatus::Complete)
    }

    pub fn word_count(&self) -> usize {
        self.chapters
            .iter()
            .map(|c| c.content.split_whitespace().count())
            .sum()
    }
}

/// Shallow-merge fields for `BookStore::update_book`. `id` is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub book_type: Option<String>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    pub special_requirements: Option<String>,
    pub enabled_features: Option<Vec<String>>,
    pub chapter_template: Option<String>,
    pub publishing_info: Option<PublishingInfo>,
    pub legal_clauses: Option<LegalClauses>,
}

impl BookPatch {
    pub fn apply(self, book: &mut Book) {
        if let Some(v) = self.title {
            book.title = v;
        }
        if let Some(v) = self.author {
            book.author = v;
        }
        if let Some(v) = self.description {
            book.description = v;
        }
        if let Some(v) = self.book_type {
            book.book_type = Some(v);
        }
        if let Some(v) = self.tone {
            book.tone = Some(v);
        }
        if let Some(v) = self.target_audience {
            book.target_audience = Some(v);
        }
        if let Some(v) = self.special_requirements {
            book.special_requirements = Some(v);
        }
        if let Some(v) = self.enabled_features {
            book.enabled_features = v;
        }
        if let Some(v) = self.chapter_template {
            book.chapter_template = Some(v);
        }
        if let Some(v) = self.publishing_info {
            book.publishing_info = Some(v);
        }
        if let Some(v) = self.legal_clauses {
            book.legal_clauses = Some(v);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Image,
    Video,
    Diagram,
    Interactive,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [Self::Image, Self::Video, Self::Diagram, Self::Interactive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Diagram => "diagram",
            Self::Interactive => "interactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub category: String,
    pub chapter_number: u32,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_info: Option<ToolInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_guideline: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub reference_to: String,
    pub location: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeEnhancement {
    pub location: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancementSuggestions {
    #[serde(default)]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub chapter_transition: String,
    #[serde(default)]
    pub forward_hook: String,
    #[serde(default)]
    pub glossary_terms: Vec<GlossaryTerm>,
    #[serde(default)]
    pub callouts: Vec<Callout>,
    #[serde(default)]
    pub code_enhancements: Vec<CodeEnhancement>,
}

/// Advisory only; never merged into chapter content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub chapter_number: u32,
    pub chapter_title: String,
    #[serde(default)]
    pub enhancements: EnhancementSuggestions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub book_type: String,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterOutline {
    /// One-based and contiguous within the outline.
    pub chapter_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub suggested_components: Vec<String>,
    #[serde(default)]
    pub connection_to_previous: Option<String>,
    #[serde(default)]
    pub connection_to_next: Option<String>,
    #[serde(default)]
    pub estimated_words: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookOutline {
    pub book: OutlineBook,
    pub chapters: Vec<ChapterOutline>,
    #[serde(default)]
    pub recommended_features: Vec<String>,
    #[serde(default)]
    pub structure_explanation: String,
    #[serde(default)]
    pub total_estimated_words: u32,
    #[serde(default)]
    pub estimated_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub user_prompt_template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn timestamp_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}-{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}
