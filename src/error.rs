use thiserror::Error;

/// Input problems caught before any network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("topic is required")]
    MissingTopic,

    #[error("a custom tone description is required when tone is `custom`")]
    MissingCustomTone,

    #[error("book title and author are required")]
    MissingTitleOrAuthor,

    #[error("unanswered questionnaire items: {}", .0.join(", "))]
    UnansweredQuestions(Vec<String>),

    #[error("{step} requires {needs} to be generated first")]
    MissingPrerequisite {
        step: &'static str,
        needs: &'static str,
    },

    #[error("GitHub username, token and repository name are all required")]
    MissingGithubCredentials,

    #[error("template {0}")]
    IncompleteTemplate(&'static str),

    #[error("no book is loaded; accept an outline or run `book set` first")]
    NoBook,

    #[error("no outline is under review; run `plan outline` first")]
    NoOutline,

    #[error("unknown chapter: {0}")]
    UnknownChapter(String),

    #[error("unknown chapter template: {0}")]
    UnknownTemplate(String),

    #[error("the book has no chapters")]
    NoChapters,

    #[error("{incomplete} chapter(s) are not complete yet")]
    NotReadyToPublish { incomplete: usize },

    #[error("unknown {kind}: {value}")]
    UnknownCatalogValue { kind: &'static str, value: String },
}
