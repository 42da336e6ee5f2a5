//! Explicitly constructed state containers, each persisted as its own document
//! under the data directory.

pub mod book;
pub mod persist;
pub mod prompts;
pub mod research;
pub mod settings;
pub mod templates;

pub use book::BookStore;
pub use prompts::PromptLibrary;
pub use research::ResearchStore;
pub use settings::SettingsStore;
pub use templates::CustomTemplates;
