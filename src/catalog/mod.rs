//! Static catalogs shared by every workflow: book types, tones, audiences,
//! presentation features, chapter templates and audience-research prompts.

pub mod book_types;
pub mod features;
pub mod research;
pub mod templates;
