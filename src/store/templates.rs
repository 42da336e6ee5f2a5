use std::path::PathBuf;

use chrono::Utc;

use crate::catalog::templates::{self, ChapterTemplate};
use crate::error::ValidationError;
use crate::store::persist;

/// User-authored chapter templates. Saved entries resolve exactly like built-ins.
#[derive(Debug)]
pub struct CustomTemplates {
    path: Option<PathBuf>,
    templates: Vec<ChapterTemplate>,
}

impl CustomTemplates {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            templates: Vec::new(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let templates = persist::read_json(&path)?.unwrap_or_default();
        Ok(Self {
            path: Some(path),
            templates,
        })
    }

    pub fn templates(&self) -> &[ChapterTemplate] {
        &self.templates
    }

    pub fn resolve(&self, id: &str) -> Option<ChapterTemplate> {
        templates::resolve(id, &self.templates)
    }

    pub fn all(&self) -> Vec<ChapterTemplate> {
        let mut all = templates::builtin_templates();
        all.extend(self.templates.iter().cloned());
        all
    }

    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        structure: &[String],
        example: &str,
    ) -> anyhow::Result<ChapterTemplate> {
        let template = validate_draft(name, description, structure, example)?;
        self.templates.push(template.clone());
        self.persist()?;
        Ok(template)
    }

    pub fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => persist::write_json_atomic(path, &self.templates),
            None => Ok(()),
        }
    }
}

/// Blank structure items are dropped; at least one must remain.
pub fn validate_draft(
    name: &str,
    description: &str,
    structure: &[String],
    example: &str,
) -> Result<ChapterTemplate, ValidationError> {
    if name.trim().is_empty() || description.trim().is_empty() {
        return Err(ValidationError::IncompleteTemplate(
            "needs a name and a description",
        ));
    }
    let structure: Vec<String> = structure
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if structure.is_empty() {
        return Err(ValidationError::IncompleteTemplate(
            "needs at least one structure item",
        ));
    }

    Ok(ChapterTemplate {
        id: format!("custom_{}", Utc::now().timestamp_millis()),
        name: name.trim().to_owned(),
        description: description.trim().to_owned(),
        structure,
        example: example.to_owned(),
        custom: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_drops_blank_structure_items() -> anyhow::Result<()> {
        let mut custom = CustomTemplates::in_memory();
        let saved = custom.create(
            "Interview",
            "Question and answer format",
            &["Intro".to_owned(), "  ".to_owned(), "Q&A".to_owned()],
            "",
        )?;
        assert!(saved.id.starts_with("custom_"));
        assert_eq!(saved.structure, vec!["Intro", "Q&A"]);
        assert_eq!(custom.resolve(&saved.id), Some(saved));
        Ok(())
    }

    #[test]
    fn rejects_empty_structure() {
        let err = validate_draft("n", "d", &["".to_owned()], "").unwrap_err();
        assert_eq!(
            err,
            ValidationError::IncompleteTemplate("needs at least one structure item")
        );
    }

    #[test]
    fn rejects_missing_name() {
        assert!(validate_draft(" ", "d", &["x".to_owned()], "").is_err());
    }

    #[test]
    fn all_lists_builtins_then_custom() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("templates.json");
        let mut custom = CustomTemplates::open(&path)?;
        custom.create("Mine", "desc", &["One".to_owned()], "")?;

        let reopened = CustomTemplates::open(&path)?;
        let all = reopened.all();
        assert_eq!(all.len(), 10);
        assert!(all.last().is_some_and(|t| t.custom));
        Ok(())
    }
}
