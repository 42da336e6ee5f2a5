use anyhow::Context as _;

use crate::backend::wire::{TemplateDraft, TemplateRequest};
use crate::backend::{AuthoringBackend, RetryPolicy};
use crate::catalog::templates::ChapterTemplate;
use crate::store::CustomTemplates;

/// Asks the backend to draft a chapter template from a description, then
/// validates and saves it like a hand-written one.
pub async fn generate(
    templates: &mut CustomTemplates,
    backend: &dyn AuthoringBackend,
    description: &str,
    retry: RetryPolicy,
) -> anyhow::Result<ChapterTemplate> {
    if description.trim().is_empty() {
        anyhow::bail!("describe the template you want first");
    }
    let request = TemplateRequest {
        description: description.trim().to_owned(),
    };
    let draft: TemplateDraft = retry
        .run("generate template", || backend.generate_template(&request))
        .await
        .context("generate template")?;
    tracing::info!(name = %draft.name, sections = draft.structure.len(), "template drafted");

    templates.create(&draft.name, &draft.description, &draft.structure, &draft.example)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::scripted::ScriptedBackend;
    use crate::backend::wire;

    #[tokio::test]
    async fn drafted_template_is_saved() -> anyhow::Result<()> {
        let mut templates = CustomTemplates::in_memory();
        let backend = ScriptedBackend::default();
        backend.template.ok(TemplateDraft {
            name: "Interview".to_owned(),
            description: "Q&A with an expert".to_owned(),
            structure: vec!["Guest intro".to_owned(), "".to_owned(), "Questions".to_owned()],
            example: String::new(),
        });

        let saved = generate(&mut templates, &backend, "interview style", RetryPolicy::none()).await?;
        assert_eq!(saved.structure, vec!["Guest intro", "Questions"]);
        assert!(templates.resolve(&saved.id).is_some());
        assert_eq!(
            backend.requests(wire::GENERATE_TEMPLATE)[0]["description"],
            "interview style"
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_draft_is_rejected() -> anyhow::Result<()> {
        let mut templates = CustomTemplates::in_memory();
        let backend = ScriptedBackend::default();
        backend.template.ok(TemplateDraft::default());
        assert!(
            generate(&mut templates, &backend, "anything", RetryPolicy::none())
                .await
                .is_err()
        );
        assert!(templates.templates().is_empty());
        Ok(())
    }
}
