use crate::cli::ArtifactsCommand;
use crate::commands::Workspace;
use crate::error::ValidationError;
use crate::formats::{Artifact, ArtifactKind};
use crate::workflow::assembler::{self, ArtifactFilter};

pub async fn run(ws: &Workspace, command: ArtifactsCommand) -> anyhow::Result<()> {
    let mut store = ws.books()?;
    match command {
        ArtifactsCommand::Generate => {
            let backend = ws.backend()?;
            let count = assembler::generate_artifacts(&mut store, &backend, ws.retry()).await?;
            println!("generated {count} artifact prompt(s)");
        }
        ArtifactsCommand::List {
            chapter,
            kind,
            category,
            search,
        } => {
            let filter = ArtifactFilter {
                chapter,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                category,
                search,
            };
            let found = assembler::filter_artifacts(store.artifacts(), &filter);
            for artifact in &found {
                print_artifact(artifact);
            }
            println!("{} of {} artifact(s)", found.len(), store.artifacts().len());
        }
        ArtifactsCommand::Summary => {
            let summary = assembler::summarize_artifacts(store.artifacts());
            println!("total: {}", summary.total);
            for (kind, count) in &summary.by_kind {
                println!("  {kind}: {count}");
            }
            for (category, count) in &summary.by_category {
                println!("  [{category}]: {count}");
            }
        }
        ArtifactsCommand::Delete { id } => {
            if !store.artifacts().iter().any(|a| a.id == id) {
                anyhow::bail!("unknown artifact: {id}");
            }
            store.delete_artifact(&id)?;
            println!("deleted artifact {id}");
        }
        ArtifactsCommand::Clear => {
            store.clear_artifacts()?;
            println!("artifacts cleared");
        }
    }
    Ok(())
}

fn parse_kind(value: &str) -> Result<ArtifactKind, ValidationError> {
    ArtifactKind::ALL
        .into_iter()
        .find(|k| k.as_str() == value)
        .ok_or_else(|| ValidationError::UnknownCatalogValue {
            kind: "artifact type",
            value: value.to_owned(),
        })
}

fn print_artifact(artifact: &Artifact) {
    println!(
        "{}\tch {}\t{}\t[{}]\t{}",
        artifact.id,
        artifact.chapter_number,
        artifact.kind.as_str(),
        artifact.category,
        artifact.title
    );
    if !artifact.description.is_empty() {
        println!("    {}", artifact.description);
    }
    if let Some(prompt) = &artifact.prompt {
        println!("    prompt: {prompt}");
    }
    if let Some(tool) = &artifact.tool_info {
        match &tool.url {
            Some(url) => println!("    tool: {} ({url})", tool.name),
            None => println!("    tool: {}", tool.name),
        }
    }
    if let Some(placement) = &artifact.placement_guideline {
        println!("    placement: {placement}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!(parse_kind("diagram"), Ok(ArtifactKind::Diagram));
        assert!(parse_kind("hologram").is_err());
    }
}
