use anyhow::Context as _;

use crate::catalog::templates::{self, ChapterTemplate};
use crate::cli::TemplateCommand;
use crate::commands::Workspace;
use crate::error::ValidationError;
use crate::workflow;

pub async fn run(ws: &Workspace, command: TemplateCommand) -> anyhow::Result<()> {
    let mut custom = ws.templates()?;
    match command {
        TemplateCommand::List => {
            for template in custom.all() {
                let kind = if template.custom { "custom" } else { "built-in" };
                println!(
                    "{}\t{}\t[{kind}]\t{}",
                    template.id, template.name, template.description
                );
            }
        }
        TemplateCommand::Show { id } => {
            let template = custom
                .resolve(&id)
                .ok_or(ValidationError::UnknownTemplate(id))?;
            print_template(&template);
        }
        TemplateCommand::Create {
            name,
            description,
            sections,
            example_file,
        } => {
            let example = match example_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?,
                None => String::new(),
            };
            let saved = custom.create(&name, &description, &sections, &example)?;
            println!("created template {}", saved.id);
        }
        TemplateCommand::Generate { description } => {
            let backend = ws.backend()?;
            let saved =
                workflow::templates::generate(&mut custom, &backend, &description, ws.retry())
                    .await?;
            print_template(&saved);
            println!("\ncreated template {}", saved.id);
        }
        TemplateCommand::Delete { id } => {
            if templates::is_builtin(&id) {
                anyhow::bail!("{id} is a built-in template and cannot be deleted");
            }
            if !custom.delete(&id)? {
                return Err(ValidationError::UnknownTemplate(id).into());
            }
            println!("deleted template {id}");
        }
    }
    Ok(())
}

fn print_template(template: &ChapterTemplate) {
    println!("{} ({})", template.name, template.id);
    println!("{}\n", template.description);
    for (idx, section) in template.structure.iter().enumerate() {
        println!("{}. {section}", idx + 1);
    }
    if !template.example.trim().is_empty() {
        println!("\n{}", template.example.trim_end());
    }
}
