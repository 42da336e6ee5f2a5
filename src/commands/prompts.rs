use crate::cli::PromptsCommand;
use crate::commands::Workspace;
use crate::store::prompts::{PromptDraft, PromptUpdate, PromptVars};

pub fn run(ws: &Workspace, command: PromptsCommand) -> anyhow::Result<()> {
    let mut library = ws.prompts()?;
    match command {
        PromptsCommand::List => {
            for template in library.templates() {
                println!(
                    "{}\t{}\t{}\tupdated {}",
                    template.id,
                    template.name,
                    template.description,
                    template.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        PromptsCommand::Show { id } => {
            let template = library.get(&id).ok_or_else(|| unknown(&id))?;
            println!("{} ({})", template.name, template.id);
            println!("{}\n", template.description);
            println!("## System prompt\n\n{}\n", template.system_prompt);
            println!("## User prompt template\n\n{}", template.user_prompt_template);
        }
        PromptsCommand::Add {
            name,
            description,
            system_prompt,
            user_prompt,
        } => {
            if name.trim().is_empty() {
                anyhow::bail!("prompt name must not be empty");
            }
            let saved = library.save(PromptDraft {
                name: name.trim(),
                description: &description,
                system_prompt: &system_prompt,
                user_prompt_template: &user_prompt,
            })?;
            println!("saved prompt {}", saved.id);
        }
        PromptsCommand::Update {
            id,
            name,
            description,
            system_prompt,
            user_prompt,
        } => {
            let update = PromptUpdate {
                name,
                description,
                system_prompt,
                user_prompt_template: user_prompt,
            };
            if !library.update(&id, update)? {
                return Err(unknown(&id));
            }
            println!("updated prompt {id}");
        }
        PromptsCommand::Delete { id } => {
            if !library.delete(&id)? {
                return Err(unknown(&id));
            }
            println!("deleted prompt {id}");
        }
        PromptsCommand::Duplicate { id } => {
            let copy = library.duplicate(&id)?.ok_or_else(|| unknown(&id))?;
            println!("created {} ({})", copy.name, copy.id);
        }
        PromptsCommand::Seed => {
            let added = library.seed_defaults()?;
            println!("added {added} prompt(s)");
        }
        PromptsCommand::Render {
            id,
            topic,
            audience,
            chapter_title,
            objectives,
        } => {
            let template = library.get(&id).ok_or_else(|| unknown(&id))?;
            println!(
                "{}",
                template.render_user_prompt(&PromptVars {
                    topic: &topic,
                    audience: &audience,
                    chapter_title: &chapter_title,
                    learning_objectives: &objectives,
                })
            );
        }
    }
    Ok(())
}

fn unknown(id: &str) -> anyhow::Error {
    anyhow::anyhow!("unknown prompt template: {id}")
}
