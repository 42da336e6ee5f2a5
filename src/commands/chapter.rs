use std::io::Read as _;
use std::path::Path;

use anyhow::Context as _;

use crate::catalog::features::FeatureCategory;
use crate::cli::{ChapterCommand, GenerateArgs};
use crate::commands::settings::parse_preset;
use crate::commands::{Workspace, split_ids};
use crate::error::ValidationError;
use crate::formats::Book;
use crate::workflow::chapters::{self, GenerateOptions};

pub async fn run(ws: &Workspace, command: ChapterCommand) -> anyhow::Result<()> {
    let mut store = ws.books()?;
    match command {
        ChapterCommand::List => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            print_chapters(book);
        }
        ChapterCommand::Show { chapter } => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let chapter = chapters::find_chapter(book, &chapter)?;
            println!("{} [{}] ({})", chapter.title, chapter.status.as_str(), chapter.id);
            if let Some(description) = &chapter.description {
                println!("{description}");
            }
            for objective in &chapter.learning_objectives {
                println!("- {objective}");
            }
            println!(
                "features: {}",
                chapters::effective_features(book, chapter).join(", ")
            );
            println!("\n{}", chapter.content);
        }
        ChapterCommand::Generate(args) => {
            let templates = ws.templates()?;
            let backend = ws.backend()?;
            let options = options(&args);
            let id = chapters::generate(
                &mut store,
                &backend,
                &templates,
                &args.chapter,
                &options,
                ws.retry(),
            )
            .await?;
            let book = store.book().ok_or(ValidationError::NoBook)?;
            if let Some(chapter) = book.chapter(&id) {
                println!(
                    "generated \"{}\" ({} words, draft)",
                    chapter.title,
                    chapter.content.split_whitespace().count()
                );
            }
        }
        ChapterCommand::Prompt(args) => {
            let templates = ws.templates()?;
            let prompts = chapters::preview_prompts(&store, &args.chapter, &templates, &options(&args))?;
            println!("## System prompt\n\n{}\n", prompts.system_prompt.trim_end());
            println!("## User prompt\n\n{}", prompts.user_prompt.trim_end());
        }
        ChapterCommand::Edit { chapter, file } => {
            let content = read_content(&file)?;
            let id = chapters::edit(&mut store, &chapter, &content)?;
            println!("saved {id} as draft");
        }
        ChapterCommand::Complete { chapter } => {
            let next = chapters::complete(&mut store, &chapter)?;
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let (done, total) = chapters::completion(book);
            println!("{done}/{total} chapters complete");
            match next.as_deref().and_then(|id| book.chapter(id)) {
                Some(next) => println!("next: {} ({})", next.title, next.id),
                None if done == total => println!("every chapter is complete; ready to publish"),
                None => {}
            }
        }
        ChapterCommand::Features {
            chapter,
            ids,
            preset,
            category,
        } => {
            let preset = preset.as_deref().map(parse_preset).transpose()?;
            let category = category
                .map(|c| {
                    FeatureCategory::parse(&c)
                        .ok_or(ValidationError::UnknownCatalogValue {
                            kind: "feature category",
                            value: c,
                        })
                })
                .transpose()?;
            let ids = split_ids(&ids);
            let enabled = chapters::set_features(&mut store, &chapter, |selection| {
                if let Some(preset) = preset {
                    selection.apply_preset(preset);
                }
                if let Some(category) = category {
                    selection.toggle_category(category);
                }
                for id in &ids {
                    selection.toggle(id)?;
                }
                Ok(())
            })?;
            println!("features ({}): {}", enabled.len(), enabled.join(", "));
        }
    }
    Ok(())
}

fn options(args: &GenerateArgs) -> GenerateOptions {
    GenerateOptions {
        additional_instructions: args.instructions.clone(),
        word_count: args.words,
    }
}

fn read_content(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("read stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

pub(crate) fn print_chapters(book: &Book) {
    for (idx, chapter) in chapters::ordered(book).into_iter().enumerate() {
        println!(
            "{:>2}. [{:<11}] {}\t{} words\t{}",
            idx + 1,
            chapter.status.as_str(),
            chapter.title,
            chapter.content.split_whitespace().count(),
            chapter.id
        );
    }
    let (done, total) = chapters::completion(book);
    println!("{done}/{total} complete, {} words", book.word_count());
}
