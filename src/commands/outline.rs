use std::path::Path;

use anyhow::Context as _;

use crate::catalog::features::FeatureCategory;
use crate::cli::{OutlineBookArgs, OutlineChapterArgs, OutlineCommand};
use crate::commands::Workspace;
use crate::commands::settings::parse_preset;
use crate::error::ValidationError;
use crate::workflow::outline::{ChapterOutlinePatch, OutlineBookPatch, OutlineDraft};

pub fn run(ws: &Workspace, command: OutlineCommand) -> anyhow::Result<()> {
    let path = ws.config.outline_path();
    if let OutlineCommand::Discard = command {
        OutlineDraft::discard(&path)?;
        println!("outline discarded");
        return Ok(());
    }

    let mut draft = load(&path)?;
    match command {
        OutlineCommand::Show => {
            print_draft(&draft);
            return Ok(());
        }
        OutlineCommand::EditBook(args) => draft.edit_book(book_patch(args)),
        OutlineCommand::EditChapter(args) => {
            let number = args.number;
            let patch = chapter_patch(ws, args)?;
            draft.edit_chapter(number, patch)?;
        }
        OutlineCommand::AddChapter => {
            let number = draft.add_chapter();
            println!("added chapter {number}");
        }
        OutlineCommand::DeleteChapter { number } => {
            let removed = draft.delete_chapter(number)?;
            println!("deleted chapter {number}: {}", removed.title);
        }
        OutlineCommand::MoveChapter { number, to } => draft.move_chapter(number, to)?,
        OutlineCommand::Feature {
            ids,
            category,
            reset,
        } => {
            if reset {
                draft.reset_features();
            }
            if let Some(category) = category {
                let parsed = FeatureCategory::parse(&category).ok_or(
                    ValidationError::UnknownCatalogValue {
                        kind: "feature category",
                        value: category,
                    },
                )?;
                draft.toggle_category(parsed);
            }
            for id in crate::commands::split_ids(&ids) {
                let on = draft.toggle_feature(&id)?;
                println!("{id}: {}", if on { "on" } else { "off" });
            }
        }
        OutlineCommand::Preset { name } => draft.apply_preset(parse_preset(&name)?),
        OutlineCommand::Template { id } => {
            let template = ws
                .templates()?
                .resolve(&id)
                .ok_or(ValidationError::UnknownTemplate(id))?;
            draft.set_template(&template);
        }
        OutlineCommand::Accept { force } => {
            let mut store = ws.books()?;
            if !force && let Some(existing) = store.book() {
                anyhow::bail!(
                    "book \"{}\" is already loaded; pass --force to replace it",
                    existing.title
                );
            }
            let book = draft.accept()?;
            let chapters = book.chapters.len();
            let title = book.title.clone();
            store.set_book(book)?;
            store.clear_enhancements()?;
            store.clear_artifacts()?;
            OutlineDraft::discard(&path)?;
            tracing::info!(%title, chapters, "outline accepted");
            println!("created book \"{title}\" with {chapters} chapter(s)");
            return Ok(());
        }
        OutlineCommand::Discard => {}
    }

    draft
        .save(&path)
        .with_context(|| format!("save outline {}", path.display()))?;
    print_draft(&draft);
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<OutlineDraft> {
    OutlineDraft::load(path)?.ok_or_else(|| ValidationError::NoOutline.into())
}

fn book_patch(args: OutlineBookArgs) -> OutlineBookPatch {
    OutlineBookPatch {
        title: args.title,
        description: args.description,
        author: args.author,
        target_audience: args.audience,
        theme: args.theme,
    }
}

fn chapter_patch(ws: &Workspace, args: OutlineChapterArgs) -> anyhow::Result<ChapterOutlinePatch> {
    if let Some(id) = args.template.as_deref().filter(|id| !id.is_empty())
        && ws.templates()?.resolve(id).is_none()
    {
        return Err(ValidationError::UnknownTemplate(id.to_owned()).into());
    }
    let list = |v: Vec<String>| (!v.is_empty()).then_some(v);
    Ok(ChapterOutlinePatch {
        title: args.title,
        description: args.description,
        learning_objectives: list(args.objectives),
        suggested_components: list(args.components),
        connection_to_previous: args.connection_to_previous,
        connection_to_next: args.connection_to_next,
        estimated_words: args.words,
        target_pages: args.pages,
        chapter_template: args.template,
    })
}

pub(crate) fn print_draft(draft: &OutlineDraft) {
    let meta = &draft.outline.book;
    println!("# {}", meta.title);
    if !meta.author.is_empty() {
        println!("by {}", meta.author);
    }
    if !meta.description.is_empty() {
        println!("\n{}", meta.description);
    }
    println!(
        "\ntype: {}  tone: {}  audience: {}",
        meta.book_type, meta.tone, meta.target_audience
    );
    if !draft.outline.structure_explanation.is_empty() {
        println!("\n{}", draft.outline.structure_explanation);
    }
    println!();
    for chapter in draft.chapters() {
        let template = chapter
            .chapter_template
            .as_deref()
            .map(|t| format!(" [{t}]"))
            .unwrap_or_default();
        println!(
            "{:>2}. {} (~{} words){template}",
            chapter.chapter_number, chapter.title, chapter.estimated_words
        );
        if !chapter.description.is_empty() {
            println!("    {}", chapter.description);
        }
        for objective in &chapter.learning_objectives {
            println!("    - {objective}");
        }
    }
    println!(
        "\n{} chapter(s), ~{} words, ~{} pages",
        draft.chapters().len(),
        draft.total_words(),
        draft.estimated_pages()
    );
    println!("template: {}", draft.chapter_template);
    println!(
        "features ({}): {}",
        draft.enabled_features.len(),
        draft.enabled_features.join(", ")
    );
}
