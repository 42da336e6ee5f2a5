use anyhow::Context as _;

use crate::cli::{BookCommand, PublishingArgs};
use crate::commands::Workspace;
use crate::commands::chapter::print_chapters;
use crate::error::ValidationError;
use crate::formats::{Book, BookPatch, ChapterPatch, Collaborator, LegalClauses, PublishingInfo};
use crate::workflow::chapters;

pub fn run(ws: &Workspace, command: BookCommand) -> anyhow::Result<()> {
    let mut store = ws.books()?;
    match command {
        BookCommand::Show => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            println!("# {}", book.title);
            println!("by {}", book.author);
            if !book.description.is_empty() {
                println!("\n{}", book.description);
            }
            let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_owned());
            println!(
                "\ntype: {}  tone: {}  audience: {}  template: {}",
                field(&book.book_type),
                field(&book.tone),
                field(&book.target_audience),
                field(&book.chapter_template)
            );
            println!("features: {}", book.enabled_features.join(", "));
            println!(
                "artifacts: {}  enhancements: {}\n",
                store.artifacts().len(),
                store.enhancements().len()
            );
            print_chapters(book);
        }
        BookCommand::Set {
            title,
            author,
            description,
            from,
            force,
        } => {
            if !force && let Some(existing) = store.book() {
                anyhow::bail!(
                    "book \"{}\" is already loaded; pass --force to replace it",
                    existing.title
                );
            }
            let book = match from {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("read {}", path.display()))?;
                    serde_json::from_str::<Book>(&raw)
                        .with_context(|| format!("parse book {}", path.display()))?
                }
                None => new_book(title.as_deref(), author.as_deref(), description)?,
            };
            let title = book.title.clone();
            store.set_book(book)?;
            println!("loaded book \"{title}\"");
        }
        BookCommand::Clear => {
            store.clear_book()?;
            println!("book cleared");
        }
        BookCommand::Publishing(args) => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let (info, legal) = publishing(book, args)?;
            store.update_book(BookPatch {
                publishing_info: Some(info),
                legal_clauses: Some(legal),
                ..BookPatch::default()
            })?;
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let json = serde_json::to_string_pretty(&(&book.publishing_info, &book.legal_clauses))
                .context("serialize publishing settings")?;
            println!("{json}");
        }
        BookCommand::AddChapter { title } => {
            let id = store
                .add_chapter(ChapterPatch {
                    title,
                    ..ChapterPatch::default()
                })?
                .ok_or(ValidationError::NoBook)?;
            println!("added chapter {id}");
        }
        BookCommand::DeleteChapter { chapter } => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let found = chapters::find_chapter(book, &chapter)?;
            let (id, title) = (found.id.clone(), found.title.clone());
            store.delete_chapter(&id)?;
            println!("deleted \"{title}\"");
        }
        BookCommand::MoveChapter { chapter, to } => {
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let id = chapters::find_chapter(book, &chapter)?.id.clone();
            store.move_chapter(&id, to.max(1) - 1)?;
            let book = store.book().ok_or(ValidationError::NoBook)?;
            print_chapters(book);
        }
    }
    Ok(())
}

fn new_book(
    title: Option<&str>,
    author: Option<&str>,
    description: Option<String>,
) -> Result<Book, ValidationError> {
    let field = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned);
    let (Some(title), Some(author)) = (field(title), field(author)) else {
        return Err(ValidationError::MissingTitleOrAuthor);
    };
    let mut book = Book::new(title, author);
    book.description = description.unwrap_or_default();
    Ok(book)
}

/// Merges flags over the book's current settings, or the defaults when unset.
fn publishing(book: &Book, args: PublishingArgs) -> anyhow::Result<(PublishingInfo, LegalClauses)> {
    let mut info = book
        .publishing_info
        .clone()
        .unwrap_or_else(|| PublishingInfo::defaults_for(&book.author));
    let mut legal = book.legal_clauses.clone().unwrap_or_default();
    let text = |v: String| Some(v).filter(|s| !s.trim().is_empty());

    if let Some(v) = args.pen_name {
        info.pen_name = v;
    }
    if let Some(hide) = args.hide_author_name {
        info.show_author_name = !hide;
    }
    if let Some(v) = args.edition {
        info.edition = v;
    }
    if let Some(v) = args.year {
        info.year_of_publication = v;
    }
    if let Some(v) = args.publisher {
        info.publisher_name = v;
    }
    let isbns = &mut info.isbns;
    for (slot, value) in [
        (&mut isbns.epub, args.isbn_epub),
        (&mut isbns.kindle, args.isbn_kindle),
        (&mut isbns.paperback, args.isbn_paperback),
        (&mut isbns.hardcover, args.isbn_hardcover),
        (&mut isbns.pdf, args.isbn_pdf),
    ] {
        if let Some(v) = value {
            *slot = text(v);
        }
    }
    if !args.collaborators.is_empty() {
        info.collaborators = args
            .collaborators
            .iter()
            .map(|raw| parse_collaborator(raw))
            .collect::<anyhow::Result<_>>()?;
    }
    for (slot, value) in [
        (&mut info.epigraph, args.epigraph),
        (&mut info.foreword, args.foreword),
        (&mut info.dedication, args.dedication),
        (&mut info.preface, args.preface),
        (&mut info.acknowledgements, args.acknowledgements),
        (&mut info.about_the_author, args.about_the_author),
        (&mut info.also_by_the_author, args.also_by_the_author),
    ] {
        if let Some(v) = value {
            *slot = text(v);
        }
    }

    for (slot, value) in [
        (&mut legal.all_rights_reserved, args.all_rights_reserved),
        (&mut legal.fiction, args.fiction),
        (&mut legal.moral_rights, args.moral_rights),
        (&mut legal.external_content, args.external_content),
        (&mut legal.designations, args.designations),
    ] {
        if let Some(v) = value {
            *slot = v;
        }
    }
    if let Some(v) = args.additional_clauses {
        legal.additional_clauses = text(v);
    }
    Ok((info, legal))
}

fn parse_collaborator(raw: &str) -> anyhow::Result<Collaborator> {
    match raw.split_once('=') {
        Some((role, name)) if !role.trim().is_empty() && !name.trim().is_empty() => {
            Ok(Collaborator {
                role: role.trim().to_owned(),
                name: name.trim().to_owned(),
            })
        }
        _ => anyhow::bail!("collaborator must look like role=name: {raw}"),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;
    use crate::cli::{Cli, Command};

    fn publishing_args(argv: &[&str]) -> anyhow::Result<PublishingArgs> {
        let mut full = vec!["liquidbooks", "book", "publishing"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full)?.command {
            Command::Book {
                command: BookCommand::Publishing(args),
            } => Ok(args),
            other => anyhow::bail!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn new_book_needs_title_and_author() {
        assert_eq!(
            new_book(Some("Title"), Some("  "), None).unwrap_err(),
            ValidationError::MissingTitleOrAuthor
        );
        assert!(new_book(Some("Title"), Some("Ada"), None).is_ok());
    }

    #[test]
    fn publishing_starts_from_defaults() -> anyhow::Result<()> {
        let book = Book::new("Rust at Scale", "Ada");
        let args = publishing_args(&[
            "--edition",
            "Second edition",
            "--isbn-epub",
            "978-1",
            "--collaborator",
            "Editor=Grace",
            "--fiction",
            "true",
        ])?;
        let (info, legal) = publishing(&book, args)?;
        assert_eq!(info.pen_name, "Ada");
        assert!(info.show_author_name);
        assert_eq!(info.edition, "Second edition");
        assert_eq!(info.isbns.epub.as_deref(), Some("978-1"));
        assert_eq!(info.collaborators[0].name, "Grace");
        assert!(legal.fiction);
        assert!(legal.all_rights_reserved);
        Ok(())
    }

    #[test]
    fn blank_text_clears_a_field() -> anyhow::Result<()> {
        let mut book = Book::new("T", "A");
        let mut info = PublishingInfo::defaults_for("A");
        info.dedication = Some("For Sam".to_owned());
        book.publishing_info = Some(info);
        let (info, _) = publishing(&book, publishing_args(&["--dedication", ""])?)?;
        assert_eq!(info.dedication, None);
        Ok(())
    }

    #[test]
    fn malformed_collaborator_is_rejected() {
        assert!(parse_collaborator("Grace").is_err());
        assert!(parse_collaborator("=Grace").is_err());
    }
}
