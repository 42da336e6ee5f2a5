use std::path::Path;

use anyhow::Context as _;

use crate::cli::PublishCommand;
use crate::commands::Workspace;
use crate::error::ValidationError;
use crate::formats::{BuildResult, Enhancement};
use crate::store::BookStore;
use crate::workflow::assembler;
use crate::{export, preview};

pub async fn run(ws: &Workspace, command: PublishCommand) -> anyhow::Result<()> {
    match command {
        PublishCommand::Enhance => {
            let mut store = ws.books()?;
            let backend = ws.backend()?;
            let count = assembler::enhance(&mut store, &backend, ws.retry()).await?;
            for enhancement in store.enhancements() {
                print_enhancement(enhancement);
            }
            println!("{count} chapter(s) enhanced; chapter content was not changed");
        }
        PublishCommand::Build { download, out } => {
            let mut store = ws.books()?;
            let backend = ws.backend()?;
            let result = assembler::publish(&mut store, &backend, None).await?;
            print_result(&result);
            if download {
                let build_dir = result
                    .build_dir
                    .as_deref()
                    .context("backend reported no build directory to download")?;
                save_archive(ws, &store, build_dir, out.as_deref()).await?;
            }
        }
        PublishCommand::Download { build_dir, out } => {
            let store = ws.books()?;
            save_archive(ws, &store, &build_dir, out.as_deref()).await?;
        }
        PublishCommand::Deploy {
            github_username,
            github_token,
            repo,
        } => {
            let target = assembler::github_target(
                github_username.as_deref(),
                github_token.as_deref(),
                repo.as_deref(),
            )?;
            let mut store = ws.books()?;
            let backend = ws.backend()?;
            let result = assembler::publish(&mut store, &backend, Some(target)).await?;
            print_result(&result);
        }
        PublishCommand::Preview { archive, addr } => {
            preview::serve(&archive, addr)
                .await
                .with_context(|| format!("preview {}", archive.display()))?;
        }
        PublishCommand::ExportSources { out, force } => {
            let store = ws.books()?;
            let book = store.book().ok_or(ValidationError::NoBook)?;
            let entries = export::export_sources(book, &out, force)?;
            println!("wrote {entries} file(s) to {}", out.display());
        }
    }
    Ok(())
}

async fn save_archive(
    ws: &Workspace,
    store: &BookStore,
    build_dir: &str,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let title = store.book().map(|b| b.title.as_str()).unwrap_or_default();
    let cwd = std::env::current_dir().context("read current directory")?;
    let backend = ws.backend()?;
    let path = assembler::download(&backend, build_dir, title, out, &cwd).await?;
    println!("saved {}", path.display());
    Ok(())
}

fn print_result(result: &BuildResult) {
    println!("{}", result.message);
    if let Some(url) = &result.url {
        println!("url: {url}");
    }
    if let Some(dir) = &result.build_dir {
        println!("build dir: {dir}");
    }
}

fn print_enhancement(enhancement: &Enhancement) {
    let e = &enhancement.enhancements;
    println!(
        "## Chapter {}: {}",
        enhancement.chapter_number, enhancement.chapter_title
    );
    if !e.chapter_transition.is_empty() {
        println!("transition: {}", e.chapter_transition);
    }
    if !e.forward_hook.is_empty() {
        println!("forward hook: {}", e.forward_hook);
    }
    for xref in &e.cross_references {
        println!("- see {} at {}: {}", xref.reference_to, xref.location, xref.reason);
    }
    for term in &e.glossary_terms {
        println!("- glossary {}: {}", term.term, term.definition);
    }
    for callout in &e.callouts {
        println!("- {} at {}: {}", callout.kind, callout.location, callout.content);
    }
    for code in &e.code_enhancements {
        println!("- code at {}: {}", code.location, code.suggestion);
    }
    println!();
}
