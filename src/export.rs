//! Local file outputs: research documents (markdown, plain text, PDF via
//! pandoc), book source archives and downloaded build archives.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;
use std::process::Command;

use anyhow::Context as _;
use chrono::NaiveDate;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::formats::Book;
use crate::research::model::ResearchSession;
use crate::research::render::ResearchDocument;

pub const DEFAULT_PANDOC: &str = "pandoc";
const PDF_ENGINES: [&str; 2] = ["weasyprint", "tectonic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Md,
    Txt,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PandocOptions {
    pub pandoc: String,
    pub pdf_engine: Option<String>,
}

impl Default for PandocOptions {
    fn default() -> Self {
        Self {
            pandoc: DEFAULT_PANDOC.to_owned(),
            pdf_engine: None,
        }
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    Ok(())
}

/// Writes `contents`, refusing to replace an existing file unless `force`.
pub fn write_text(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("open output: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write output: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush output: {}", path.display()))?;
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write: {}", path.display()))
}

/// Flattens markdown to readable plain text: markup is dropped, block
/// structure becomes blank lines and list items become `- ` lines.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut depth = 0usize;
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("\n----------------------------------------\n\n"),
            Event::Start(Tag::List(_)) => depth += 1,
            Event::End(TagEnd::List(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                out.push_str("- ");
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::Paragraph) if depth > 0 => {}
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                out.push_str("\n\n")
            }
            Event::End(TagEnd::TableCell) => out.push('\t'),
            Event::End(TagEnd::TableRow | TagEnd::TableHead) => out.push('\n'),
            _ => {}
        }
    }
    let trimmed = out.trim_end();
    format!("{trimmed}\n")
}

/// Renders one research document and writes it to `out` in `format`.
pub fn export_research(
    session: &ResearchSession,
    document: ResearchDocument,
    format: ExportFormat,
    out: &Path,
    force: bool,
    pandoc: &PandocOptions,
    generated: NaiveDate,
) -> anyhow::Result<()> {
    let Some(markdown) = document.render(session, generated) else {
        anyhow::bail!(
            "nothing to export for {}; generate it first",
            document.file_stem()
        );
    };
    if out.exists() && !force {
        anyhow::bail!("export output already exists: {}", out.display());
    }

    tracing::info!(document = document.file_stem(), format = format.extension(), out = %out.display(), "export research");
    match format {
        ExportFormat::Md => write_text(out, &markdown, force),
        ExportFormat::Txt => write_text(out, &markdown_to_text(&markdown), force),
        ExportFormat::Pdf => {
            ensure_parent(out)?;
            markdown_to_pdf(&markdown, out, pandoc)
        }
    }
}

fn markdown_to_pdf(markdown: &str, out: &Path, options: &PandocOptions) -> anyhow::Result<()> {
    let mut input = tempfile::Builder::new()
        .prefix("liquidbooks-export-")
        .suffix(".md")
        .tempfile()
        .context("create temporary markdown")?;
    input
        .write_all(markdown.as_bytes())
        .context("write temporary markdown")?;
    input.flush().context("flush temporary markdown")?;

    let engines: Vec<&str> = match options.pdf_engine.as_deref() {
        Some(engine) => vec![engine],
        None => PDF_ENGINES.to_vec(),
    };

    let mut last_failure: Option<anyhow::Error> = None;
    for engine in engines {
        tracing::info!(pdf_engine = engine, pandoc = %options.pandoc, out = %out.display(), "export via pandoc");
        let args = pandoc_args(input.path(), out, engine);
        let output = match Command::new(&options.pandoc).args(&args).output() {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                anyhow::bail!(
                    "`{}` was not found; install pandoc or pass --pandoc <PATH>",
                    options.pandoc
                );
            }
            Err(err) => return Err(err).with_context(|| format!("run pandoc: {}", options.pandoc)),
        };
        if output.status.success() {
            return Ok(());
        }
        last_failure = Some(anyhow::anyhow!(
            "pandoc failed with pdf_engine={engine} ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    match last_failure {
        Some(err) => Err(err),
        None => anyhow::bail!("export pdf failed: no pdf engine candidates"),
    }
}

fn pandoc_args(input: &Path, out: &Path, engine: &str) -> Vec<OsString> {
    vec![
        input.as_os_str().to_owned(),
        OsString::from("-o"),
        out.as_os_str().to_owned(),
        OsString::from("--from"),
        OsString::from("gfm-tex_math_dollars"),
        OsString::from("--to"),
        OsString::from("pdf"),
        OsString::from("--pdf-engine"),
        OsString::from(engine),
    ]
}

/// Name of a chapter's source file inside an export archive.
pub fn chapter_file_name(position: usize) -> String {
    format!("chapter_{:02}.md", position + 1)
}

/// Zips the book's MyST sources: `intro.md` from the description and one
/// `chapter_NN.md` per chapter in reading order. Returns the entry count.
pub fn export_sources(book: &Book, out: &Path, force: bool) -> anyhow::Result<usize> {
    if out.exists() && !force {
        anyhow::bail!("export output already exists: {}", out.display());
    }
    ensure_parent(out)?;

    let file = File::create(out).with_context(|| format!("create zip: {}", out.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut intro = format!("# {}\n", book.title);
    if !book.author.trim().is_empty() {
        intro.push_str(&format!("\n*by {}*\n", book.author));
    }
    if !book.description.trim().is_empty() {
        intro.push_str(&format!("\n{}\n", book.description.trim()));
    }
    zip.start_file("intro.md", options)
        .context("zip start_file intro.md")?;
    zip.write_all(intro.as_bytes()).context("zip write intro.md")?;

    let mut chapters: Vec<_> = book.chapters.iter().collect();
    chapters.sort_by_key(|c| c.order);
    for (position, chapter) in chapters.iter().enumerate() {
        let name = chapter_file_name(position);
        let body = if chapter.content.trim_start().starts_with('#') {
            chapter.content.clone()
        } else {
            format!("# {}\n\n{}", chapter.title, chapter.content)
        };
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("zip start_file {name}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("zip write {name}"))?;
    }

    zip.finish().context("zip finish")?;
    let entries = chapters.len() + 1;
    tracing::info!(out = %out.display(), entries, "exported book sources");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use super::*;
    use crate::formats::Chapter;

    #[test]
    fn plain_text_drops_markup() {
        let md = "# Brand\n\nA **bold** promise.\n\n- one\n- two\n\nDone `now`.";
        let text = markdown_to_text(md);
        assert_eq!(text, "Brand\n\nA bold promise.\n\n- one\n- two\n\nDone now.\n");
    }

    #[test]
    fn write_text_refuses_to_clobber() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("nested/out.md");
        write_text(&path, "first", false)?;
        assert!(write_text(&path, "second", false).is_err());
        write_text(&path, "third", true)?;
        assert_eq!(std::fs::read_to_string(&path)?, "third");
        Ok(())
    }

    #[test]
    fn research_export_needs_content() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let out = temp.path().join("brand.md");
        let session = ResearchSession::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).ok_or_else(|| anyhow::anyhow!("date"))?;
        let err = export_research(
            &session,
            ResearchDocument::Brand,
            ExportFormat::Md,
            &out,
            false,
            &PandocOptions::default(),
            date,
        );
        assert!(err.is_err());
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn missing_pandoc_is_named() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let out = temp.path().join("brand.pdf");
        let session = ResearchSession {
            brand_identity: Some("# Brand".to_owned()),
            ..ResearchSession::default()
        };
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).ok_or_else(|| anyhow::anyhow!("date"))?;
        let err = export_research(
            &session,
            ResearchDocument::Brand,
            ExportFormat::Pdf,
            &out,
            false,
            &PandocOptions {
                pandoc: "liquidbooks-no-such-pandoc".to_owned(),
                pdf_engine: None,
            },
            date,
        )
        .err()
        .ok_or_else(|| anyhow::anyhow!("expected failure"))?;
        assert!(err.to_string().contains("liquidbooks-no-such-pandoc"));
        Ok(())
    }

    #[test]
    fn sources_archive_has_intro_and_ordered_chapters() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let out = temp.path().join("sources.zip");
        let mut book = Book::new("Async Rust", "Ferris");
        book.description = "Futures, explained.".to_owned();
        for (order, title, content) in [(1, "Second", "Body two"), (0, "First", "# First\n\nBody one")] {
            book.chapters.push(Chapter {
                id: title.to_lowercase(),
                title: title.to_owned(),
                content: content.to_owned(),
                order,
                ..Chapter::default()
            });
        }

        assert_eq!(export_sources(&book, &out, false)?, 3);

        let mut archive = zip::ZipArchive::new(File::open(&out)?)?;
        let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
        names.sort();
        assert_eq!(names, vec!["chapter_01.md", "chapter_02.md", "intro.md"]);

        let mut second = String::new();
        archive.by_name("chapter_02.md")?.read_to_string(&mut second)?;
        assert_eq!(second, "# Second\n\nBody two");
        Ok(())
    }
}
