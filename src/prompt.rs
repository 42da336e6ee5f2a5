//! Local reconstruction of the prompts a chapter generation will use, so they
//! can be inspected and tuned before anything is sent.

use std::fmt::Write as _;

use crate::backend::wire::ChapterRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPrompts {
    pub system_prompt: String,
    pub user_prompt: String,
}

pub fn chapter_prompts(request: &ChapterRequest) -> ChapterPrompts {
    ChapterPrompts {
        system_prompt: system_prompt(request),
        user_prompt: user_prompt(request),
    }
}

fn system_prompt(r: &ChapterRequest) -> String {
    let mut out = format!("You are an expert at writing {} content.\n\n", r.book_type);

    let _ = writeln!(out, "CHAPTER TEMPLATE: {}", r.chapter_template);
    out.push_str("Follow this structure for the chapter:\n");
    for item in &r.template_structure {
        let _ = writeln!(out, "- {item}");
    }

    out.push_str("\nENABLED JUPYTER BOOK FEATURES:\n");
    out.push_str("Use these features appropriately throughout the chapter:\n");
    let _ = writeln!(out, "{}", r.enabled_features.join(", "));

    out.push_str("\nCONTINUITY CONTEXT:\n");
    match &r.previous_chapter_title {
        Some(title) => {
            let _ = writeln!(out, "Previous Chapter: {title}");
        }
        None => out.push_str("This is the first chapter\n"),
    }
    if let Some(connection) = &r.connection_to_previous {
        let _ = writeln!(out, "Connection from Previous: {connection}");
    }
    match &r.next_chapter_title {
        Some(title) => {
            let _ = writeln!(out, "Next Chapter: {title}");
        }
        None => out.push_str("This is the final chapter\n"),
    }
    if let Some(connection) = &r.connection_to_next {
        let _ = writeln!(out, "Connection to Next: {connection}");
    }

    let _ = write!(
        out,
        "\nWrite in {} tone for {} audience.\nTarget approximately {} words.",
        r.tone, r.target_audience, r.estimated_words
    );
    out
}

fn user_prompt(r: &ChapterRequest) -> String {
    let mut out = String::from("Write the complete content for this chapter:\n\n");
    let _ = write!(
        out,
        "CHAPTER {}: {}\n\nDESCRIPTION:\n{}\n\n",
        r.chapter_number, r.chapter_title, r.chapter_description
    );

    out.push_str("LEARNING OBJECTIVES:\n");
    for objective in &r.learning_objectives {
        let _ = writeln!(out, "- {objective}");
    }

    let _ = write!(
        out,
        "\nSUGGESTED COMPONENTS TO INCLUDE:\n{}\n\n",
        r.suggested_components.join(", ")
    );
    let _ = writeln!(out, "Follow the {} template structure.", r.chapter_template);
    out.push_str("Use MyST Markdown syntax with appropriate Jupyter Book features.\n");
    out.push_str("Make it engaging, clear, and valuable for the target audience.");

    if let Some(extra) = r.additional_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(out, "\n\nADDITIONAL REQUIREMENTS:\n{extra}");
    }

    out.push_str(
        "\n\nReturn ONLY the chapter content in MyST Markdown format, starting with the chapter title as # heading.",
    );
    out
}
