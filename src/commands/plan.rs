use std::path::Path;

use anyhow::Context as _;

use crate::cli::{PlanArgs, PlanCommand, PlanOutlineArgs};
use crate::commands::settings::feature_choice;
use crate::commands::{Workspace, outline};
use crate::workflow::outline::OutlineDraft;
use crate::workflow::planner::{self, PlanRequest, PromptOverrides, ToneSpec};

pub async fn run(ws: &Workspace, command: PlanCommand) -> anyhow::Result<()> {
    match command {
        PlanCommand::Preview(args) => {
            let request = plan_request(&args);
            let backend = ws.backend()?;
            let preview = planner::preview_prompt(&backend, &request).await?;
            println!("## System prompt\n\n{}\n", preview.system_prompt.trim_end());
            println!("## User prompt\n\n{}", preview.user_prompt.trim_end());
            if let Some(tokens) = preview.estimated_tokens {
                println!("\nestimated tokens: {tokens}");
            }
            if let Some(cost) = preview.estimated_cost {
                println!("estimated cost: ${cost:.4}");
            }
        }
        PlanCommand::Outline(args) => generate(ws, args).await?,
    }
    Ok(())
}

fn plan_request(args: &PlanArgs) -> PlanRequest {
    PlanRequest {
        topic: args.topic.clone(),
        book_type: args.book_type.clone(),
        tone: ToneSpec::from_parts(&args.tone, args.custom_tone.as_deref()),
        target_audience: args.audience.clone(),
        num_chapters: args.chapters,
        pages_per_chapter: args.pages_per_chapter,
        requirements: args.requirements.clone(),
    }
}

fn read_prompt(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    path.map(|p| std::fs::read_to_string(p).with_context(|| format!("read {}", p.display())))
        .transpose()
}

async fn generate(ws: &Workspace, args: PlanOutlineArgs) -> anyhow::Result<()> {
    let path = ws.config.outline_path();
    if !args.force && OutlineDraft::load(&path)?.is_some() {
        anyhow::bail!(
            "an outline is already under review at {}; accept or discard it, or pass --force",
            path.display()
        );
    }

    let request = plan_request(&args.plan);
    let overrides = PromptOverrides {
        system_prompt: read_prompt(args.system_prompt_file.as_deref())?,
        user_prompt: read_prompt(args.user_prompt_file.as_deref())?,
    };
    let mut features = feature_choice(&args.features)?;
    if features.is_empty() {
        features = ws.settings()?.settings().default_features.clone();
    }

    let backend = ws.backend()?;
    let outline = planner::generate_outline(&backend, &request, &overrides, &features, ws.retry())
        .await?;
    let draft = OutlineDraft::new(outline);
    draft
        .save(&path)
        .with_context(|| format!("save outline {}", path.display()))?;

    outline::print_draft(&draft);
    println!("\noutline saved to {}", path.display());
    Ok(())
}
