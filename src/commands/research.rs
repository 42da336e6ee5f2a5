use std::path::PathBuf;

use chrono::Local;

use crate::catalog::research::{AwarenessStage, OFFER_QUESTIONS};
use crate::cli::{ResearchCommand, ResearchExportArgs};
use crate::commands::Workspace;
use crate::export::{self, PandocOptions};
use crate::research::model::ResearchSession;
use crate::research::render::ResearchDocument;
use crate::workflow::research;

pub async fn run(ws: &Workspace, command: ResearchCommand) -> anyhow::Result<()> {
    let mut store = ws.research()?;
    match command {
        ResearchCommand::Answer {
            question,
            value,
            sample,
        } => {
            if sample {
                research::load_sample(&mut store)?;
                println!("loaded the sample answers");
            } else if let (Some(question), Some(value)) = (question, value) {
                research::set_answer(&mut store, &question, &value)?;
            }
            print_progress(store.session());
        }
        ResearchCommand::Show => print_session(store.session()),
        ResearchCommand::Avatar => {
            let backend = ws.backend()?;
            let warning = research::generate_avatar(&mut store, &backend, ws.avatar_retry()).await?;
            if let Some(warning) = warning {
                tracing::warn!(%warning, "avatar generated with a warning");
                println!("warning: {warning}");
            }
            if let Some(avatar) = store.session().problem_aware() {
                println!("{}: {}", avatar.name, avatar.tagline);
            }
        }
        ResearchCommand::Diary => {
            let backend = ws.backend()?;
            let outcome = research::generate_diary(&mut store, &backend, ws.retry()).await?;
            for phase in &outcome.failed {
                println!("failed: {} entry", phase.as_str());
            }
            println!(
                "saved {} of 3 diary entries",
                3 - outcome.failed.len()
            );
        }
        ResearchCommand::Brand => {
            let backend = ws.backend()?;
            research::generate_brand(&mut store, &backend, ws.retry()).await?;
            println!("brand identity saved");
        }
        ResearchCommand::LandingPage => {
            let backend = ws.backend()?;
            research::generate_landing_page(&mut store, &backend, ws.retry()).await?;
            println!("landing page spec saved");
        }
        ResearchCommand::Marketing => {
            let backend = ws.backend()?;
            let items = research::generate_marketing(&mut store, &backend, ws.retry()).await?;
            println!("marketing kit saved ({items} item(s))");
        }
        ResearchCommand::Export(args) => {
            let path = export_document(store.session(), args)?;
            println!("wrote {}", path.display());
        }
        ResearchCommand::Reset { all } => {
            research::reset(&mut store, all)?;
            println!(
                "{}",
                if all {
                    "research cleared"
                } else {
                    "generated results cleared; answers kept"
                }
            );
        }
    }
    Ok(())
}

fn export_document(session: &ResearchSession, args: ResearchExportArgs) -> anyhow::Result<PathBuf> {
    let today = Local::now().date_naive();
    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}-{}.{}",
            args.document.file_stem(),
            today.format("%Y-%m-%d"),
            args.format.extension()
        ))
    });
    let pandoc = PandocOptions {
        pandoc: args.pandoc,
        pdf_engine: args.pdf_engine,
    };
    export::export_research(session, args.document, args.format, &out, args.force, &pandoc, today)?;
    Ok(out)
}

fn print_progress(session: &ResearchSession) {
    let missing = research::unanswered(session);
    println!(
        "{}/{} questions answered",
        OFFER_QUESTIONS.len() - missing.len(),
        OFFER_QUESTIONS.len()
    );
    if !missing.is_empty() {
        println!("missing: {}", missing.join(", "));
    }
}

fn print_session(session: &ResearchSession) {
    for question in OFFER_QUESTIONS {
        println!("{} ({})", question.question, question.id);
        match session.answer(question.id) {
            Some(answer) => println!("  {answer}"),
            None => println!("  (unanswered) {}", question.placeholder),
        }
    }
    println!();
    let done = |present: bool| if present { "done" } else { "-" };
    for stage in AwarenessStage::ALL {
        if let Some(avatar) = session.avatars.get(&stage) {
            println!("avatar [{}]: {} - {}", stage.name(), avatar.name, avatar.tagline);
        }
    }
    println!("avatar: {}", done(session.problem_aware().is_some()));
    println!("diary: {}", done(session.diary.as_ref().is_some_and(|d| !d.is_empty())));
    println!("brand identity: {}", done(session.brand_identity.is_some()));
    println!("landing page: {}", done(session.landing_page_spec.is_some()));
    println!(
        "marketing: {}",
        match &session.marketing_assets {
            Some(assets) => format!("{} item(s)", assets.total_items()),
            None => "-".to_owned(),
        }
    );
    println!(
        "\nexports: {}",
        [
            ResearchDocument::Avatars,
            ResearchDocument::Diary,
            ResearchDocument::Brand,
            ResearchDocument::LandingPage,
            ResearchDocument::Marketing,
        ]
        .iter()
        .filter(|d| d.render(session, Local::now().date_naive()).is_some())
        .map(|d| d.file_stem())
        .collect::<Vec<_>>()
        .join(", ")
    );
}
