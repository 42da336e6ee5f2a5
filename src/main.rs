use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    liquidbooks::logging::init().context("init logging")?;

    let cli = liquidbooks::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let workspace = liquidbooks::commands::Workspace::new(cli.global)?;
    liquidbooks::commands::dispatch(&workspace, cli.command).await
}
