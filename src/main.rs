use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

/// Exit code when a run finishes without producing an archive.
const EXIT_NO_ARCHIVE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<ExitCode> {
    audiosnipe::logging::init().context("init logging")?;

    let cli = audiosnipe::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        audiosnipe::cli::Command::Scan(args) => {
            audiosnipe::scan::run(args).await.context("scan")?;
        }
        audiosnipe::cli::Command::Download(args) => {
            let run = audiosnipe::download::run(args).await.context("download")?;
            if !run.outcome.is_saved() {
                return Ok(ExitCode::from(EXIT_NO_ARCHIVE));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
