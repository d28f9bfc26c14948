use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::archive::ZipPackager;
use crate::cli::DownloadArgs;
use crate::formats::RunReport;
use crate::progress::LogProgress;
use crate::save::LocalDirSaver;
use crate::session::{CompletedRun, RunOutcome, Session};

pub async fn run(args: DownloadArgs) -> anyhow::Result<CompletedRun> {
    let source = args.source.page_source()?;
    let fetcher = args.http.fetcher().context("build http fetcher")?;
    let saver = LocalDirSaver::new(&args.out, args.force);

    let session = Session::new(
        Arc::new(fetcher),
        Arc::new(ZipPackager),
        Arc::new(saver),
        args.policy.scan_policy(),
        args.policy.archive_naming(args.archive_name.as_deref()),
    );

    let run = session
        .run(&source, &LogProgress)
        .await
        .context("run session")?;

    if let Some(notice) = run.outcome.notice() {
        eprintln!("{notice}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer(&mut out, &RunReport::from_run(&run)).context("write run report")?;
        out.write_all(b"\n").context("write run report newline")?;
    } else if let RunOutcome::Saved { path, .. } = &run.outcome {
        writeln!(out, "{}", path.display()).context("write archive path")?;
    }
    out.flush().context("flush stdout")?;

    Ok(run)
}
