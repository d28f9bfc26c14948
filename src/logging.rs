use anyhow::Context as _;

/// Dependencies only surface warnings unless `RUST_LOG` says otherwise.
const DEFAULT_FILTER: &str = "warn,audiosnipe=info";

/// Logs go to stderr so stdout stays reserved for URLs, paths and reports.
pub fn init() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
