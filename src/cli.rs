use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpFetcher};
use crate::naming::ArchiveNaming;
use crate::page::PageSource;
use crate::policy::{ExtensionMatch, ScanPolicy, Variant};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the audio URLs a page links to.
    Scan(ScanArgs),
    /// Fetch every audio URL on a page into one ZIP archive.
    Download(DownloadArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub http: HttpArgs,

    /// Print one JSON object per candidate instead of bare URLs.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub http: HttpArgs,

    /// Directory the archive is saved into.
    #[arg(long, default_value = ".")]
    pub out: String,

    /// Archive file name (default: depends on --variant).
    #[arg(long)]
    pub archive_name: Option<String>,

    /// Overwrite an existing archive with the same name.
    #[arg(long)]
    pub force: bool,

    /// Print the run report as JSON instead of the archive path.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Page URL to load and scan (must be http/https).
    #[arg(long, required_unless_present = "html", conflicts_with = "html")]
    pub url: Option<String>,

    /// Saved HTML file to scan instead of fetching a page.
    #[arg(long, requires = "base_url")]
    pub html: Option<String>,

    /// URL the saved HTML was served from; relative links resolve against it.
    #[arg(long)]
    pub base_url: Option<String>,
}

impl SourceArgs {
    pub fn page_source(&self) -> anyhow::Result<PageSource> {
        if let Some(url) = &self.url {
            return PageSource::remote(url).context("parse --url");
        }

        let path = self
            .html
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("either --url or --html is required"))?;
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--html requires --base-url"))?;
        let base_url = Url::parse(base_url).context("parse --base-url")?;

        Ok(PageSource::File {
            path: PathBuf::from(path),
            base_url,
        })
    }
}

#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// `classic` skips index.php links; `refined` also skips wiki File: pages
    /// and picks a themed archive name.
    #[arg(long, value_enum, default_value_t = Variant::Classic)]
    pub variant: Variant,

    /// Match extensions against the URL path, so `a.mp3?v=2` counts.
    #[arg(long)]
    pub match_path: bool,
}

impl PolicyArgs {
    pub fn scan_policy(&self) -> ScanPolicy {
        let extension_match = if self.match_path {
            ExtensionMatch::PathSuffix
        } else {
            ExtensionMatch::RawSuffix
        };
        ScanPolicy::for_variant(self.variant).with_extension_match(extension_match)
    }

    pub fn archive_naming(&self, archive_name: Option<&str>) -> ArchiveNaming {
        match archive_name {
            Some(name) => ArchiveNaming::Fixed(name.to_owned()),
            None => ArchiveNaming::for_variant(self.variant),
        }
    }
}

#[derive(Debug, Args)]
pub struct HttpArgs {
    /// User-Agent header sent with every request.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds (at least 1).
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

impl HttpArgs {
    pub fn fetcher(&self) -> anyhow::Result<HttpFetcher> {
        HttpFetcher::new(
            self.user_agent.clone(),
            Duration::from_secs(self.timeout_secs),
        )
    }
}
