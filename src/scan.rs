use std::collections::HashSet;
use std::io::Write as _;

use anyhow::Context as _;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::candidate::CandidateUrl;
use crate::cli::ScanArgs;
use crate::formats::CandidateRecord;
use crate::policy::ScanPolicy;
use crate::session::NOTICE_SCAN_EMPTY;

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    let policy = args.policy.scan_policy();
    let fetcher = args.http.fetcher().context("build http fetcher")?;
    let page = args
        .source
        .page_source()?
        .load(&fetcher)
        .await
        .context("load page")?;

    let candidates = scan_html(&page.html, &page.url, &policy).context("scan page")?;
    tracing::info!(url = %page.url, count = candidates.len(), "detected audio files");
    if candidates.is_empty() {
        eprintln!("{NOTICE_SCAN_EMPTY}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for candidate in &candidates {
        if args.json {
            serde_json::to_writer(&mut out, &CandidateRecord::from(candidate))
                .context("write candidate record json")?;
            out.write_all(b"\n").context("write candidate newline")?;
        } else {
            writeln!(out, "{candidate}").context("write candidate url")?;
        }
    }
    out.flush().context("flush stdout")?;

    Ok(())
}

/// Parses `html` and scans it. See [`scan_document`].
pub fn scan_html(
    html: &str,
    page_url: &Url,
    policy: &ScanPolicy,
) -> anyhow::Result<Vec<CandidateUrl>> {
    let document = Html::parse_document(html);
    scan_document(&document, page_url, policy)
}

/// Collects audio URLs from `<audio>`/`<source>` elements, then from `<a>`
/// links, in document order with exact duplicates collapsed.
pub fn scan_document(
    document: &Html,
    page_url: &Url,
    policy: &ScanPolicy,
) -> anyhow::Result<Vec<CandidateUrl>> {
    let audio_selector = selector("audio")?;
    let source_selector = selector("source")?;
    let link_selector = selector("a[href]")?;

    let base_url = document_base_url(document, page_url)?;
    let mut found = OrderedUrls::default();

    for audio in document.select(&audio_selector) {
        let mut sources = OrderedUrls::default();
        for source in audio.select(&source_selector) {
            if let Some(src) = resolve_attr(&source, "src", &base_url)
                && policy.has_audio_extension(&src)
            {
                sources.insert(src);
            }
        }

        // The element's own `src` only counts when no child already named it.
        if let Some(src) = resolve_attr(&audio, "src", &base_url)
            && policy.has_audio_extension(&src)
        {
            sources.insert(src);
        }

        for src in sources.into_vec() {
            found.insert(src);
        }
    }

    for link in document.select(&link_selector) {
        let Some(href) = resolve_attr(&link, "href", &base_url) else {
            continue;
        };
        if !policy.has_audio_extension(&href) {
            continue;
        }
        if policy.is_excluded_link(&href) {
            tracing::debug!(url = %href, "skip excluded link");
            continue;
        }
        found.insert(href);
    }

    let candidates = found
        .into_vec()
        .into_iter()
        .map(CandidateUrl::new)
        .collect::<Vec<_>>();
    tracing::debug!(
        urls = ?candidates.iter().map(CandidateUrl::url).collect::<Vec<_>>(),
        "scanned document"
    );
    Ok(candidates)
}

/// `<base href>` resolved against the page URL, else the page URL itself.
pub fn document_base_url(document: &Html, page_url: &Url) -> anyhow::Result<Url> {
    let base_selector = selector("base[href]")?;
    let base = document
        .select(&base_selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok());
    Ok(base.unwrap_or_else(|| page_url.clone()))
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow::anyhow!("parse selector {css:?}: {err:?}"))
}

fn resolve_attr(element: &ElementRef<'_>, attr: &str, base_url: &Url) -> Option<String> {
    let value = element.value().attr(attr)?.trim();
    if value.is_empty() {
        return None;
    }
    match base_url.join(value) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            tracing::debug!(value, %err, "skip unresolvable url");
            None
        }
    }
}

#[derive(Debug, Default)]
struct OrderedUrls {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl OrderedUrls {
    fn insert(&mut self, url: String) {
        if self.seen.insert(url.clone()) {
            self.order.push(url);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.order
    }
}
