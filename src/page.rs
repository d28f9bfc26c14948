use std::path::PathBuf;

use anyhow::Context as _;
use url::Url;

use crate::fetch::Fetcher;

/// Where the document to scan comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Fetch the page over HTTP; relative links resolve against the final URL.
    Remote(Url),
    /// Read a saved page from disk, resolving links against `base_url`.
    File { path: PathBuf, base_url: Url },
    /// Already-loaded markup.
    Inline { html: String, base_url: Url },
}

/// A loaded document: markup plus the URL it was served from.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub html: String,
}

impl PageSource {
    pub fn remote(url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(url).with_context(|| format!("parse page url: {url}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("page url must be http/https: {url}");
        }
        Ok(Self::Remote(url))
    }

    pub async fn load(&self, fetcher: &dyn Fetcher) -> anyhow::Result<Page> {
        match self {
            Self::Remote(url) => {
                let fetched = fetcher
                    .fetch(url.as_str())
                    .await
                    .with_context(|| format!("GET {url}"))?;
                if fetched.url != *url {
                    tracing::debug!(from = %url, to = %fetched.url, "page redirected");
                }
                Ok(Page {
                    url: fetched.url,
                    html: decode_body(&fetched.body, fetched.content_type.as_deref()),
                })
            }
            Self::File { path, base_url } => {
                let html = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("read html: {}", path.display()))?;
                Ok(Page {
                    url: base_url.clone(),
                    html,
                })
            }
            Self::Inline { html, base_url } => Ok(Page {
                url: base_url.clone(),
                html: html.clone(),
            }),
        }
    }
}

/// Decodes a response body with the `charset` named in its `Content-Type`,
/// falling back to UTF-8. A byte-order mark overrides both.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(encoding = used.name(), "replaced undecodable bytes in page");
    }
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}
