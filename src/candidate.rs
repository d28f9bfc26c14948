use std::fmt;

/// An audio URL found on the page, with the name it gets inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateUrl {
    url: String,
    file_name: String,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let file_name = file_name_from_url(&url).to_owned();
        Self { url, file_name }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Last `/`-separated segment of the raw URL, cut at the first `?`.
pub fn file_name_from_url(url: &str) -> &str {
    let last_segment = url.rsplit('/').next().unwrap_or(url);
    last_segment.split('?').next().unwrap_or(last_segment)
}
