use url::Url;

pub const AUDIO_EXTENSIONS: [&str; 3] = [".wav", ".mp3", ".ogg"];
pub const INDEX_ENDPOINT: &str = "index.php";
pub const WIKI_FILE_PATH: &str = "/wiki/File:";
pub const EXCLUDED_NAME_PREFIX: &str = "File:";

/// Which pair of defaults to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Skips pagination links only; saves `audio_files.zip`.
    Classic,
    /// Also skips wiki `File:` pages; saves `audioSnipe-<word>.zip`.
    Refined,
}

/// How a resolved URL is compared against the extension allow-list.
///
/// `RawSuffix` compares the whole URL string, so `a.mp3?v=2` does not match.
/// `PathSuffix` compares the URL path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionMatch {
    RawSuffix,
    PathSuffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPolicy {
    pub extensions: Vec<String>,
    pub excluded_substrings: Vec<String>,
    pub excluded_name_prefix: String,
    pub extension_match: ExtensionMatch,
}

impl ScanPolicy {
    pub fn classic() -> Self {
        Self {
            extensions: AUDIO_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
            excluded_substrings: vec![INDEX_ENDPOINT.to_owned()],
            excluded_name_prefix: EXCLUDED_NAME_PREFIX.to_owned(),
            extension_match: ExtensionMatch::RawSuffix,
        }
    }

    pub fn refined() -> Self {
        let mut policy = Self::classic();
        policy.excluded_substrings.push(WIKI_FILE_PATH.to_owned());
        policy
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::Refined => Self::refined(),
        }
    }

    #[must_use]
    pub fn with_extension_match(mut self, extension_match: ExtensionMatch) -> Self {
        self.extension_match = extension_match;
        self
    }

    pub fn has_audio_extension(&self, url: &str) -> bool {
        match self.extension_match {
            ExtensionMatch::RawSuffix => self.ends_with_extension(url),
            ExtensionMatch::PathSuffix => match Url::parse(url) {
                Ok(parsed) => self.ends_with_extension(parsed.path()),
                Err(_) => self.ends_with_extension(url),
            },
        }
    }

    pub fn is_excluded_link(&self, url: &str) -> bool {
        self.excluded_substrings
            .iter()
            .any(|needle| url.contains(needle.as_str()))
    }

    pub fn is_excluded_name(&self, file_name: &str) -> bool {
        !self.excluded_name_prefix.is_empty() && file_name.starts_with(&self.excluded_name_prefix)
    }

    fn ends_with_extension(&self, subject: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| subject.ends_with(ext.as_str()))
    }
}
