use crate::policy::Variant;

pub const FIXED_ARCHIVE_NAME: &str = "audio_files.zip";
pub const THEMED_PREFIX: &str = "audioSnipe-";

pub const THEMED_WORDS: [&str; 16] = [
    "bassline",
    "cadence",
    "crescendo",
    "echo",
    "fermata",
    "groove",
    "harmonic",
    "lullaby",
    "melody",
    "overtone",
    "reverb",
    "rhythm",
    "tempo",
    "timbre",
    "vibrato",
    "waveform",
];

/// How the saved archive is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveNaming {
    Fixed(String),
    /// `audioSnipe-<word>.zip`, word picked when the archive is saved.
    Themed,
}

impl ArchiveNaming {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::Fixed(FIXED_ARCHIVE_NAME.to_owned()),
            Variant::Refined => Self::Themed,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Self::Fixed(name) => name.clone(),
            Self::Themed => themed_name(random_index(THEMED_WORDS.len())),
        }
    }
}

impl Default for ArchiveNaming {
    fn default() -> Self {
        Self::Fixed(FIXED_ARCHIVE_NAME.to_owned())
    }
}

fn themed_name(index: usize) -> String {
    format!("{THEMED_PREFIX}{}.zip", THEMED_WORDS[index % THEMED_WORDS.len()])
}

fn random_index(len: usize) -> usize {
    // v4 UUIDs carry 122 random bits; the modulo bias over 16 words is nil.
    (uuid::Uuid::new_v4().as_u128() % len as u128) as usize
}
