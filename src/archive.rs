use std::collections::HashSet;
use std::io::{Cursor, Write as _};

use anyhow::Context as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// In-memory file name → content map. Names are unique; order is insertion order.
#[derive(Debug, Default, Clone)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
    names: HashSet<String>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the archive untouched if `name` is taken.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) -> bool {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return false;
        }
        self.entries.push(ArchiveEntry { name, data });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

/// Turns a filled archive into a single downloadable blob.
pub trait Packager: Send + Sync {
    fn package(&self, archive: &Archive) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPackager;

impl Packager for ZipPackager {
    fn package(&self, archive: &Archive) -> anyhow::Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for entry in archive.entries() {
            zip.start_file(entry.name.as_str(), options)
                .with_context(|| format!("zip start_file {}", entry.name))?;
            zip.write_all(&entry.data)
                .with_context(|| format!("zip write {}", entry.name))?;
        }

        let cursor = zip.finish().context("zip finish")?;
        Ok(cursor.into_inner())
    }
}
