use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::candidate::CandidateUrl;
use crate::fetch::Fetcher;
use crate::policy::ScanPolicy;
use crate::progress::{Progress, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ExcludedName,
    DuplicateName,
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Added { bytes: usize },
    Skipped { reason: SkipReason },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub url: String,
    pub file_name: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub archive: Archive,
    pub items: Vec<ItemRecord>,
}

impl Assembly {
    pub fn failures(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Failed { .. }))
    }
}

#[derive(Debug, Clone)]
pub enum AssembleOutcome {
    /// No candidates were given; nothing was fetched.
    NothingToDo,
    /// Every candidate failed or was skipped.
    NoValidResources { items: Vec<ItemRecord> },
    Assembled(Assembly),
}

/// Fetches candidates one at a time into a fresh archive.
///
/// A failed fetch is logged and skipped, never retried. Progress counts
/// successful items against the full candidate count.
pub async fn assemble(
    candidates: &[CandidateUrl],
    policy: &ScanPolicy,
    fetcher: &dyn Fetcher,
    sink: &dyn ProgressSink,
) -> AssembleOutcome {
    if candidates.is_empty() {
        return AssembleOutcome::NothingToDo;
    }

    let total = candidates.len();
    let mut archive = Archive::new();
    let mut used_names: HashSet<&str> = HashSet::new();
    let mut items = Vec::with_capacity(total);
    let mut completed = 0_usize;

    sink.report(&Progress::counted(0, total, "Preparing to download..."));

    for candidate in candidates {
        let file_name = candidate.file_name();
        let record = |status| ItemRecord {
            url: candidate.url().to_owned(),
            file_name: file_name.to_owned(),
            status,
        };

        let skip = if file_name.is_empty() {
            Some(SkipReason::EmptyName)
        } else if policy.is_excluded_name(file_name) {
            Some(SkipReason::ExcludedName)
        } else if used_names.contains(file_name) {
            Some(SkipReason::DuplicateName)
        } else {
            None
        };
        if let Some(reason) = skip {
            tracing::debug!(url = candidate.url(), file_name, ?reason, "skip candidate");
            items.push(record(ItemStatus::Skipped { reason }));
            continue;
        }

        tracing::info!(url = candidate.url(), file_name, "fetching");
        let fetched = match fetcher.fetch(candidate.url()).await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(url = candidate.url(), file_name, %err, "fetch failed; skipping");
                items.push(record(ItemStatus::Failed {
                    error: err.to_string(),
                }));
                continue;
            }
        };
        tracing::debug!(
            file_name,
            bytes = fetched.body.len(),
            content_type = fetched.content_type.as_deref().unwrap_or(""),
            "fetched"
        );

        let bytes = fetched.body.len();
        archive.insert(file_name, fetched.body);
        used_names.insert(file_name);
        items.push(record(ItemStatus::Added { bytes }));

        completed += 1;
        sink.report(&Progress::counted(
            completed,
            total,
            format!("Downloading {completed} of {total} files..."),
        ));
    }

    if archive.is_empty() {
        tracing::error!(total, "no valid audio files were added to the archive");
        return AssembleOutcome::NoValidResources { items };
    }

    AssembleOutcome::Assembled(Assembly { archive, items })
}
