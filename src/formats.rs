use serde::{Deserialize, Serialize};

use crate::assemble::ItemRecord;
use crate::candidate::CandidateUrl;
use crate::session::{CompletedRun, RunOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub url: String,
    pub file_name: String,
}

impl From<&CandidateUrl> for CandidateRecord {
    fn from(candidate: &CandidateUrl) -> Self {
        Self {
            url: candidate.url().to_owned(),
            file_name: candidate.file_name().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Saved,
    ScanEmpty,
    ZeroSuccess,
    SaveFailed,
}

/// JSON summary of one `download` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub page_url: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub candidates: Vec<CandidateRecord>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: String,
}

impl RunReport {
    pub fn from_run(run: &CompletedRun) -> Self {
        let mut report = Self {
            page_url: run.page_url.to_string(),
            outcome: OutcomeKind::ScanEmpty,
            notice: run.outcome.notice().map(str::to_owned),
            candidates: run.candidates.iter().map(CandidateRecord::from).collect(),
            items: Vec::new(),
            entries: Vec::new(),
            archive_name: None,
            archive_path: None,
            error: None,
            finished_at: chrono::Utc::now().to_rfc3339(),
        };

        match &run.outcome {
            RunOutcome::ScanEmpty => {}
            RunOutcome::ZeroSuccess { items } => {
                report.outcome = OutcomeKind::ZeroSuccess;
                report.items = items.clone();
            }
            RunOutcome::SaveFailed {
                archive_name,
                entries,
                items,
                error,
            } => {
                report.outcome = OutcomeKind::SaveFailed;
                report.archive_name = Some(archive_name.clone());
                report.entries = entries.clone();
                report.items = items.clone();
                report.error = Some(error.clone());
            }
            RunOutcome::Saved {
                path,
                archive_name,
                entries,
                items,
            } => {
                report.outcome = OutcomeKind::Saved;
                report.archive_name = Some(archive_name.clone());
                report.archive_path = Some(path.to_string_lossy().to_string());
                report.entries = entries.clone();
                report.items = items.clone();
            }
        }

        report
    }
}
