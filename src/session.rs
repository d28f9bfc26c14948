use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use url::Url;

use crate::archive::{Archive, Packager};
use crate::assemble::{AssembleOutcome, ItemRecord};
use crate::candidate::CandidateUrl;
use crate::error::SessionError;
use crate::fetch::Fetcher;
use crate::naming::ArchiveNaming;
use crate::page::PageSource;
use crate::policy::ScanPolicy;
use crate::progress::{Progress, ProgressSink};
use crate::save::Saver;

pub const NOTICE_SCAN_EMPTY: &str = "No audio files found on this page.";
pub const NOTICE_ZERO_SUCCESS: &str = "No valid audio files were found to download.";
pub const NOTICE_SAVE_FAILED: &str = "The archive could not be saved.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Scanning,
    Assembling,
    Done,
    Failed,
}

impl RunState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The page had no candidate URLs; nothing was fetched.
    ScanEmpty,
    /// Every candidate failed or was skipped; nothing was saved.
    ZeroSuccess { items: Vec<ItemRecord> },
    /// The archive was built but packaging or saving it failed.
    SaveFailed {
        archive_name: String,
        entries: Vec<String>,
        items: Vec<ItemRecord>,
        error: String,
    },
    Saved {
        path: PathBuf,
        archive_name: String,
        entries: Vec<String>,
        items: Vec<ItemRecord>,
    },
}

impl RunOutcome {
    /// Message for the user when the run did not produce a download.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::ScanEmpty => Some(NOTICE_SCAN_EMPTY),
            Self::ZeroSuccess { .. } => Some(NOTICE_ZERO_SUCCESS),
            Self::SaveFailed { .. } => Some(NOTICE_SAVE_FAILED),
            Self::Saved { .. } => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub page_url: Url,
    pub candidates: Vec<CandidateUrl>,
    pub outcome: RunOutcome,
}

/// Scan → fetch → package → save, one run at a time.
///
/// Capabilities are fixed at construction. A trigger is accepted only while
/// the session is `Idle`; a finished session must be [`Session::reset`]
/// before the next run.
pub struct Session {
    fetcher: Arc<dyn Fetcher>,
    packager: Arc<dyn Packager>,
    saver: Arc<dyn Saver>,
    policy: ScanPolicy,
    naming: ArchiveNaming,
    state: Mutex<RunState>,
}

impl Session {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        packager: Arc<dyn Packager>,
        saver: Arc<dyn Saver>,
        policy: ScanPolicy,
        naming: ArchiveNaming,
    ) -> Self {
        Self {
            fetcher,
            packager,
            saver,
            policy,
            naming,
            state: Mutex::new(RunState::Idle),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            RunState::Idle => Ok(()),
            finished if finished.is_finished() => {
                *state = RunState::Idle;
                Ok(())
            }
            busy => Err(SessionError::NotFinished(busy)),
        }
    }

    /// Dropping the returned future mid-run leaves the session `Failed`, so it
    /// can be [`Session::reset`] like any other finished run.
    pub async fn run(
        &self,
        source: &PageSource,
        sink: &dyn ProgressSink,
    ) -> Result<CompletedRun, SessionError> {
        let guard = self.begin()?;

        let page = match source.load(self.fetcher.as_ref()).await {
            Ok(page) => page,
            Err(err) => {
                guard.finish(RunState::Failed);
                return Err(SessionError::Load(err));
            }
        };

        let candidates = match crate::scan::scan_html(&page.html, &page.url, &self.policy) {
            Ok(candidates) => candidates,
            Err(err) => {
                guard.finish(RunState::Failed);
                return Err(SessionError::Load(err.context("scan page")));
            }
        };
        tracing::info!(url = %page.url, count = candidates.len(), "detected audio files");

        let outcome = if candidates.is_empty() {
            tracing::warn!(url = %page.url, "{NOTICE_SCAN_EMPTY}");
            RunOutcome::ScanEmpty
        } else {
            guard.set(RunState::Assembling);
            self.assemble_and_save(&candidates, sink).await
        };

        guard.finish(if outcome.is_saved() {
            RunState::Done
        } else {
            RunState::Failed
        });

        Ok(CompletedRun {
            page_url: page.url,
            candidates,
            outcome,
        })
    }

    async fn assemble_and_save(
        &self,
        candidates: &[CandidateUrl],
        sink: &dyn ProgressSink,
    ) -> RunOutcome {
        let assembled = crate::assemble::assemble(
            candidates,
            &self.policy,
            self.fetcher.as_ref(),
            sink,
        )
        .await;
        let assembly = match assembled {
            AssembleOutcome::NothingToDo => return RunOutcome::ScanEmpty,
            AssembleOutcome::NoValidResources { items } => {
                return RunOutcome::ZeroSuccess { items };
            }
            AssembleOutcome::Assembled(assembly) => assembly,
        };

        let total = candidates.len();
        let added = assembly.archive.len();
        let entries = assembly
            .archive
            .names()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let items = assembly.items;
        let archive_name = self.naming.file_name();

        sink.report(&Progress::full(added, total, "Compressing files into ZIP..."));
        let saved = match self.package(assembly.archive).await {
            Ok(blob) => self.saver.save(&blob, &archive_name).await,
            Err(err) => Err(err),
        };

        match saved {
            Ok(path) => {
                sink.report(&Progress::full(added, total, "Download complete!"));
                tracing::info!(path = %path.display(), entries = added, "saved archive");
                RunOutcome::Saved {
                    path,
                    archive_name,
                    entries,
                    items,
                }
            }
            Err(err) => {
                let error = format!("{err:#}");
                tracing::error!(%archive_name, %error, "save archive failed");
                sink.report(&Progress::full(added, total, "Save failed"));
                RunOutcome::SaveFailed {
                    archive_name,
                    entries,
                    items,
                    error,
                }
            }
        }
    }

    async fn package(&self, archive: Archive) -> anyhow::Result<Vec<u8>> {
        let packager = Arc::clone(&self.packager);
        tokio::task::spawn_blocking(move || packager.package(&archive))
            .await
            .map_err(|err| anyhow::anyhow!("join package task: {err}"))?
    }

    fn begin(&self) -> Result<RunGuard<'_>, SessionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != RunState::Idle {
            return Err(SessionError::Busy(*state));
        }
        *state = RunState::Scanning;
        Ok(RunGuard {
            state: &self.state,
            finished: false,
        })
    }
}

/// Owns the in-flight state of one run. Marks it `Failed` if dropped before
/// [`RunGuard::finish`].
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    finished: bool,
}

impl RunGuard<'_> {
    fn set(&self, next: RunState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = %*state, to = %next, "run state");
        *state = next;
    }

    fn finish(mut self, next: RunState) {
        self.set(next);
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("run abandoned before it finished");
            self.set(RunState::Failed);
        }
    }
}
