/// Observable progress of one run. Never read back by the run itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub message: String,
}

impl Progress {
    pub fn counted(completed: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            completed,
            total,
            percent: percent(completed, total),
            message: message.into(),
        }
    }

    /// Post-loop phases (compress, save) always show a full bar.
    pub fn full(completed: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            completed,
            total,
            percent: 100,
            message: message.into(),
        }
    }
}

pub fn percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress) + Send + Sync,
{
    fn report(&self, progress: &Progress) {
        self(progress)
    }
}

/// Writes each update as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &Progress) {
        tracing::info!(
            completed = progress.completed,
            total = progress.total,
            percent = progress.percent,
            "{}",
            progress.message
        );
    }
}
