use thiserror::Error;

use crate::session::RunState;

/// Why a single resource could not be fetched. Never fatal to a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a run is already in progress ({0})")]
    Busy(RunState),

    #[error("session is still {0}; only a finished run can be reset")]
    NotFinished(RunState),

    #[error("load page: {0:#}")]
    Load(anyhow::Error),
}
