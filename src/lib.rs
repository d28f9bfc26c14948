#![forbid(unsafe_code)]

pub mod archive;
pub mod assemble;
pub mod candidate;
pub mod cli;
pub mod download;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod naming;
pub mod page;
pub mod policy;
pub mod progress;
pub mod save;
pub mod scan;
pub mod session;
