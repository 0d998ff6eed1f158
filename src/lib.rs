pub mod backends;
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

pub use backends::YtDlpBackend;
pub use crate::core::{
    load_urls, run_batch, BatchReport, DiagnosticError, Downloader, FetchError, JobOutcome,
    MediaBackend, MediaInfo,
};
