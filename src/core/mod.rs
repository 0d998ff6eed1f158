pub mod backend;
pub mod batch;
pub mod downloader;
pub mod error;
pub mod input;
pub mod metadata;

pub use backend::MediaBackend;
pub use batch::{progress_bar, render_result, run_batch, BatchReport, JobResult};
pub use downloader::{Downloader, JobOutcome};
pub use error::{DiagnosticError, FetchError, UNKNOWN_FILENAME};
pub use input::{load_urls, parse_url_list};
pub use metadata::MediaInfo;
