use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Rendered in reports when a job failed before its title was known.
pub const UNKNOWN_FILENAME: &str = "unknown";

/// Everything that can go wrong while fetching a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("probe failed: {0}")]
    Probe(String),

    #[error("unreadable metadata from {backend}: {source}")]
    Metadata {
        backend: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("download failed: {0}")]
    Download(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// A failed job: the URL, the output path it was aiming for, and why it failed.
#[derive(Debug, Error)]
#[error("{url}: {source}")]
pub struct DiagnosticError {
    pub url: String,
    /// `None` when probing never produced a title.
    pub intended_filename: Option<PathBuf>,
    #[source]
    pub source: FetchError,
}

impl DiagnosticError {
    pub fn intended_display(&self) -> IntendedFilename<'_> {
        IntendedFilename(self.intended_filename.as_deref())
    }

    pub fn message(&self) -> String {
        self.source.to_string()
    }
}

/// Display adapter that renders a missing filename as [`UNKNOWN_FILENAME`].
pub struct IntendedFilename<'a>(Option<&'a std::path::Path>);

impl fmt::Display for IntendedFilename<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str(UNKNOWN_FILENAME),
        }
    }
}
