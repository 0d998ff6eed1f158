use crate::config::FetchOptions;
use crate::core::{DiagnosticError, FetchError, MediaBackend};
use crate::utils::{audio_output_path, output_template};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a job that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The output file was already there; nothing was fetched.
    Skipped(PathBuf),
    Downloaded(PathBuf),
}

impl JobOutcome {
    pub fn path(&self) -> &Path {
        match self {
            JobOutcome::Skipped(path) | JobOutcome::Downloaded(path) => path,
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Skipped(path) => {
                write!(f, "[↷] Skipped (already exists): {}", path.display())
            }
            JobOutcome::Downloaded(path) => {
                write!(f, "[✓] Downloaded and converted: {}", path.display())
            }
        }
    }
}

/// Fetches one URL at a time into a fixed output directory.
pub struct Downloader {
    backend: Box<dyn MediaBackend>,
    output_dir: PathBuf,
    options: FetchOptions,
}

impl Downloader {
    pub fn new(
        backend: Box<dyn MediaBackend>,
        output_dir: PathBuf,
        options: FetchOptions,
    ) -> Self {
        Self {
            backend,
            output_dir,
            options,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Probe, skip if already present, otherwise download and transcode.
    ///
    /// Every failure is returned as a [`DiagnosticError`] carrying the best
    /// known output path; nothing here panics or aborts the caller's batch.
    pub async fn fetch(&self, url: &str) -> Result<JobOutcome, DiagnosticError> {
        let mut intended = None;
        self.run_job(url, &mut intended)
            .await
            .map_err(|source| DiagnosticError {
                url: url.to_string(),
                intended_filename: intended,
                source,
            })
    }

    async fn run_job(
        &self,
        url: &str,
        intended: &mut Option<PathBuf>,
    ) -> Result<JobOutcome, FetchError> {
        let template = output_template(&self.output_dir);
        debug!("Probing {} via {}", url, self.backend.name());
        let info = self.backend.probe(url, &template, &self.options).await?;
        let title = info
            .usable_title()
            .ok_or_else(|| FetchError::Probe(format!("no title in metadata for {}", url)))?;

        let ext = self.options.postprocess.codec.extension();
        let target = match info.filename.as_deref() {
            // The engine's rendering of the template is what download will write
            Some(rendered) => PathBuf::from(rendered).with_extension(ext),
            None => audio_output_path(&self.output_dir, title, ext),
        };
        *intended = Some(target.clone());

        let exists = tokio::fs::try_exists(&target)
            .await
            .map_err(|e| FetchError::filesystem(&target, e))?;
        if exists {
            info!("Skipping {}, {} exists", url, target.display());
            return Ok(JobOutcome::Skipped(target));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| FetchError::filesystem(&self.output_dir, e))?;

        info!("Downloading {} as {}", url, target.display());
        self.backend.download(url, &template, &self.options).await?;

        let produced = tokio::fs::try_exists(&target)
            .await
            .map_err(|e| FetchError::filesystem(&target, e))?;
        if !produced {
            return Err(FetchError::Transcode(format!(
                "{} reported success but {} was not produced",
                self.backend.name(),
                target.display()
            )));
        }

        Ok(JobOutcome::Downloaded(target))
    }
}
