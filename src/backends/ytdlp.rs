use crate::config::{Config, FetchOptions};
use crate::core::{FetchError, MediaBackend, MediaInfo};
use crate::utils::last_error_line;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

const DEFAULT_BINARY: &str = "yt-dlp";

/// [`MediaBackend`] that shells out to the `yt-dlp` executable.
///
/// Audio conversion is delegated to yt-dlp's `--extract-audio` post-processor,
/// which in turn runs ffmpeg.
pub struct YtDlpBackend {
    binary_path: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlpBackend {
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ffmpeg_location: None,
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_BINARY).ok().map(Self::new)
    }

    /// Build from config: explicit path first, then `PATH`, then the bare name.
    ///
    /// A missing binary is not an error here; each job fails with a spawn error.
    pub fn from_config(config: &Config) -> Self {
        let mut backend = match &config.ytdlp_path {
            Some(path) => Self::new(path.clone()),
            None => Self::from_path().unwrap_or_else(|| {
                warn!("{} not found on PATH, downloads will fail", DEFAULT_BINARY);
                Self::new(PathBuf::from(DEFAULT_BINARY))
            }),
        };
        backend.ffmpeg_location = config.ffmpeg_location.clone();
        backend
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    pub fn probe_args(url: &str, output_template: &str, options: &FetchOptions) -> Vec<OsString> {
        vec![
            "--dump-single-json".into(),
            "--output".into(),
            output_template.into(),
            "--skip-download".into(),
            "--no-playlist".into(),
            "--socket-timeout".into(),
            options.timeout_seconds.to_string().into(),
            "--".into(),
            url.into(),
        ]
    }

    pub fn download_args(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Vec<OsString> {
        let post = &options.postprocess;
        let mut args: Vec<OsString> = vec![
            "--format".into(),
            options.format.clone().into(),
            "--output".into(),
            output_template.into(),
            "--no-playlist".into(),
            "--socket-timeout".into(),
            options.timeout_seconds.to_string().into(),
            "--retries".into(),
            options.retries.to_string().into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            post.codec.to_string().into(),
            "--audio-quality".into(),
            format!("{}K", post.bitrate_kbps).into(),
        ];
        if options.quiet {
            args.push("--quiet".into());
            args.push("--no-warnings".into());
        }
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.into());
        }
        args.push("--".into());
        args.push(url.into());
        args
    }

    async fn run(&self, args: Vec<OsString>, capture_stdout: bool) -> Result<Output, FetchError> {
        debug!("Running {} {:?}", self.binary_path.display(), args);
        let stdout = if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                program: self.binary_path.display().to_string(),
                source,
            })
    }
}

#[async_trait]
impl MediaBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<MediaInfo, FetchError> {
        let args = Self::probe_args(url, output_template, options);
        let output = self.run(args, true).await?;
        if !output.status.success() {
            return Err(FetchError::Probe(failure_message(&output)));
        }
        parse_probe_output(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<(), FetchError> {
        let output = self
            .run(self.download_args(url, output_template, options), false)
            .await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = failure_message(&output);
        if is_postprocess_failure(&stderr) {
            Err(FetchError::Transcode(message))
        } else {
            Err(FetchError::Download(message))
        }
    }
}

pub fn parse_probe_output(stdout: &[u8]) -> Result<MediaInfo, FetchError> {
    serde_json::from_slice(stdout).map_err(|source| FetchError::Metadata {
        backend: "yt-dlp",
        source,
    })
}

/// yt-dlp reports ffmpeg and post-processor problems with these markers.
pub fn is_postprocess_failure(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    ["postprocessing", "ffmpeg", "ffprobe", "audio conversion failed"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    last_error_line(&stderr).unwrap_or_else(|| match output.status.code() {
        Some(code) => format!("yt-dlp exited with status {}", code),
        None => "yt-dlp was terminated by a signal".to_string(),
    })
}
