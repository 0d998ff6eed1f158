use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the optional config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "mp3-batch.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    /// Explicit yt-dlp binary. When unset the binary is looked up on `PATH`.
    pub ytdlp_path: Option<PathBuf>,
    /// Passed through to yt-dlp as `--ffmpeg-location`.
    pub ffmpeg_location: Option<PathBuf>,
    pub fetch: FetchOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("mp3s"),
            ytdlp_path: None,
            ffmpeg_location: None,
            fetch: FetchOptions::default(),
        }
    }
}

impl Config {
    /// Load `mp3-batch.toml` from the current directory, or defaults if absent.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Options handed to the media backend for both probing and downloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Format selector, `bestaudio/best` picks audio-only and falls back to the best muxed stream.
    pub format: String,
    pub timeout_seconds: u64,
    pub retries: u32,
    pub quiet: bool,
    pub postprocess: PostProcess,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            format: "bestaudio/best".to_string(),
            timeout_seconds: 10,
            retries: 2,
            quiet: true,
            postprocess: PostProcess::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcess {
    pub codec: AudioCodec,
    pub bitrate_kbps: u32,
}

impl Default for PostProcess {
    fn default() -> Self {
        Self {
            codec: AudioCodec::Mp3,
            bitrate_kbps: 192,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Mp3,
}

impl AudioCodec {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
