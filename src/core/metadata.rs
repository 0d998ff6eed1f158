use serde::{Deserialize, Serialize};

/// The subset of probe metadata this tool cares about.
///
/// Field names follow yt-dlp's info dict so the probe JSON deserializes directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Container extension of the source media, before transcoding.
    pub ext: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub webpage_url: Option<String>,
    /// Where the engine would write the media, rendered from the output template.
    pub filename: Option<String>,
}

impl MediaInfo {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// The title, if present and not blank.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
