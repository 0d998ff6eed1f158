use crate::config::FetchOptions;
use crate::core::{FetchError, MediaInfo};
use async_trait::async_trait;

/// The metadata/download engine behind a fetch.
///
/// `output_template` is the engine's own filename pattern (`%(title)s`,
/// `%(ext)s`). `probe` must not transfer media and reports in
/// [`MediaInfo::filename`] where that template would place the file.
/// `download` fetches the media, runs the audio post-processing described by
/// `options.postprocess`, and writes the result through the same template.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn probe(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<MediaInfo, FetchError>;

    async fn download(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<(), FetchError>;
}
