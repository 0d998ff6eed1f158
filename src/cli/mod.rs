use crate::backends::YtDlpBackend;
use crate::config::Config;
use crate::core::{load_urls, progress_bar, run_batch, BatchReport, Downloader};
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "mp3-batch")]
#[command(about = "Download video URLs as MP3 audio.")]
#[command(version)]
pub struct Cli {
    /// Video URL or path to a file with one URL per line
    #[arg(value_name = "SOURCE")]
    pub source: String,
}

impl Cli {
    /// Process every URL from `source`.
    ///
    /// Per-URL failures are part of the returned report, not errors.
    pub async fn run(&self) -> Result<BatchReport> {
        self.run_with_config(Config::load()?).await
    }

    pub async fn run_with_config(&self, config: Config) -> Result<BatchReport> {
        let urls = load_urls(&self.source).await?;
        info!(
            "Fetching {} URL(s) into {}",
            urls.len(),
            config.output_dir.display()
        );

        let backend = YtDlpBackend::from_config(&config);
        let downloader = Downloader::new(Box::new(backend), config.output_dir, config.fetch);

        let progress = progress_bar(urls.len());
        let report = run_batch(&downloader, &urls, &progress).await;
        println!("{}", report.summary());
        Ok(report)
    }
}
