use crate::core::{DiagnosticError, Downloader, JobOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use tracing::{debug, info, warn};

/// Result of one URL, in the order it was processed.
pub type JobResult = Result<JobOutcome, DiagnosticError>;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(JobOutcome::Skipped(_))))
            .count()
    }

    pub fn downloaded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(JobOutcome::Downloaded(_))))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} processed: {} downloaded, {} skipped, {} failed",
            self.total(),
            self.downloaded(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Status lines for one job, as shown to the user.
pub fn render_result(result: &JobResult) -> String {
    match result {
        Ok(outcome) => outcome.to_string(),
        Err(err) => format!(
            "[✗] FAILED: {}\n    → Intended output: {}\n    → Error: {}",
            err.url,
            err.intended_display(),
            err.message()
        ),
    }
}

pub fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let template = "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed_precise}]";
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style);
    }
    bar.set_message("Processing videos");
    bar
}

/// Run every URL through `downloader`, one after another.
///
/// A failed URL is reported and the loop moves on; the batch itself cannot fail.
pub async fn run_batch(
    downloader: &Downloader,
    urls: &[String],
    progress: &ProgressBar,
) -> BatchReport {
    if let Err(e) = tokio::fs::create_dir_all(downloader.output_dir()).await {
        // Each job retries the directory and reports the failure itself.
        warn!(
            "Could not create {}: {}",
            downloader.output_dir().display(),
            e
        );
    }

    let mut report = BatchReport::default();
    for url in urls {
        let result = downloader.fetch(url).await;
        if let Err(err) = &result {
            debug!("{:?}", err);
        }
        emit(progress, &mut std::io::stdout(), &render_result(&result));
        report.results.push(result);
        progress.inc(1);
    }
    progress.finish();

    info!("{}", report.summary());
    report
}

/// Write a report line to `out` with the bar cleared, so the bar's own draw
/// target never receives it.
fn emit<W: Write>(progress: &ProgressBar, out: &mut W, line: &str) {
    progress.suspend(|| {
        if let Err(e) = writeln!(out, "{}", line) {
            debug!("Could not write report line: {}", e);
        }
    });
}
