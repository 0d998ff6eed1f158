use async_trait::async_trait;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};
use mp3_batch::config::FetchOptions;
use mp3_batch::core::{
    load_urls, render_result, run_batch, Downloader, FetchError, JobOutcome, MediaBackend,
    MediaInfo,
};
use mp3_batch::utils::sanitize_filename;

#[derive(Clone)]
enum Script {
    /// Probe returns this title; download writes the output file.
    Ok(&'static str),
    /// Probe fails, as for an unreachable or unsupported URL.
    ProbeFails,
    /// Probe succeeds, the transfer fails.
    DownloadFails(&'static str),
}

#[derive(Default, Clone)]
struct Calls {
    probes: Arc<Mutex<Vec<String>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

struct ScriptedBackend {
    scripts: HashMap<String, Script>,
    calls: Calls,
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn probe(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<MediaInfo, FetchError> {
        assert_eq!(options.timeout_seconds, 10);
        assert!(output_template.ends_with("%(title)s.%(ext)s"));
        self.calls.probes.lock().unwrap().push(url.to_string());
        match self.scripts.get(url) {
            Some(Script::Ok(title)) | Some(Script::DownloadFails(title)) => Ok(MediaInfo {
                filename: Some(render(output_template, title, "webm")),
                ..MediaInfo::with_title(*title)
            }),
            Some(Script::ProbeFails) | None => Err(FetchError::Probe(format!(
                "Unable to download webpage: {}",
                url
            ))),
        }
    }

    async fn download(
        &self,
        url: &str,
        output_template: &str,
        options: &FetchOptions,
    ) -> Result<(), FetchError> {
        assert_eq!(options.format, "bestaudio/best");
        assert_eq!(options.retries, 2);
        assert_eq!(options.postprocess.bitrate_kbps, 192);
        self.calls.downloads.lock().unwrap().push(url.to_string());
        match self.scripts.get(url) {
            Some(Script::Ok(title)) => {
                let path = render(output_template, title, "mp3");
                std::fs::write(&path, b"ID3").map_err(|e| FetchError::filesystem(&path, e))
            }
            _ => Err(FetchError::Download("HTTP Error 403: Forbidden".to_string())),
        }
    }
}

/// Fill in an output template the way yt-dlp does, expanding `$VAR`s in the
/// template before substituting the sanitized title.
fn render(template: &str, title: &str, ext: &str) -> String {
    let home = std::env::var("HOME").unwrap_or_default();
    template
        .replace("$HOME", &home)
        .replace("%(title)s", &sanitize_filename(title))
        .replace("%(ext)s", ext)
        .replace("%%", "%")
}

fn downloader(output_dir: &Path, scripts: &[(&str, Script)]) -> (Downloader, Calls) {
    let calls = Calls::default();
    let backend = ScriptedBackend {
        scripts: scripts
            .iter()
            .map(|(url, script)| (url.to_string(), script.clone()))
            .collect(),
        calls: calls.clone(),
    };
    let downloader = Downloader::new(
        Box::new(backend),
        output_dir.to_path_buf(),
        FetchOptions::default(),
    );
    (downloader, calls)
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

fn mp3_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("mp3s");
    let list = urls(&["https://valid.example/a", "https://valid.example/b"]);
    let scripts = [
        ("https://valid.example/a", Script::Ok("Song A")),
        ("https://valid.example/b", Script::Ok("Song B")),
    ];

    let (first, first_calls) = downloader(&out, &scripts);
    let report = run_batch(&first, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.downloaded(), 2);
    assert_eq!(first_calls.downloads().len(), 2);
    let files_after_first = mp3_files(&out);
    assert_eq!(files_after_first, vec!["Song A.mp3", "Song B.mp3"]);

    let (second, second_calls) = downloader(&out, &scripts);
    let report = run_batch(&second, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.downloaded(), 0);
    assert!(second_calls.downloads().is_empty());
    assert_eq!(mp3_files(&out), files_after_first);
}

#[tokio::test]
async fn test_one_bad_url_does_not_stop_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("mp3s");
    let list = urls(&[
        "https://valid.example/a",
        "not a url",
        "https://valid.example/c",
    ]);
    let (downloader, calls) = downloader(
        &out,
        &[
            ("https://valid.example/a", Script::Ok("A")),
            ("not a url", Script::ProbeFails),
            ("https://valid.example/c", Script::Ok("C")),
        ],
    );

    let report = run_batch(&downloader, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.total(), 3);
    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(calls.probes(), list);
    assert_eq!(mp3_files(&out), vec!["A.mp3", "C.mp3"]);

    let err = report.results[1].as_ref().unwrap_err();
    assert_eq!(err.url, "not a url");
    assert!(err.intended_filename.is_none());
}

#[tokio::test]
async fn test_results_follow_input_order() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("mp3s");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("Two.mp3"), b"ID3").unwrap();
    let list = urls(&["https://x.example/3", "https://x.example/2", "https://x.example/1"]);
    let (downloader, _) = downloader(
        &out,
        &[
            ("https://x.example/1", Script::Ok("One")),
            ("https://x.example/2", Script::Ok("Two")),
            ("https://x.example/3", Script::DownloadFails("Three")),
        ],
    );

    let report = run_batch(&downloader, &list, &ProgressBar::hidden()).await;
    let lines: Vec<String> = report.results.iter().map(render_result).collect();
    assert!(lines[0].starts_with("[✗] FAILED: https://x.example/3"));
    assert!(lines[0].contains(&format!("Intended output: {}", out.join("Three.mp3").display())));
    assert!(lines[0].contains("HTTP Error 403: Forbidden"));
    assert!(lines[1].starts_with("[↷] Skipped (already exists):"));
    assert!(lines[2].starts_with("[✓] Downloaded and converted:"));
}

#[tokio::test]
async fn test_existing_file_means_no_network_download() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("mp3s");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("Song.mp3"), b"ID3").unwrap();
    let (downloader, calls) =
        downloader(&out, &[("https://valid.example/song", Script::Ok("Song"))]);

    let outcome = assert_ok!(downloader.fetch("https://valid.example/song").await);
    assert_eq!(outcome, JobOutcome::Skipped(out.join("Song.mp3")));
    assert!(calls.downloads().is_empty());
}

#[tokio::test]
async fn test_file_source_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let list_path = tmp.path().join("urls.txt");
    std::fs::write(
        &list_path,
        "https://valid.example/a\n\n   \nhttps://broken.example/b\n",
    )
    .unwrap();

    let list = assert_ok!(load_urls(list_path.to_str().unwrap()).await);
    assert_eq!(list, vec!["https://valid.example/a", "https://broken.example/b"]);

    let out = tmp.path().join("mp3s");
    let (downloader, _) = downloader(&out, &[("https://valid.example/a", Script::Ok("A"))]);
    let report = run_batch(&downloader, &list, &ProgressBar::hidden()).await;

    assert!(matches!(report.results[0], Ok(JobOutcome::Downloaded(_))));
    let err = assert_err!(&report.results[1]);
    assert_eq!(err.intended_display().to_string(), "unknown");
}

#[tokio::test]
async fn test_output_dir_is_created() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("nested").join("mp3s");
    let (downloader, _) = downloader(&out, &[]);

    let list = urls(&["https://nowhere.example"]);
    let report = run_batch(&downloader, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.failed(), 1);
    assert!(out.is_dir());
}

#[tokio::test]
async fn test_title_with_shell_variable_is_fetched_once() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("mp3s");
    let list = urls(&["https://valid.example/home"]);
    let scripts = [("https://valid.example/home", Script::Ok("Best of $HOME"))];

    let (first, _) = downloader(&out, &scripts);
    let report = run_batch(&first, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.downloaded(), 1, "{}", report.summary());
    assert_eq!(mp3_files(&out), vec!["Best of _HOME.mp3"]);

    let (second, second_calls) = downloader(&out, &scripts);
    let report = run_batch(&second, &list, &ProgressBar::hidden()).await;
    assert_eq!(report.skipped(), 1, "{}", report.summary());
    assert!(second_calls.downloads().is_empty());
    assert_eq!(mp3_files(&out), vec!["Best of _HOME.mp3"]);
}
