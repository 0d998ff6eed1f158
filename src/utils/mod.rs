use std::path::{Path, PathBuf};

pub fn sanitize_filename(filename: &str) -> String {
    // Remove or replace characters that are invalid in filenames
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '-',
            '$' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // A title of only dots would resolve to the directory itself
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape a literal for use inside a yt-dlp output template.
pub fn escape_template_literal(literal: &str) -> String {
    literal.replace('%', "%%")
}

/// `<dir>/<sanitized title>.<ext>`
pub fn audio_output_path(output_dir: &Path, title: &str, ext: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", sanitize_filename(title), ext))
}

/// `<dir>/%(title)s.%(ext)s`, with the title left for yt-dlp to fill in and sanitize.
pub fn output_template(output_dir: &Path) -> String {
    let dir = escape_template_literal(&output_dir.to_string_lossy());
    Path::new(&dir)
        .join("%(title)s.%(ext)s")
        .to_string_lossy()
        .into_owned()
}

/// Pick the most useful line of an external tool's stderr for an error report.
pub fn last_error_line(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
}
