use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Resolve the command-line source into the ordered list of URLs to process.
///
/// An existing file is read as one URL per line; anything else is taken as a
/// single URL. Entries are not validated here.
pub async fn load_urls(source: &str) -> Result<Vec<String>> {
    let path = Path::new(source);
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);

    if !is_file {
        debug!("Treating source as a single URL");
        return Ok(vec![source.to_string()]);
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    let urls = parse_url_list(&raw);
    debug!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Trimmed, non-blank lines in file order.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
