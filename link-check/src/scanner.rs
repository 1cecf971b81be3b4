use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href=["'](https?://[^"']+)["']"#).expect("valid link regex"));

/// Absolute http(s) link targets found in `href` attributes.
pub fn extract_links(html: &str) -> impl Iterator<Item = &str> {
    LINK_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html"))
        .unwrap_or(false)
}

/// Every distinct external link in the HTML files under `root`, sorted.
///
/// Symlinks are not followed, so a link back into the tree cannot loop.
pub fn find_links(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        warn!("Site directory {} does not exist, nothing to scan", root.display());
        return Vec::new();
    }

    let mut links = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error walking {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_html(path) {
            continue;
        }
        match fs::read_to_string(path) {
            Ok(text) => {
                let before = links.len();
                links.extend(extract_links(&text).map(str::to_string));
                debug!("{}: {} new links", path.display(), links.len() - before);
            }
            Err(e) => error!("Error reading {}: {}", path.display(), e),
        }
    }
    links.into_iter().collect()
}
