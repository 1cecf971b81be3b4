use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};

use link_check::config::Config;
use link_check::ignore::IgnoreList;
use link_check::scanner::find_links;

struct TempSite {
    dir: TempDir,
}

impl TempSite {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
        }
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[test]
fn test_links_are_collected_from_nested_pages() {
    let site = TempSite::new();
    site.write(
        "index.html",
        r#"<a href="https://github.com/jaab">GitHub</a>
           <a href='https://www.linkedin.com/company/jaab'>LinkedIn</a>
           <a href="/en/">English</a>"#,
    );
    site.write(
        "en/solutions/payments/index.HTML",
        r#"<a href="https://github.com/jaab">again</a>
           <a href="https://docs.example.org/api">docs</a>"#,
    );
    site.write("feed.xml", r#"<link href="https://ignored.example/feed"/>"#);

    let links = find_links(site.path());
    assert_eq!(
        links,
        vec![
            "https://docs.example.org/api",
            "https://github.com/jaab",
            "https://www.linkedin.com/company/jaab",
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    use std::os::unix::fs::symlink;

    let site = TempSite::new();
    site.write("index.html", r#"<a href="https://a.example/">a</a>"#);
    site.write("en/index.html", r#"<a href="https://b.example/">b</a>"#);
    symlink(site.path(), site.path().join("en/loop")).unwrap();

    let outside = TempSite::new();
    outside.write("draft.html", r#"<a href="https://draft.example/">draft</a>"#);
    symlink(
        outside.path().join("draft.html"),
        site.path().join("draft.html"),
    )
    .unwrap();

    assert_eq!(
        find_links(site.path()),
        vec!["https://a.example/", "https://b.example/"]
    );
}

#[test]
fn test_empty_site_has_no_links() {
    let site = TempSite::new();
    site.write("index.html", "<p>No links here</p>");
    assert!(find_links(site.path()).is_empty());
}

#[tokio::test]
async fn test_run_with_only_noisy_links_succeeds() {
    let site = TempSite::new();
    site.write(
        "index.html",
        r#"<link href="https://fonts.googleapis.com/css2?family=Inter" rel="stylesheet">
           <a href="http://127.0.0.1:4000/">local preview</a>"#,
    );

    let config = Config::default().with_root_arg(Some(site.path().display().to_string()));
    let report = link_check::run(&config, &IgnoreList::default()).await.unwrap();
    assert!(report.outcomes().is_empty());
    assert_eq!(report.exit_code(), 0);
}
