use url::Url;

/// Hosts that block or throttle automated clients and only produce noise.
pub const NOISY_HOST_SUFFIXES: &[&str] = &[
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "claude.ai",
    "linkedin.com",
    "businesswire.com",
    "translate.google.com",
];

/// Local development addresses that leak into generated pages.
pub const LOCAL_SUBSTRINGS: &[&str] = &["0.0.0.0", "127.0.0.1"];

#[derive(Debug, Clone)]
pub struct IgnoreList {
    host_suffixes: Vec<String>,
    substrings: Vec<String>,
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(NOISY_HOST_SUFFIXES, LOCAL_SUBSTRINGS)
    }
}

impl IgnoreList {
    pub fn new(host_suffixes: &[&str], substrings: &[&str]) -> Self {
        Self {
            host_suffixes: host_suffixes.iter().map(|s| s.to_lowercase()).collect(),
            substrings: substrings.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn is_ignored(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        if self.substrings.iter().any(|s| lower.contains(s.as_str())) {
            return true;
        }

        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        self.host_suffixes.iter().any(|suffix| host.ends_with(suffix.as_str()))
    }
}
