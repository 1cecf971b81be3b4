use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Output directory of the site generator.
    pub root: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    /// Extra attempts per request after the first one.
    pub retries: u32,
    /// First retry delay, doubled on every further retry.
    pub backoff: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("_site"),
            concurrency: 20,
            timeout: Duration::from_secs(10),
            retries: 2,
            backoff: Duration::from_millis(600),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(n) => Ok(Some(n)),
                    Err(_) => Err(ConfigError::NotANumber { name, value }),
                },
            }
        };
        let positive = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match number(name)? {
                Some(0) => Err(ConfigError::Zero { name }),
                other => Ok(other),
            }
        };

        Ok(Self {
            root: lookup("LINK_CHECK_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            concurrency: positive("LINK_CHECK_CONCURRENCY")?
                .map(|n| n as usize)
                .unwrap_or(defaults.concurrency),
            timeout: positive("LINK_CHECK_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retries: number("LINK_CHECK_RETRIES")?
                .map(|n| n.min(u64::from(u32::MAX)) as u32)
                .unwrap_or(defaults.retries),
            backoff: number("LINK_CHECK_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
            user_agent: defaults.user_agent,
        })
    }

    /// The first command line argument wins over `LINK_CHECK_ROOT`.
    pub fn with_root_arg(mut self, arg: Option<String>) -> Self {
        if let Some(root) = arg {
            self.root = PathBuf::from(root);
        }
        self
    }
}
