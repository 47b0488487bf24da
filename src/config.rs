use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TaskError};

pub const DEFAULT_API_URL: &str = "https://67028cf5bd7c8c1ccd3f2f52.mockapi.io/todos";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings, resolved from flags and environment by the CLI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn new(
        api_url: &str,
        timeout_secs: u64,
        log_level: &str,
        log_dir: Option<PathBuf>,
    ) -> Result<Self> {
        Ok(Config {
            api_url: normalize_api_url(api_url)?,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            log_level: log_level.trim().to_lowercase(),
            log_dir: log_dir.unwrap_or_else(default_log_dir),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: default_log_dir(),
        }
    }
}

pub fn default_log_dir() -> PathBuf {
    let home_dir = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home_dir).join(".taskboard").join("logs")
}

fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| TaskError::Config(format!("api url must start with http:// or https://, got '{raw}'")))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(TaskError::Config(format!("api url '{raw}' has no host")));
    }
    Ok(trimmed.to_string())
}
