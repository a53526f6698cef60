use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::fetcher::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://www.espn.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Sent with every request, after the user agent.
    pub headers: Vec<(String, String)>,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        let headers = [
            ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
            ("Accept-Language", "en-US,en;q=0.9"),
            ("Cache-Control", "no-cache"),
            ("Dnt", "1"),
            ("Pragma", "no-cache"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "same-origin"),
            ("Sec-Fetch-User", "?1"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            headers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub deadline_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            deadline_secs: 120,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms.max(self.initial_backoff_ms)),
            deadline: Duration::from_secs(self.deadline_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// Raw payload snapshots are written here; `None` disables them.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            snapshot_dir: Some(PathBuf::from("./data")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub scraping: ScrapingConfig,
    pub retry: RetryConfig,
    pub pool: PoolConfig,
    pub output: OutputConfig,
    pub season_year: i32,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("SCRAPER_BASE_URL") {
            config.scraping.base_url = base_url;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = env_parse("SCRAPER_TIMEOUT_SECS") {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Some(attempts) = env_parse("SCRAPER_MAX_RETRIES") {
            config.retry.max_attempts = attempts;
        }
        if let Some(backoff) = env_parse("SCRAPER_INITIAL_BACKOFF_MS") {
            config.retry.initial_backoff_ms = backoff;
        }
        if let Some(backoff) = env_parse("SCRAPER_MAX_BACKOFF_MS") {
            config.retry.max_backoff_ms = backoff;
        }
        if let Some(deadline) = env_parse("SCRAPER_DEADLINE_SECS") {
            config.retry.deadline_secs = deadline;
        }
        if let Some(workers) = env_parse::<usize>("SCRAPER_WORKERS") {
            config.pool.workers = workers.max(1);
        }
        if let Ok(dir) = env::var("SCRAPER_OUTPUT_DIR") {
            config.output.output_dir = PathBuf::from(dir);
        }
        // An empty value turns snapshots off.
        if let Ok(dir) = env::var("SCRAPER_SNAPSHOT_DIR") {
            config.output.snapshot_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(year) = env_parse("SCRAPER_SEASON_YEAR") {
            config.season_year = year;
        }

        config
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            scraping: ScrapingConfig::default(),
            retry: RetryConfig::default(),
            pool: PoolConfig::default(),
            output: OutputConfig::default(),
            season_year: chrono::Utc::now().year(),
        }
    }
}
