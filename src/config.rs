use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::feed::Feed;

/// Entries stay fresh for a day unless configured otherwise.
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 24 * 60 * 60;

const MAX_CACHE_DURATION_SECS: u64 = 365 * 24 * 60 * 60;
const CACHE_FILE_NAME: &str = "cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Cache file location; the platform cache directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Seconds a fetched feed is served from the cache before it is refetched.
    #[serde(default = "default_cache_duration")]
    pub duration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, fall back to defaults otherwise, then
    /// apply environment overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(Error::Config("Feed name cannot be empty".to_string()));
            }
            if !names.insert(feed.name.as_str()) {
                return Err(Error::Config(format!("Duplicate feed name '{}'", feed.name)));
            }
            url::Url::parse(&feed.url).map_err(|_| Error::InvalidUrl(feed.url.clone()))?;
        }

        if self.cache.duration == 0 {
            return Err(Error::Config("Cache duration must be greater than 0".to_string()));
        }

        if self.cache.duration > MAX_CACHE_DURATION_SECS {
            return Err(Error::Config(format!(
                "Cache duration must be at most {} seconds",
                MAX_CACHE_DURATION_SECS
            )));
        }

        if self.fetch.timeout == 0 {
            return Err(Error::Config("Fetch timeout must be greater than 0".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(duration) = std::env::var("TERMFEED_CACHE_DURATION") {
            if let Ok(val) = duration.parse() {
                self.cache.duration = val;
            }
        }

        if let Ok(timeout) = std::env::var("TERMFEED_FETCH_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                self.fetch.timeout = val;
            }
        }

        if let Ok(level) = std::env::var("TERMFEED_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn find_feed(&self, name: &str) -> Option<&Feed> {
        self.feeds.iter().find(|feed| feed.name == name)
    }

    /// Where the article cache lives for this configuration.
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::cache_dir()?.join(CACHE_FILE_NAME)),
        }
    }

    pub fn cache_duration(&self) -> Result<chrono::Duration> {
        i64::try_from(self.cache.duration)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| Error::Config(format!("Cache duration {} is out of range", self.cache.duration)))
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("termfeed"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|dir| dir.join("termfeed"))
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))
    }

    pub fn default_config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            fetch: FetchSettings::default(),
            logging: LoggingConfig::default(),
            feeds: Vec::new(),
        }
    }
}

impl FetchSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: None,
            duration: default_cache_duration(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
            log_file: default_log_file(),
            json_format: false,
        }
    }
}

fn default_cache_duration() -> u64 { DEFAULT_CACHE_DURATION_SECS }
fn default_timeout() -> u64 { 30 }
fn default_user_agent() -> String {
    format!("termfeed/{}", env!("CARGO_PKG_VERSION"))
}
fn default_log_level() -> String { "warn".to_string() }
fn default_log_file() -> String { "logs/termfeed.log".to_string() }
