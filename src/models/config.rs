//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Page to watch and how to fetch it
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the posts live in the page
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Poll interval
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Snapshot store backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound mail settings
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Health listener
    #[serde(default)]
    pub health: HealthConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    ///
    /// Mail credentials are not checked; a missing password surfaces when
    /// a notification is sent.
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            return Err(AppError::config("source.url is empty"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::config(format!("source.url is invalid: {e}")))?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::config("source.timeout_secs must be > 0"));
        }
        if self.smtp.timeout_secs == 0 {
            return Err(AppError::config("smtp.timeout_secs must be > 0"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::config("schedule.interval_secs must be > 0"));
        }
        if self.extractor.link_attr.trim().is_empty() {
            return Err(AppError::config("extractor.link_attr is empty"));
        }
        for selector in self.extractor.selectors() {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        match self.storage.backend {
            StorageBackend::Local if self.storage.path.trim().is_empty() => {
                Err(AppError::config("storage.path is empty"))
            }
            StorageBackend::S3 if self.storage.bucket.is_none() => {
                Err(AppError::config("storage.bucket is required for the s3 backend"))
            }
            _ => Ok(()),
        }
    }
}

/// Source page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the results listing
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// CSS selectors locating posts in the page.
///
/// The container must match; within it each group is visited in document
/// order, each entry within a group in document order, and the first link
/// of an entry becomes a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "defaults::container_selector")]
    pub container_selector: String,

    #[serde(default = "defaults::group_selector")]
    pub group_selector: String,

    #[serde(default = "defaults::entry_selector")]
    pub entry_selector: String,

    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// HTML attribute holding the link target
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,
}

impl ExtractorConfig {
    /// All selector strings, in nesting order.
    pub fn selectors(&self) -> [&str; 4] {
        [
            self.container_selector.as_str(),
            self.group_selector.as_str(),
            self.entry_selector.as_str(),
            self.link_selector.as_str(),
        ]
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            container_selector: defaults::container_selector(),
            group_selector: defaults::group_selector(),
            entry_selector: defaults::entry_selector(),
            link_selector: defaults::link_selector(),
            link_attr: defaults::link_attr(),
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Which snapshot store to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file on local disk
    #[default]
    Local,
    /// Single object in an S3 bucket
    S3,
}

impl std::str::FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(AppError::config(format!("unknown storage backend '{other}'"))),
        }
    }
}

/// Snapshot store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// File path for the local backend
    #[serde(default = "defaults::data_file")]
    pub path: String,

    /// Bucket for the s3 backend
    #[serde(default)]
    pub bucket: Option<String>,

    /// Object key for the s3 backend
    #[serde(default = "defaults::data_file")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            path: defaults::data_file(),
            bucket: None,
            key: defaults::data_file(),
        }
    }
}

/// Outbound mail settings.
///
/// Credentials and addresses are optional here; sending without them is a
/// notification failure, not a startup failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "defaults::smtp_server")]
    pub server: String,

    #[serde(default = "defaults::smtp_port")]
    pub port: u16,

    /// Login user (also the sender when `from` is unset)
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender address
    #[serde(default)]
    pub from: Option<String>,

    /// Single recipient address
    #[serde(default)]
    pub recipient: Option<String>,

    /// SMTP session timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl SmtpConfig {
    /// Sender address, falling back to the login user.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: defaults::smtp_server(),
            port: defaults::smtp_port(),
            username: None,
            password: None,
            from: None,
            recipient: None,
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Health listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "defaults::health_host")]
    pub host: String,

    #[serde(default = "defaults::health_port")]
    pub port: u16,

    /// Re-fetch the source page on every health request
    #[serde(default)]
    pub probe: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            host: defaults::health_host(),
            port: defaults::health_port(),
            probe: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn source_url() -> String {
        "https://www.sarkariresult.com/".into()
    }
    pub fn user_agent() -> String {
        concat!("Mozilla/5.0 (compatible; results-watcher/", env!("CARGO_PKG_VERSION"), ")").into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn container_selector() -> String {
        "div#post".into()
    }
    pub fn group_selector() -> String {
        "ul".into()
    }
    pub fn entry_selector() -> String {
        "li".into()
    }
    pub fn link_selector() -> String {
        "a[href]".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }

    pub fn interval() -> u64 {
        5
    }

    pub fn data_file() -> String {
        "sarkari_results_data.json".into()
    }

    pub fn smtp_server() -> String {
        "smtp.mailer91.com".into()
    }
    pub fn smtp_port() -> u16 {
        587
    }

    pub fn health_host() -> String {
        "0.0.0.0".into()
    }
    pub fn health_port() -> u16 {
        10000
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
