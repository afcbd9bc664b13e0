use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Default endpoint records are fetched from
pub const DEFAULT_BASE_URL: &str = "http://agent.ringcloud.et/crm";

/// Main configuration structure for CRM-Harvest
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults of the reference extraction job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Inclusive identifier range to extract
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// First identifier to fetch
    pub start: u64,

    /// Last identifier to fetch (inclusive)
    pub end: u64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            start: 1000,
            end: 70000,
        }
    }
}

impl RangeConfig {
    /// Number of identifiers in the range, or zero when `end < start`
    pub fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Returns true if the range contains no identifiers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL; identifiers are appended as the last path segment
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Value of the User-Agent header identifying this client
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: f64,

    /// Pause after each attempt (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: f64,

    /// Number of parallel workers
    pub concurrency: u32,

    /// How long in-flight requests may run on after an interruption (seconds)
    #[serde(rename = "grace-period-secs")]
    pub grace_period_secs: f64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10.0,
            delay_secs: 0.1,
            concurrency: 4,
            grace_period_secs: 5.0,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period_secs)
    }
}

/// Backend used to persist individual records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// One `record_{id}.txt` file per identifier
    #[default]
    Files,

    /// One row per identifier in a SQLite database
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving records and the summary
    pub directory: String,

    /// Whether successful payloads are persisted individually
    #[serde(rename = "save-records")]
    pub save_records: bool,

    /// Record storage backend
    pub format: SinkFormat,

    /// Summary file name inside `directory`
    #[serde(rename = "summary-file")]
    pub summary_file: String,

    /// Database file name inside `directory` (sqlite format only)
    #[serde(rename = "database-file")]
    pub database_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "crm_data".to_string(),
            save_records: true,
            format: SinkFormat::Files,
            summary_file: "summary.json".to_string(),
            database_file: "records.db".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn summary_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.summary_file)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.database_file)
    }
}
