//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::PanelError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Panel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    /// Also write logs under the layout's log directory
    #[serde(default)]
    pub log_to_file: bool,

    /// Workflow API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Template catalog configuration
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Dispatch configuration
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSettings,
}

impl Settings {
    /// Load settings from `file`, falling back to defaults when it does not exist
    pub async fn load_or_default(file: &File) -> Result<Self, PanelError> {
        match file.read_json_opt::<Settings>().await {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => {
                debug!("No settings file at {:?}, using defaults", file.path());
                Ok(Settings::default())
            }
            Err(e) => Err(PanelError::ConfigError(format!(
                "Unable to read settings file {:?}: {}",
                file.path(),
                e
            ))),
        }
    }
}

/// Workflow API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL for the API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Accept header, pinned to an API version
    #[serde(default = "default_accept")]
    pub accept: String,

    /// User-Agent header (required by the API)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_accept() -> String {
    "application/vnd.github.v3+json".to_string()
}

fn default_user_agent() -> String {
    format!("goldpath/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            accept: default_accept(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Template catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Path or http(s) URL of the catalog document
    #[serde(default = "default_catalog_source")]
    pub source: String,
}

fn default_catalog_source() -> String {
    "templates.json".to_string()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: default_catalog_source(),
        }
    }
}

/// Dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Git ref the workflow is dispatched against
    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    /// Delay before the first status check, in seconds
    #[serde(default = "default_start_delay")]
    pub start_delay_secs: u64,
}

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_start_delay() -> u64 {
    5
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            git_ref: default_git_ref(),
            start_delay_secs: default_start_delay(),
        }
    }
}

/// Monitoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Seconds between status checks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Maximum number of checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Consecutive failed checks before aborting
    #[serde(default = "default_max_errors")]
    pub max_consecutive_errors: u32,

    /// Runs requested per listing
    #[serde(default = "default_per_page")]
    pub runs_per_page: u8,
}

fn default_interval() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    120
}

fn default_max_errors() -> u32 {
    5
}

fn default_per_page() -> u8 {
    5
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: default_max_attempts(),
            max_consecutive_errors: default_max_errors(),
            runs_per_page: default_per_page(),
        }
    }
}
