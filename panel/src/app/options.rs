//! Application configuration options

use std::time::Duration;

use crate::catalog::loader::CatalogSource;
use crate::deploy::monitor::MonitorOptions;
use crate::logs::{LogLevel, LogOptions};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{ApiSettings, Settings};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Storage layout paths
    pub layout: StorageLayout,

    /// Workflow API configuration
    pub api: ApiSettings,

    /// Template catalog location
    pub catalog: CatalogSource,

    /// Git ref workflows are dispatched against
    pub git_ref: String,

    /// Delay between dispatch and the first status check
    pub start_delay: Duration,

    /// Monitor options
    pub monitor: MonitorOptions,

    /// Logging options
    pub log: LogOptions,
}

impl AppOptions {
    /// Derive options from the settings file contents
    pub fn from_settings(layout: StorageLayout, settings: &Settings) -> Self {
        let log = LogOptions {
            log_level: settings.log_level.clone(),
            json_format: settings.log_json,
            log_dir: settings.log_to_file.then(|| layout.logs_dir()),
            ..Default::default()
        };

        Self {
            api: settings.api.clone(),
            catalog: CatalogSource::parse(&settings.catalog.source),
            git_ref: settings.dispatch.git_ref.clone(),
            start_delay: Duration::from_secs(settings.dispatch.start_delay_secs),
            monitor: MonitorOptions::from(&settings.monitor),
            log,
            layout,
        }
    }

    /// Override the log level from the command line
    pub fn with_log_level(mut self, level: Option<LogLevel>) -> Self {
        if let Some(level) = level {
            self.log.log_level = level;
        }
        self
    }
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(StorageLayout::default(), &Settings::default())
    }
}
