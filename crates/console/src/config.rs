use std::path::PathBuf;
use std::time::Duration;

use stationdesk_client::config::{parse_var, ClientConfig, ConfigError};
use stationdesk_core::table::state::DEFAULT_PAGE_SIZE;

use crate::debounce::DEFAULT_QUIET_PERIOD;

/// Default title of the snapshot CSV.
pub const DEFAULT_SNAPSHOT_TITLE: &str = "unassigned_staff";

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub client: ClientConfig,
    pub search_debounce: Duration,
    pub default_page_size: usize,
    pub snapshot_dir: PathBuf,
    pub snapshot_title: String,
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default            |
    /// |----------------------|--------------------|
    /// | `SEARCH_DEBOUNCE_MS` | `1500`             |
    /// | `DEFAULT_PAGE_SIZE`  | `10`               |
    /// | `SNAPSHOT_DIR`       | `.`                |
    /// | `SNAPSHOT_TITLE`     | `unassigned_staff` |
    ///
    /// plus the client variables of [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client = ClientConfig::from_lookup(&lookup)?;

        let debounce_ms = parse_var(
            &lookup,
            "SEARCH_DEBOUNCE_MS",
            DEFAULT_QUIET_PERIOD.as_millis() as u64,
        )?;

        let default_page_size: usize = parse_var(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if default_page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_PAGE_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let snapshot_dir = lookup("SNAPSHOT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let snapshot_title = lookup("SNAPSHOT_TITLE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_TITLE.to_string());

        Ok(Self {
            client,
            search_debounce: Duration::from_millis(debounce_ms),
            default_page_size,
            snapshot_dir,
            snapshot_title,
        })
    }
}
