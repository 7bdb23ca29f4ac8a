//! Ledger configuration.

use std::path::PathBuf;

use passbook_common::{LedgerError, Result};

/// Default name of the persistence file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "bank.data";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// File the whole bank is saved to and restored from.
    pub data_file: PathBuf,
    /// Save the bank when the owning process finishes its work.
    pub save_on_exit: bool,
    /// Log level.
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            save_on_exit: false,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("PASSBOOK_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        if let Ok(flag) = std::env::var("PASSBOOK_SAVE_ON_EXIT") {
            if let Some(flag) = parse_flag(&flag) {
                config.save_on_exit = flag;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let path = self.data_file.as_os_str();
        if path.is_empty() {
            return Err(LedgerError::Configuration(
                "Data file path cannot be empty".to_string(),
            ));
        }

        if self.data_file.file_name().is_none() || path.to_string_lossy().ends_with('/') {
            return Err(LedgerError::Configuration(format!(
                "Data file path must name a file: {}",
                self.data_file.display()
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(LedgerError::Configuration(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
