//! Configuration management for equiptrack

use chrono::{DateTime, Days, Local, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the three collection documents
    /// (students.json, equipment.json, transactions.json).
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Optional log file; stdout only when unset.
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    /// Default expected-return time of day, local clock.
    pub default_return_hour: u32,
    pub default_return_minute: u32,
    /// Upper bound for an uploaded student photo blob.
    pub photo_max_bytes: usize,
}

/// One group of pre-provisioned equipment: "<label> 1" .. "<label> <count>".
#[derive(Debug, Deserialize, Clone)]
pub struct SeedGroup {
    pub equipment_type: String,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default = "default_seed_groups")]
    pub seed: Vec<SeedGroup>,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix EQUIPTRACK_)
            .add_source(
                Environment::with_prefix("EQUIPTRACK")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override data directory from DATA_DIR env var if present
            .set_override_option("storage.data_dir", env::var("DATA_DIR").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl CheckoutConfig {
    /// Default expected return for a new checkout: next day at the
    /// configured local time (end of the school day).
    pub fn default_expected_return(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let tomorrow = now
            .with_timezone(&Local)
            .date_naive()
            .checked_add_days(Days::new(1))?;
        tomorrow
            .and_hms_opt(self.default_return_hour, self.default_return_minute, 0)?
            .and_local_timezone(Local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            default_return_hour: 15,
            default_return_minute: 0,
            photo_max_bytes: 500_000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            checkout: CheckoutConfig::default(),
            seed: default_seed_groups(),
        }
    }
}

/// The equipment sets the station is provisioned with out of the box.
fn default_seed_groups() -> Vec<SeedGroup> {
    vec![
        SeedGroup {
            equipment_type: "Tripod".to_string(),
            label: "WACS TRIPOD".to_string(),
            count: 8,
        },
        SeedGroup {
            equipment_type: "Microphone".to_string(),
            label: "Rode Mic".to_string(),
            count: 11,
        },
        SeedGroup {
            equipment_type: "Phone Mount".to_string(),
            label: "Phone Mount".to_string(),
            count: 10,
        },
    ]
}
