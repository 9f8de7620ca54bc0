use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::ingestor::ImportSettings;
use crate::models::{MergeOptions, Precedence, TuningFrequency};
use crate::utils::time::{parse_time_offset, SourceTimezone};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub midnight: MidnightConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub imports: Vec<ImportConfig>,
    /// Tuning frequencies of the run; the first one decides midnight handling
    #[serde(default)]
    pub frequencies: Vec<TuningFrequency>,
}

/// Run-wide merge behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub precedence: Precedence,
    #[serde(default)]
    pub append_only: bool,
}

impl MergeConfig {
    pub fn options(&self) -> MergeOptions {
        MergeOptions::new(self.precedence, self.append_only)
    }
}

/// Where broadcast-collected stations are read from and the result written to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_broadcast_input")]
    pub input: PathBuf,
    #[serde(default = "default_broadcast_output")]
    pub output: PathBuf,
}

/// One XMLTV file to import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub path: PathBuf,
    /// Named timezone or UTC offset programme times are converted into
    #[serde(default = "default_import_timezone")]
    pub timezone: String,
    /// Shift applied after conversion, e.g. "+1h" or "-30m"
    #[serde(default = "default_import_time_offset")]
    pub time_offset: String,
    /// Match this file's channels by name only
    #[serde(default)]
    pub use_name_for_merge: bool,
    /// Mark imported programmes as excluded from metadata lookup
    #[serde(default)]
    pub no_lookup: bool,
    /// Overrides `merge.append_only` for this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_only: Option<bool>,
}

impl ImportConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timezone: default_import_timezone(),
            time_offset: default_import_time_offset(),
            use_name_for_merge: false,
            no_lookup: false,
            append_only: None,
        }
    }

    /// Parsed timezone and offset together with the per-file flags
    pub fn settings(&self) -> AppResult<ImportSettings> {
        Ok(ImportSettings {
            timezone: SourceTimezone::parse(&self.timezone)?,
            time_offset: parse_time_offset(&self.time_offset)?,
            use_name_for_merge: self.use_name_for_merge,
            no_lookup: self.no_lookup,
        })
    }

    /// Merge options for this file given the run-wide ones
    pub fn merge_options(&self, base: &MergeOptions) -> MergeOptions {
        MergeOptions::new(base.precedence, self.append_only.unwrap_or(base.append_only))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MidnightConfig {
    /// Force midnight-split handling on or off instead of deriving it from
    /// the first frequency's collection type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_broadcast_input() -> PathBuf {
    PathBuf::from(DEFAULT_BROADCAST_INPUT)
}

fn default_broadcast_output() -> PathBuf {
    PathBuf::from(DEFAULT_BROADCAST_OUTPUT)
}

fn default_import_timezone() -> String {
    DEFAULT_IMPORT_TIMEZONE.to_string()
}

fn default_import_time_offset() -> String {
    DEFAULT_IMPORT_TIME_OFFSET.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            input: default_broadcast_input(),
            output: default_broadcast_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load_from_file(config_file: &Path) -> AppResult<Self> {
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }

    /// Check settings that would otherwise only fail once a file is loaded
    pub fn validate(&self) -> AppResult<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(AppError::configuration(format!(
                "Invalid log level '{}', expected one of {:?}",
                self.logging.level, VALID_LOG_LEVELS
            )));
        }

        for import in &self.imports {
            import.settings().map_err(|e| {
                AppError::configuration(format!("Import '{}': {}", import.path.display(), e))
            })?;
        }

        Ok(())
    }
}
