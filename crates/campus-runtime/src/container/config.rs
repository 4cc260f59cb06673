//! # Core Configuration
//!
//! One configuration for every Campus-Core service, loaded once at startup
//! and handed to each service at construction.
//!
//! ## Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CC_DATA_FILE` | `./data/campus-core.db` | Store file |
//! | `CC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `CC_JSON_LOGS` | `false` | JSON log lines on stderr |
//! | `CC_REQUIRE_PROMOTION_RULES` | `false` | Refuse to freeze rule sets without promotion rules |
//! | `CC_MIN_REASON_LEN` | `0` | Minimum override reason length (blank is always rejected) |
//! | `CC_REQUIRE_DOCUMENT_REF` | `false` | Overrides need a document reference |
//! | `CC_APPROVERS` | empty | Comma-separated user ids allowed to approve overrides |

use cc_02_freeze_engine::FreezeConfig;
use cc_04_override_ledger::OverrideConfig;
use shared_types::UserId;
use std::path::PathBuf;
use thiserror::Error;

/// Complete Campus-Core configuration.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub freeze: FreezeConfig,
    pub overrides: OverrideConfig,
    /// Users allowed to approve overrides.
    pub approvers: Vec<UserId>,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/campus-core.db"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cc_02_freeze_engine=debug`.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed.
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Store file path is empty.
    #[error("data file path must not be empty")]
    EmptyDataFile,

    /// Override policy settings cannot work together.
    #[error("override policy is inconsistent: {0}")]
    InconsistentPolicy(String),
}

impl CoreConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("CC_DATA_FILE") {
            config.storage.data_file = PathBuf::from(path);
        }
        if let Some(level) = lookup("CC_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.logging.level = level;
        }
        if let Some(value) = lookup("CC_JSON_LOGS") {
            config.logging.json = parse_flag("CC_JSON_LOGS", &value)?;
        }
        if let Some(value) = lookup("CC_REQUIRE_PROMOTION_RULES") {
            config.freeze = config
                .freeze
                .with_require_promotion_rules(parse_flag("CC_REQUIRE_PROMOTION_RULES", &value)?);
        }
        if let Some(value) = lookup("CC_MIN_REASON_LEN") {
            let len = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    var: "CC_MIN_REASON_LEN",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.overrides = config.overrides.with_min_reason_len(len);
        }
        if let Some(value) = lookup("CC_REQUIRE_DOCUMENT_REF") {
            config.overrides = config
                .overrides
                .with_require_document_ref(parse_flag("CC_REQUIRE_DOCUMENT_REF", &value)?);
        }
        if let Some(value) = lookup("CC_APPROVERS") {
            config.approvers = parse_approvers(&value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.data_file = path.into();
        self
    }

    pub fn with_approvers(mut self, approvers: Vec<UserId>) -> Self {
        self.approvers = approvers;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataFile);
        }
        if self.overrides.max_append_attempts == 0 {
            return Err(ConfigError::InconsistentPolicy(
                "max_append_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_approvers(value: &str) -> Result<Vec<UserId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e: uuid::Error| ConfigError::InvalidValue {
                var: "CC_APPROVERS",
                value: s.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
