//! # Service Container
//!
//! Configuration loading and dependency wiring for the `campus-core` binary.

pub mod config;
pub mod services;

pub use config::{ConfigError, CoreConfig, LoggingConfig, StorageConfig};
pub use services::CoreContainer;
