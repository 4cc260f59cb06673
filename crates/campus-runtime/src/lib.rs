//! # Campus-Core Runtime Library
//!
//! Exposes the internals of the `campus-core` binary for testing. The entry
//! point is `main.rs`.
//!
//! ## Modules
//!
//! - `container/` - `CoreConfig` loading and service wiring
//! - `logging` - tracing subscriber setup
//! - `cli` - clap command definitions
//! - `commands` - command dispatch onto the services
//! - `import` - regulation import files

pub mod cli;
pub mod commands;
pub mod container;
pub mod import;
pub mod logging;

pub use container::{ConfigError, CoreConfig, CoreContainer};
