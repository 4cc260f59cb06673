//! # Domain Layer
//!
//! - `commands` - Create and update payloads with explicit field mapping
//! - `validation` - Field and cross-field rules for regulations and their rows

pub mod commands;
pub mod validation;
