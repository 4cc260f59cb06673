//! Adapters for the outbound ports.

pub mod memory;

pub use memory::{InMemoryAcademicHistory, StudentHistory};
