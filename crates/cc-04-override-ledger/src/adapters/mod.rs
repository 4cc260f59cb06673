//! Adapters for the outbound ports.

pub mod directory;

pub use directory::StaticApproverDirectory;
