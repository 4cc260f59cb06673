//! Cross-subsystem flows.

mod checksum_properties;
mod freeze_flow;
mod override_flow;
mod persistence;
mod promotion_flow;
