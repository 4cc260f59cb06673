//! # Campus-Core Test Suite
//!
//! Unified test crate for behaviour that spans more than one subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Harness wiring every service onto one store
//! └── integration/
//!     ├── checksum_properties.rs  # Determinism, tamper detection, format
//!     ├── freeze_flow.rs          # Freeze guard, isolation, lock, atomicity
//!     ├── promotion_flow.rs       # Eligibility against frozen rules
//!     ├── override_flow.rs        # Ledger completeness and audit
//!     └── persistence.rs          # File-backed store across reopen
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cc-tests
//! cargo test -p cc-tests integration::freeze_flow
//! ```

pub mod fixtures;
pub mod integration;
