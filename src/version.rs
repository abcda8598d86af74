//! Harness version information.
//!
//! The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time. Prefer this constant over repeating
//! `env!("CARGO_PKG_VERSION")`.

/// The ctest version string (for example, `1.0.0`).
pub const CTEST_VERSION: &str = env!("CARGO_PKG_VERSION");
