#![forbid(unsafe_code)]
//! Functional test harness for single-file C programs.
//!
//! `ctest` compiles one C source file, runs the executable against every `pos_NN_in.txt` / `neg_NN_in.txt` fixture
//! in a tests directory, compares the results with the paired `*_out.txt` files and finally runs a coverage tool.
//! Fixture naming, pairing and the pass/fail rule live in the I/O-free `ctest_core` crate; this crate adds
//! configuration, process execution, the toolchain steps and the CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod process;
pub mod toolchain;
pub mod version;

pub use cli::report::{ConsoleReporter, Report, ReportAggregator, RunSummary, TestReporter};
pub use cli::test_interfaces::{
    CaseExecutor, DirectoryDiscovery, FixtureDiscovery, HarnessError, HarnessSettings, ProcessExecutor,
};
pub use cli::test_runner::{RunOutcome, run_fixtures};
pub use config::{ConfigError, HarnessConfig};
