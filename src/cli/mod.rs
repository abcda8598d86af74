//! CLI module for the C test harness
//!
//! This module provides the command-line interface: `ctest <FILE>` builds a single C source file, runs it against
//! every fixture pair in the tests directory and then runs the coverage tool.
//!
//! ## Modules
//!
//! - `commands` - Phase driver (config, build, test, coverage)
//! - `report` - Verdict aggregation and the console report
//! - `test_interfaces` - I/O seams (discovery, execution) and the run-level error type
//! - `test_runner` - Per-fixture orchestration
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod report;
pub mod test_interfaces;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::timeout_from_secs;
use crate::version::CTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Build a C program, run it against its functional tests and measure coverage
#[derive(Parser, Debug)]
#[command(name = "ctest")]
#[command(version = CTEST_VERSION)]
#[command(about = "Functional test harness for single-file C programs", long_about = None)]
pub struct Cli {
    /// C source file to build and test
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Configuration file (default: ctestconfig.json in the working directory, if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Kill a test case after this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<f64>,

    /// Skip the coverage tool
    #[arg(long = "no-coverage")]
    pub no_coverage: bool,

    /// Print per-case progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_timeout(value: &str) -> Result<f64, String> {
    let secs: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if secs <= 0.0 {
        return Err("must be a positive number of seconds".to_string());
    }
    match timeout_from_secs(secs) {
        Ok(_) => Ok(secs),
        Err(e) => Err(e.to_string()),
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    commands::run_harness(&cli.into_options())
}

impl Cli {
    pub fn into_options(self) -> commands::HarnessOptions {
        commands::HarnessOptions {
            source: self.file,
            config: self.config,
            timeout_secs: self.timeout,
            coverage: !self.no_coverage,
            verbose: self.verbose,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
