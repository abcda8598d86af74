//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside world:
//! - Fixture discovery (directory listing)
//! - Case execution (spawn the program under test, capture its streams, read the expected output)
//!
//! The orchestration in `test_runner` only talks to these traits, so it can be driven with scripted listings and
//! results in tests.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use ctest_core::{ExecutionResult, FixtureError, FixturePair, FixturePattern};
use encoding_rs::Encoding;
use miette::Diagnostic;
use thiserror::Error;

use crate::config::{ConfigError, HarnessConfig};
use crate::process::run_captured;

/// Errors that abort a whole test run.
///
/// Per-case problems (wrong output, bad exit code, missing expected-output file) are never errors; they become
/// failing verdicts.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error(transparent)]
    #[diagnostic(code(ctest::config), help("check ctestconfig.json against the documented keys"))]
    Config(#[from] ConfigError),

    #[error("{0}")]
    #[diagnostic(
        code(ctest::fixture_pattern),
        help("`fixtureNamePattern` needs three groups capturing `pos|neg`, the sequence number and `in|out`")
    )]
    Fixture(#[from] FixtureError),

    #[error("unknown text encoding `{0}`")]
    #[diagnostic(code(ctest::encoding), help("use a WHATWG encoding label such as `utf-8` or `windows-1251`"))]
    UnknownEncoding(String),

    #[error("{what} is not valid {encoding}")]
    #[diagnostic(
        code(ctest::decode),
        help("the fixtures or the program output do not match `textEncoding`")
    )]
    Decode { what: String, encoding: &'static str },

    #[error("failed to list tests directory `{path}`")]
    #[diagnostic(code(ctest::io))]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read fixture `{path}`")]
    #[diagnostic(code(ctest::io))]
    ReadFixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run `{path}`")]
    #[diagnostic(code(ctest::spawn), help("was the program built successfully?"))]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The parts of [`HarnessConfig`] a test run needs, validated once up front.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub pattern: FixturePattern,
    pub encoding: &'static Encoding,
    pub timeout: Option<Duration>,
}

impl HarnessSettings {
    /// Compile the fixture pattern and resolve the encoding label.
    ///
    /// ## Errors
    /// Any pattern or encoding problem; these are reported before a single case runs.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let pattern = FixturePattern::new(&config.fixture_name_pattern)?;
        let encoding = Encoding::for_label(config.text_encoding.trim().as_bytes())
            .ok_or_else(|| HarnessError::UnknownEncoding(config.text_encoding.clone()))?;
        Ok(Self {
            pattern,
            encoding,
            timeout: config.timeout,
        })
    }
}

/// Decode `bytes` strictly; malformed input is a fatal [`HarnessError::Decode`].
pub fn decode_text(
    encoding: &'static Encoding,
    bytes: &[u8],
    what: impl FnOnce() -> String,
) -> Result<String, HarnessError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| HarnessError::Decode {
            what: what(),
            encoding: encoding.name(),
        })
}

// ============================================================================
// Fixture Discovery Interface
// ============================================================================

/// List the candidate fixture files in a tests directory.
pub trait FixtureDiscovery {
    /// File names (not paths) in `dir`, in iteration order.
    fn list_file_names(&self, dir: &Path) -> Result<Vec<String>, HarnessError>;
}

/// Filesystem-backed discovery.
pub struct DirectoryDiscovery;

impl FixtureDiscovery for DirectoryDiscovery {
    fn list_file_names(&self, dir: &Path) -> Result<Vec<String>, HarnessError> {
        let read_dir = |source: std::io::Error| HarnessError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir)? {
            let entry = entry.map_err(read_dir)?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                // A name that is not UTF-8 can never match the pattern.
                Err(name) => tracing::debug!(?name, "skipping non UTF-8 file name"),
            }
        }
        Ok(names)
    }
}

// ============================================================================
// Case Executor Interface
// ============================================================================

/// Run the program under test against one fixture pair.
///
/// Implementations report [`HarnessError::ReadFixture`] only before the program has been started, so the runner can
/// record the case as not run without losing captured output.
pub trait CaseExecutor {
    fn execute(
        &self,
        executable: &Path,
        pair: &FixturePair,
        settings: &HarnessSettings,
    ) -> Result<ExecutionResult, HarnessError>;
}

/// Spawns the executable as a fresh process per case.
pub struct ProcessExecutor;

impl CaseExecutor for ProcessExecutor {
    #[tracing::instrument(skip_all, fields(kind = %pair.kind, sequence = %pair.sequence))]
    fn execute(
        &self,
        executable: &Path,
        pair: &FixturePair,
        settings: &HarnessSettings,
    ) -> Result<ExecutionResult, HarnessError> {
        // Fixtures first: a `ReadFixture` error means the program never ran.
        let expected_bytes = fs::read(&pair.expected_output_path).map_err(|source| HarnessError::ReadFixture {
            path: pair.expected_output_path.clone(),
            source,
        })?;
        let input = File::open(&pair.input_path).map_err(|source| HarnessError::ReadFixture {
            path: pair.input_path.clone(),
            source,
        })?;

        let captured = run_captured(Command::new(executable), Stdio::from(input), settings.timeout).map_err(
            |source| HarnessError::Spawn {
                path: executable.to_path_buf(),
                source,
            },
        )?;
        tracing::debug!(exit_code = captured.exit_code, timed_out = captured.timed_out, "case finished");

        let stdout = decode_text(settings.encoding, &captured.stdout, || {
            format!("standard output of {} {}", pair.kind, pair.sequence)
        })?;
        let stderr = decode_text(settings.encoding, &captured.stderr, || {
            format!("standard error of {} {}", pair.kind, pair.sequence)
        })?;

        let expected_output = decode_text(settings.encoding, &expected_bytes, || {
            format!("`{}`", pair.expected_output_path.display())
        })?;

        Ok(ExecutionResult {
            exit_code: captured.exit_code,
            stdout,
            stderr,
            expected_output,
            timed_out_after: settings.timeout.filter(|_| captured.timed_out),
        })
    }
}
