//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.
//!
//! The harness runs its phases in a fixed order: load configuration, check the source file, check the tests
//! directory, build, test, coverage. Status lines and the report go to the given writer (stdout in production);
//! warnings and errors go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use miette::Diagnostic;

use super::report::ConsoleReporter;
use super::test_interfaces::{DirectoryDiscovery, HarnessError, HarnessSettings, ProcessExecutor};
use super::test_runner::run_fixtures;
use super::{CliError, CliResult, ExitCode};
use crate::config::{HarnessConfig, timeout_from_secs};
use crate::toolchain::{self, BuildError};

/// Everything the command line can change about a run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessOptions {
    /// C source file under test
    pub source: PathBuf,
    /// Explicit configuration file; `ctestconfig.json` in the working directory otherwise
    pub config: Option<PathBuf>,
    /// Per-case time limit override in seconds
    pub timeout_secs: Option<f64>,
    /// Run the coverage tool after the tests
    pub coverage: bool,
    pub verbose: bool,
}

impl HarnessOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            config: None,
            timeout_secs: None,
            coverage: true,
            verbose: false,
        }
    }
}

/// Build, test and measure coverage for `options.source`, reporting to stdout.
pub fn run_harness(options: &HarnessOptions) -> CliResult<ExitCode> {
    let stdout = io::stdout();
    run_harness_in(Path::new("."), options, &mut stdout.lock())
}

/// Same as [`run_harness`], run as if started in `work_dir`, with all regular output sent to `out`.
///
/// `work_dir` is where `ctestconfig.json` is looked up and what a relative `testsDirectory` is resolved against.
/// The source path and an explicit `--config` path are used as given.
pub fn run_harness_in<W: Write>(work_dir: &Path, options: &HarnessOptions, out: &mut W) -> CliResult<ExitCode> {
    let mut config =
        HarnessConfig::load(work_dir, options.config.as_deref()).map_err(|e| diagnostic_error(HarnessError::from(e)))?;
    if let Some(secs) = options.timeout_secs {
        let timeout = timeout_from_secs(secs)
            .map_err(|e| CliError::failure(format!("Error: invalid timeout {secs}: {e}")))?;
        config = config.with_timeout(timeout);
    }
    // Pattern and encoding problems are reported before anything is built.
    let settings = HarnessSettings::from_config(&config).map_err(diagnostic_error)?;

    let source = options.source.as_path();
    if !source.is_file() {
        return Err(CliError::failure(format!(
            "Error: C source file `{}` does not exist!",
            source.display()
        )));
    }

    let tests_dir = work_dir.join(&config.tests_directory);
    let tests_dir = tests_dir.as_path();
    let run_tests = tests_dir.is_dir();
    if !run_tests {
        tracing::warn!(tests_dir = %tests_dir.display(), "tests directory missing, skipping tests");
        eprintln!("Warning: tests directory `{}` does not exist!", tests_dir.display());
    }

    let executable = build_phase(source, &config, out)?;

    let mut all_passed = true;
    if run_tests {
        writeln!(out).map_err(output_error)?;
        writeln!(out, "Testing {} ...", executable.display()).map_err(output_error)?;
        writeln!(out).map_err(output_error)?;

        let mut reporter = ConsoleReporter::new(&mut *out, options.verbose);
        let outcome = run_fixtures(
            &executable,
            tests_dir,
            &settings,
            &DirectoryDiscovery,
            &ProcessExecutor,
            &mut reporter,
        )
        .map_err(diagnostic_error)?;
        all_passed = outcome.summary.failed == 0;

        writeln!(out, "Tested {}", executable.display()).map_err(output_error)?;
    }

    if options.coverage {
        writeln!(out).map_err(output_error)?;
        coverage_phase(source, &config, out)?;
    }

    Ok(if all_passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn build_phase<W: Write>(source: &Path, config: &HarnessConfig, out: &mut W) -> CliResult<PathBuf> {
    writeln!(out, "Building {} using {} ...", source.display(), config.compiler).map_err(output_error)?;
    out.flush().map_err(output_error)?;

    match toolchain::build(source, config) {
        Ok(built) => {
            if !built.diagnostics.is_empty() {
                eprint!("{}", built.diagnostics);
            }
            writeln!(out, "Built {} to {}", source.display(), built.executable.display()).map_err(output_error)?;
            Ok(built.executable)
        }
        Err(e) => {
            if let BuildError::Failed { output, .. } = &e {
                eprint!("{output}");
            }
            Err(CliError::failure(format!("Error: build of `{}` failed: {e}", source.display())))
        }
    }
}

fn coverage_phase<W: Write>(source: &Path, config: &HarnessConfig, out: &mut W) -> CliResult<()> {
    writeln!(out, "Running coverage for {} ...", source.display()).map_err(output_error)?;
    // The tool writes to the inherited stdout, so ours has to be flushed first.
    out.flush().map_err(output_error)?;

    match toolchain::run_coverage(source, config) {
        Ok(()) => writeln!(out, "Ran coverage for {}", source.display()).map_err(output_error),
        Err(e) => {
            tracing::warn!(error = %e, "coverage run failed");
            eprintln!("Warning: {e}");
            Ok(())
        }
    }
}

/// Render a diagnostic with its code and help text, the way miette prints it.
fn diagnostic_error<E: Diagnostic + Send + Sync + 'static>(err: E) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(err)))
}

fn output_error(err: io::Error) -> CliError {
    CliError::failure(format!("Error writing output: {err}"))
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, json: &str) {
        fs::write(dir.join(crate::config::CONFIG_FILE_NAME), json).unwrap();
    }

    fn run(dir: &Path, options: &HarnessOptions) -> (CliResult<ExitCode>, String) {
        let mut out = Vec::new();
        let result = run_harness_in(dir, options, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_missing_source_stops_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let options = HarnessOptions::new(dir.path().join("absent.c"));
        let (result, out) = run(dir.path(), &options);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("does not exist"), "{}", err.message);
        assert!(out.is_empty());
    }

    #[test]
    fn test_bad_pattern_reported_before_build() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"fixtureNamePattern": "(pos|neg)_(\\d+)"}"#);
        fs::write(dir.path().join("prog.c"), "").unwrap();
        let options = HarnessOptions::new(dir.path().join("prog.c"));
        let (result, out) = run(dir.path(), &options);
        let err = result.unwrap_err();
        assert!(err.message.contains("ctest::fixture_pattern"), "{}", err.message);
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "{ not json");
        let options = HarnessOptions::new(dir.path().join("prog.c"));
        let (result, _) = run(dir.path(), &options);
        assert_eq!(result.unwrap_err().exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_build_failure_skips_later_phases() {
        let dir = tempfile::tempdir().unwrap();
        let tests_dir = dir.path().join("func_tests");
        fs::create_dir(&tests_dir).unwrap();
        write_config(
            dir.path(),
            &format!(
                r#"{{"compiler": "false", "compilerArgs": "", "coverageTool": "true", "testsDirectory": "{}"}}"#,
                tests_dir.display()
            ),
        );
        fs::write(dir.path().join("prog.c"), "int main(void) { return 0; }").unwrap();
        let options = HarnessOptions::new(dir.path().join("prog.c"));

        let (result, out) = run(dir.path(), &options);
        assert!(result.unwrap_err().message.contains("build of"));
        assert!(out.starts_with("Building "));
        assert!(!out.contains("Testing"));
        assert!(!out.contains("Running coverage"));
    }

    #[test]
    fn test_missing_tests_dir_still_builds_and_runs_coverage() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            &format!(
                r#"{{"compiler": "true", "compilerArgs": "", "coverageTool": "true", "testsDirectory": "{}"}}"#,
                dir.path().join("nope").display()
            ),
        );
        fs::write(dir.path().join("prog.c"), "").unwrap();
        let options = HarnessOptions::new(dir.path().join("prog.c"));

        let (result, out) = run(dir.path(), &options);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert!(out.contains("Built "));
        assert!(!out.contains("Testing"));
        assert!(out.contains("Ran coverage for "));
    }

    #[test]
    fn test_relative_tests_directory_resolves_against_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("cases")).unwrap();
        write_config(
            dir.path(),
            r#"{"compiler": "true", "compilerArgs": "", "testsDirectory": "cases"}"#,
        );
        fs::write(dir.path().join("prog.c"), "").unwrap();
        let mut options = HarnessOptions::new(dir.path().join("prog.c"));
        options.coverage = false;

        let (result, out) = run(dir.path(), &options);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert!(out.contains("Testing "), "{out}");
        assert!(out.contains("0 passed, 0 failed"), "{out}");
    }

    #[test]
    fn test_out_of_range_timeout_option_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = HarnessOptions::new(dir.path().join("prog.c"));
        options.timeout_secs = Some(1e20);
        let (result, out) = run(dir.path(), &options);
        assert!(result.unwrap_err().message.contains("invalid timeout"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_out_of_range_timeout_in_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"timeoutSeconds": 1e20}"#);
        let options = HarnessOptions::new(dir.path().join("prog.c"));
        let (result, _) = run(dir.path(), &options);
        assert!(result.unwrap_err().message.contains("timeoutSeconds"));
    }

    #[test]
    fn test_no_coverage_flag() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            &format!(
                r#"{{"compiler": "true", "compilerArgs": "", "coverageTool": "false", "testsDirectory": "{}"}}"#,
                dir.path().join("nope").display()
            ),
        );
        fs::write(dir.path().join("prog.c"), "").unwrap();
        let mut options = HarnessOptions::new(dir.path().join("prog.c"));
        options.coverage = false;

        let (result, out) = run(dir.path(), &options);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert!(!out.contains("coverage"));
    }
}
