//! Test runner implementation
//!
//! Discover → pair → (run → judge)* → aggregate → report, strictly sequential. Every case is an independent
//! transaction: its outcome never affects whether or how the next case runs, and there is no retry.
//!
//! ## I/O Boundaries
//!
//! Directory listing and process execution go through the traits in `test_interfaces.rs`; reporting goes through
//! `TestReporter` in `report.rs`. Default implementations are `DirectoryDiscovery`, `ProcessExecutor` and
//! `ConsoleReporter`.

use std::path::Path;
use std::time::Instant;

use ctest_core::{FixtureKind, FixturePair, Pairing, Verdict, pair_fixtures};

use super::report::{Report, ReportAggregator, RunSummary, TestReporter};
use super::test_interfaces::{CaseExecutor, FixtureDiscovery, HarnessError, HarnessSettings};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub summary: RunSummary,
}

/// Run every fixture in `tests_dir` against `executable`.
///
/// ## Errors
///
/// Only run-level problems abort: an unreadable tests directory, a naming-pattern error (raised while pairing, so
/// before any case executes), an executable that cannot be spawned, or output that does not decode with the
/// configured encoding. Wrong output, wrong exit codes, missing expected-output files and unreadable fixtures are
/// recorded as failing verdicts.
#[tracing::instrument(skip_all, fields(executable = %executable.display(), tests_dir = %tests_dir.display()))]
pub fn run_fixtures<D, E, R>(
    executable: &Path,
    tests_dir: &Path,
    settings: &HarnessSettings,
    discovery: &D,
    executor: &E,
    reporter: &mut R,
) -> Result<RunOutcome, HarnessError>
where
    D: FixtureDiscovery + ?Sized,
    E: CaseExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    let start_time = Instant::now();

    reporter.on_discovery_start(tests_dir);
    let listing = discovery.list_file_names(tests_dir)?;
    let pairings = pair_fixtures(&settings.pattern, tests_dir, &listing)?;

    let positive = pairings.iter().filter(|p| p.kind() == FixtureKind::Positive).count();
    reporter.on_collection_complete(positive, pairings.len() - positive);
    tracing::debug!(files = listing.len(), cases = pairings.len(), "fixtures collected");

    let mut aggregator = ReportAggregator::new();
    for pairing in pairings {
        reporter.on_case_start(pairing.kind(), pairing.sequence());
        let verdict = match pairing {
            Pairing::Paired(pair) => run_case(executable, &pair, settings, executor)?,
            Pairing::Unpaired(unpaired) => {
                tracing::warn!(
                    input = %unpaired.input_path.display(),
                    "no expected output for input fixture"
                );
                Verdict::missing_expected_output(&unpaired)
            }
        };
        reporter.on_case_complete(&verdict);
        aggregator.record(verdict);
    }

    let report = aggregator.finish();
    let summary = RunSummary {
        total: report.total(),
        passed: report.passed(),
        failed: report.failed(),
        duration: start_time.elapsed(),
    };
    reporter.on_run_complete(&report, &summary);

    Ok(RunOutcome { report, summary })
}

fn run_case<E: CaseExecutor + ?Sized>(
    executable: &Path,
    pair: &FixturePair,
    settings: &HarnessSettings,
    executor: &E,
) -> Result<Verdict, HarnessError> {
    match executor.execute(executable, pair, settings) {
        Ok(result) => Ok(Verdict::from_execution(pair.kind, pair.sequence.clone(), result)),
        Err(HarnessError::ReadFixture { path, source }) => Ok(Verdict::not_run(
            pair.kind,
            pair.sequence.clone(),
            format!("failed to read `{}`: {source}", path.display()),
        )),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
