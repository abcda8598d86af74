//! Verdict aggregation and console reporting.
//!
//! ## TestReporter Trait
//!
//! The runner reports progress through the `TestReporter` trait so output format is decoupled from execution.
//! `ConsoleReporter` prints the classic grouped report:
//!
//! ```text
//! Positive tests:
//! 01: passed
//! 02: failed
//! Exit code: 0
//! Output:
//! 8
//! Expected output:
//! 7
//! Error output:
//!
//!
//! Negative tests:
//! 01: passed
//!
//! 2 passed, 1 failed
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use ctest_core::{FixtureKind, Sequence, Verdict};

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called before the tests directory is listed
    fn on_discovery_start(&mut self, _dir: &Path) {}

    /// Called once every fixture has been paired
    fn on_collection_complete(&mut self, positive: usize, negative: usize);

    /// Called before a case runs
    fn on_case_start(&mut self, _kind: FixtureKind, _sequence: &Sequence) {}

    /// Called when a case has been judged
    fn on_case_complete(&mut self, verdict: &Verdict);

    /// Called with the sorted report after the last case
    fn on_run_complete(&mut self, report: &Report, summary: &RunSummary);
}

/// Summary of a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

// ============================================================================
// Aggregation
// ============================================================================

/// Collects verdicts per kind in the order they are produced.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    positive: Vec<Verdict>,
    negative: Vec<Verdict>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: Verdict) {
        match verdict.kind {
            FixtureKind::Positive => self.positive.push(verdict),
            FixtureKind::Negative => self.negative.push(verdict),
        }
    }

    /// Sort each group by sequence (numerically) and freeze the result.
    pub fn finish(mut self) -> Report {
        // Stable, so duplicate sequences keep discovery order.
        self.positive.sort_by(|a, b| a.sequence.cmp(&b.sequence));
        self.negative.sort_by(|a, b| a.sequence.cmp(&b.sequence));
        Report {
            positive: self.positive,
            negative: self.negative,
        }
    }
}

/// Sorted verdicts, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    positive: Vec<Verdict>,
    negative: Vec<Verdict>,
}

impl Report {
    pub fn group(&self, kind: FixtureKind) -> &[Verdict] {
        match kind {
            FixtureKind::Positive => &self.positive,
            FixtureKind::Negative => &self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn passed(&self) -> usize {
        self.verdicts().filter(|v| v.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.positive.iter().chain(self.negative.iter())
    }

    /// Write the human-readable report.
    ///
    /// The positive section is always written; the negative one only when it has cases.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for kind in FixtureKind::ALL {
            let verdicts = self.group(kind);
            if kind == FixtureKind::Negative && verdicts.is_empty() {
                continue;
            }
            writeln!(out, "{}:", kind.heading())?;
            for verdict in verdicts {
                render_verdict(out, verdict)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "{} passed, {} failed", self.passed(), self.failed())
    }
}

fn render_verdict<W: Write>(out: &mut W, verdict: &Verdict) -> io::Result<()> {
    let status = if verdict.passed { "passed" } else { "failed" };
    writeln!(out, "{}: {}", verdict.sequence, status)?;

    let Some(detail) = &verdict.detail else {
        return Ok(());
    };
    if let Some(note) = &detail.note {
        writeln!(out, "Note: {note}")?;
    }
    if let Some(code) = detail.exit_code {
        writeln!(out, "Exit code: {code}")?;
        writeln!(out, "Output:")?;
        write_block(out, &detail.stdout)?;
        writeln!(out, "Expected output:")?;
        write_block(out, &detail.expected_output)?;
        writeln!(out, "Error output:")?;
        write_block(out, &detail.stderr)?;
    }
    Ok(())
}

/// Captured text followed by exactly one line break.
fn write_block<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text.trim_end_matches(['\n', '\r']))
}

// ============================================================================
// Console Reporter
// ============================================================================

/// Default console reporter: the report goes to `out`, progress (when verbose) to stderr.
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_discovery_start(&mut self, dir: &Path) {
        if self.verbose {
            eprintln!("collecting fixtures in {}", dir.display());
        }
    }

    fn on_collection_complete(&mut self, positive: usize, negative: usize) {
        if self.verbose {
            eprintln!("collected {positive} positive and {negative} negative case(s)");
        }
    }

    fn on_case_start(&mut self, kind: FixtureKind, sequence: &Sequence) {
        if self.verbose {
            eprint!("{kind} {sequence} ... ");
        }
    }

    fn on_case_complete(&mut self, verdict: &Verdict) {
        if self.verbose {
            eprintln!("{}", if verdict.passed { "passed" } else { "failed" });
        }
    }

    fn on_run_complete(&mut self, report: &Report, summary: &RunSummary) {
        if let Err(e) = report.render(&mut self.out).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write test report");
        }
        if self.verbose {
            eprintln!("ran {} case(s) in {:.2}s", summary.total, summary.duration.as_secs_f64());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
