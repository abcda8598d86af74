//! Decide pass/fail for one executed fixture.
//!
//! ## Rule
//!
//! | kind     | exit code | stdout vs expected (trimmed) | verdict |
//! |----------|-----------|------------------------------|---------|
//! | positive | 0         | equal                        | pass    |
//! | positive | 0         | different                    | fail    |
//! | positive | non-zero  | -                            | fail    |
//! | negative | non-zero  | -                            | pass    |
//! | negative | 0         | -                            | fail    |
//!
//! A run that was killed for exceeding its time limit always fails, whatever its kind.

use std::time::Duration;

use crate::fixture::{FixtureKind, Sequence};
use crate::pairing::UnpairedInput;

/// Characters stripped from both ends of actual and expected output before comparison.
pub const TRIMMED_CHARS: &[char] = &[' ', '\n', '\r'];

/// Strip leading and trailing spaces and line breaks. Interior whitespace is left untouched.
pub fn trim_output(text: &str) -> &str {
    text.trim_matches(TRIMMED_CHARS)
}

/// Everything captured from one run of the program under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Contents of the expected-output file, as read (trimming happens in [`judge`]).
    pub expected_output: String,
    /// Set when the process was killed after running past this limit.
    pub timed_out_after: Option<Duration>,
}

/// Apply the decision rule.
pub fn judge(kind: FixtureKind, result: &ExecutionResult) -> bool {
    if result.timed_out_after.is_some() {
        return false;
    }
    match kind {
        FixtureKind::Positive => {
            result.exit_code == 0 && trim_output(&result.stdout) == trim_output(&result.expected_output)
        }
        FixtureKind::Negative => result.exit_code != 0,
    }
}

/// Diagnostics kept for a failing case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// `None` when the program was never run for this case.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub expected_output: String,
    pub stderr: String,
    pub note: Option<String>,
}

/// Pass/fail outcome for one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub kind: FixtureKind,
    pub sequence: Sequence,
    pub passed: bool,
    /// Present only when `passed` is false.
    pub detail: Option<FailureDetail>,
}

impl Verdict {
    /// Judge an execution, keeping the captured streams only if the case failed.
    pub fn from_execution(kind: FixtureKind, sequence: Sequence, result: ExecutionResult) -> Self {
        let passed = judge(kind, &result);
        let detail = (!passed).then(|| FailureDetail {
            exit_code: Some(result.exit_code),
            expected_output: trim_output(&result.expected_output).to_string(),
            note: result.timed_out_after.map(|limit| format!("timed out after {limit:?}")),
            stdout: result.stdout,
            stderr: result.stderr,
        });
        Self {
            kind,
            sequence,
            passed,
            detail,
        }
    }

    /// Failing verdict for an input file whose expected output does not exist.
    pub fn missing_expected_output(unpaired: &UnpairedInput) -> Self {
        Self::not_run(
            unpaired.kind,
            unpaired.sequence.clone(),
            format!(
                "expected output file `{}` not found",
                unpaired.missing_expected_output.display()
            ),
        )
    }

    /// Failing verdict for a case the program could not be run against.
    pub fn not_run(kind: FixtureKind, sequence: Sequence, note: impl Into<String>) -> Self {
        Self {
            kind,
            sequence,
            passed: false,
            detail: Some(FailureDetail {
                exit_code: None,
                stdout: String::new(),
                expected_output: String::new(),
                stderr: String::new(),
                note: Some(note.into()),
            }),
        }
    }
}
