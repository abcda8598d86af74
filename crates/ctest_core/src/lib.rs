//! Provide the pure fixture vocabulary and decision rules for the `ctest` harness.
//!
//! This crate is intentionally small. It owns everything about a test run that can be decided without touching the
//! filesystem or spawning a process:
//! - parsing fixture file names into typed identities ([`FixturePattern`], [`FixtureName`]),
//! - grouping a directory listing into input/expected-output pairs ([`pair_fixtures`]),
//! - the pass/fail rule for a captured execution ([`judge`], [`Verdict`]).
//!
//! ## Notes
//!
//! - **No IO**: callers hand in file names and captured output; this crate never reads a file or spawns a child.
//! - Kind and role tokens are parsed into closed enums at the matcher boundary. Any other captured token is a
//!   configuration error ([`FixtureError`]), never a per-file skip.

pub mod errors;
pub mod fixture;
pub mod pairing;
pub mod verdict;

pub use errors::FixtureError;
pub use fixture::{DEFAULT_FIXTURE_PATTERN, FixtureKind, FixtureMatch, FixtureName, FixturePattern, FixtureRole, Sequence};
pub use pairing::{FixturePair, Pairing, UnpairedInput, pair_fixtures};
pub use verdict::{ExecutionResult, FailureDetail, Verdict, judge, trim_output};
