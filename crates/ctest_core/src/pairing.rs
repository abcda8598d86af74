//! Group a directory listing into input/expected-output pairs.
//!
//! ## Notes
//! - The listing is walked exactly once, in the order given (directory-iteration order for real runs).
//! - Expected-output files are never treated as cases on their own; they are only reached through their input.
//! - An input whose derived expected-output name is absent from the listing is reported as [`Pairing::Unpaired`]
//!   so the caller can record a failing verdict for it instead of dropping it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::FixtureError;
use crate::fixture::{FixtureKind, FixtureName, FixturePattern, FixtureRole, Sequence};

/// One runnable test case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixturePair {
    pub kind: FixtureKind,
    pub sequence: Sequence,
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
}

/// An input file with no expected-output counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnpairedInput {
    pub kind: FixtureKind,
    pub sequence: Sequence,
    pub input_path: PathBuf,
    /// The expected-output path that was derived but not found.
    pub missing_expected_output: PathBuf,
}

/// Outcome of pairing one input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pairing {
    Paired(FixturePair),
    Unpaired(UnpairedInput),
}

impl Pairing {
    pub fn kind(&self) -> FixtureKind {
        match self {
            Pairing::Paired(pair) => pair.kind,
            Pairing::Unpaired(unpaired) => unpaired.kind,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        match self {
            Pairing::Paired(pair) => &pair.sequence,
            Pairing::Unpaired(unpaired) => &unpaired.sequence,
        }
    }
}

/// Pair every input fixture in `listing` (file names inside `dir`) with its expected output.
///
/// Returns one [`Pairing`] per input fixture, in listing order. Files that do not match `pattern` are ignored.
///
/// ## Errors
/// Propagates the first [`FixtureError`] raised by the matcher; nothing is paired in that case.
pub fn pair_fixtures<S: AsRef<str>>(
    pattern: &FixturePattern,
    dir: &Path,
    listing: &[S],
) -> Result<Vec<Pairing>, FixtureError> {
    let present: HashSet<&str> = listing.iter().map(AsRef::as_ref).collect();
    let mut consumed: HashSet<String> = HashSet::new();
    let mut pairings = Vec::new();

    for entry in listing {
        let file_name = entry.as_ref();
        if consumed.contains(file_name) {
            continue;
        }
        let Some(matched) = pattern.match_file_name(file_name)? else {
            continue;
        };
        if matched.name.role != FixtureRole::Input {
            continue;
        }

        let counterpart = matched.counterpart_file_name();
        let input_path = dir.join(file_name);
        let expected_path = dir.join(&counterpart);
        let paired = present.contains(counterpart.as_str());
        let FixtureName { kind, sequence, .. } = matched.name;

        pairings.push(if paired {
            Pairing::Paired(FixturePair {
                kind,
                sequence,
                input_path,
                expected_output_path: expected_path,
            })
        } else {
            Pairing::Unpaired(UnpairedInput {
                kind,
                sequence,
                input_path,
                missing_expected_output: expected_path,
            })
        });

        consumed.insert(file_name.to_string());
        consumed.insert(counterpart);
    }

    Ok(pairings)
}
