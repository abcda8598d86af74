//! Define fixture identities and the file-name matcher.
//!
//! A fixture file name carries three facts: its kind (`pos`/`neg`), its sequence number and its role (`in`/`out`).
//! [`FixturePattern`] extracts them with a user-configurable regular expression whose three capture groups are, in
//! order, the kind token, the sequence token and the role token.
//!
//! ## Examples
//! ```rust
//! use ctest_core::{FixtureKind, FixturePattern, FixtureRole, DEFAULT_FIXTURE_PATTERN};
//!
//! let pattern = FixturePattern::new(DEFAULT_FIXTURE_PATTERN).unwrap();
//! let matched = pattern.match_file_name("neg_07_in.txt").unwrap().unwrap();
//! assert_eq!(matched.name.kind, FixtureKind::Negative);
//! assert_eq!(matched.name.sequence.as_str(), "07");
//! assert_eq!(matched.name.role, FixtureRole::Input);
//! assert_eq!(matched.counterpart_file_name(), "neg_07_out.txt");
//!
//! assert!(pattern.match_file_name("main.c").unwrap().is_none());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::errors::FixtureError;

/// Naming pattern used when no override is configured: `pos_01_in.txt`, `neg_12_out.txt`, ...
pub const DEFAULT_FIXTURE_PATTERN: &str = r"(pos|neg)_([0-9]{2})_(in|out)\.txt";

/// Whether a fixture asserts success or rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureKind {
    /// Must exit 0 and reproduce the expected output.
    Positive,
    /// Must exit non-zero; output is not checked.
    Negative,
}

impl FixtureKind {
    /// Report order: positive cases first.
    pub const ALL: [FixtureKind; 2] = [FixtureKind::Positive, FixtureKind::Negative];

    /// Parse the token captured by the kind group.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "pos" => Some(FixtureKind::Positive),
            "neg" => Some(FixtureKind::Negative),
            _ => None,
        }
    }

    /// Canonical file-name token.
    pub fn as_token(self) -> &'static str {
        match self {
            FixtureKind::Positive => "pos",
            FixtureKind::Negative => "neg",
        }
    }

    /// Section heading used by the report.
    pub fn heading(self) -> &'static str {
        match self {
            FixtureKind::Positive => "Positive tests",
            FixtureKind::Negative => "Negative tests",
        }
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Which half of a pair a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureRole {
    /// Streamed to the program's standard input.
    Input,
    /// Compared against the program's standard output.
    ExpectedOutput,
}

impl FixtureRole {
    /// Parse the token captured by the role group.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "in" => Some(FixtureRole::Input),
            "out" => Some(FixtureRole::ExpectedOutput),
            _ => None,
        }
    }

    /// Canonical file-name token.
    pub fn as_token(self) -> &'static str {
        match self {
            FixtureRole::Input => "in",
            FixtureRole::ExpectedOutput => "out",
        }
    }

    /// The other half of the pair.
    pub fn counterpart(self) -> Self {
        match self {
            FixtureRole::Input => FixtureRole::ExpectedOutput,
            FixtureRole::ExpectedOutput => FixtureRole::Input,
        }
    }
}

/// Ordering identifier embedded in a fixture name.
///
/// The captured token is kept for display (`"02"` stays `"02"`), but ordering is numeric whenever the token is all
/// digits, so `"9" < "10"` regardless of padding width. Non-numeric tokens (possible with custom patterns) sort
/// after every numeric one, lexically among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence(String);

impl Sequence {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the token, if it is a non-empty run of ASCII digits that fits in a `u128`.
    pub fn numeric(&self) -> Option<u128> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Ord for Sequence {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            // Equal values with different padding ("1" vs "01") fall back to the text to stay consistent with `Eq`.
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Sequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed identity parsed out of a fixture file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixtureName {
    pub kind: FixtureKind,
    pub sequence: Sequence,
    pub role: FixtureRole,
}

/// A successful match: the parsed identity plus where the role token sits in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureMatch {
    pub name: FixtureName,
    file_name: String,
    role_span: Range<usize>,
}

impl FixtureMatch {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name of the other half of the pair: the role token is swapped in place, nothing else changes.
    pub fn counterpart_file_name(&self) -> String {
        let token = self.name.role.counterpart().as_token();
        let mut out = String::with_capacity(self.file_name.len() + token.len());
        out.push_str(&self.file_name[..self.role_span.start]);
        out.push_str(token);
        out.push_str(&self.file_name[self.role_span.end..]);
        out
    }
}

/// Compiled fixture naming pattern.
#[derive(Debug, Clone)]
pub struct FixturePattern {
    regex: Regex,
}

impl FixturePattern {
    /// Compile `pattern`, requiring exactly three capture groups.
    ///
    /// ## Errors
    /// - [`FixtureError::InvalidPattern`] if the expression does not compile.
    /// - [`FixtureError::GroupCount`] if it does not have exactly three capture groups.
    pub fn new(pattern: &str) -> Result<Self, FixtureError> {
        let regex = Regex::new(pattern).map_err(|source| FixtureError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        // captures_len() counts the implicit whole-match group.
        let found = regex.captures_len() - 1;
        if found != 3 {
            return Err(FixtureError::GroupCount {
                pattern: pattern.to_string(),
                found,
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Try to interpret `file_name` as a fixture.
    ///
    /// The pattern is searched anywhere in the name. A name that does not match, or where one of the three groups
    /// did not participate in the match, is not a fixture and yields `Ok(None)`.
    ///
    /// ## Errors
    /// A match whose kind or role token is not one of the recognized literals is a pattern-configuration error.
    pub fn match_file_name(&self, file_name: &str) -> Result<Option<FixtureMatch>, FixtureError> {
        let Some(caps) = self.regex.captures(file_name) else {
            return Ok(None);
        };
        let (Some(kind), Some(sequence), Some(role)) = (caps.get(1), caps.get(2), caps.get(3)) else {
            return Ok(None);
        };

        let kind = FixtureKind::from_token(kind.as_str()).ok_or_else(|| FixtureError::UnknownKind {
            token: kind.as_str().to_string(),
            file_name: file_name.to_string(),
        })?;
        let role_token = role.as_str();
        let role_kind = FixtureRole::from_token(role_token).ok_or_else(|| FixtureError::UnknownRole {
            token: role_token.to_string(),
            file_name: file_name.to_string(),
        })?;

        Ok(Some(FixtureMatch {
            name: FixtureName {
                kind,
                sequence: Sequence::new(sequence.as_str()),
                role: role_kind,
            },
            file_name: file_name.to_string(),
            role_span: role.range(),
        }))
    }
}
