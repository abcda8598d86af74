//! Errors raised while interpreting fixture names.
//!
//! Every variant here describes a defect in the configured naming pattern rather than in a single fixture, so callers
//! treat them as fatal for the whole run.

use thiserror::Error;

/// A fixture naming-pattern configuration error.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture name pattern `{pattern}` is not a valid regular expression")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("fixture name pattern `{pattern}` must have exactly 3 capture groups (kind, sequence, role), found {found}")]
    GroupCount { pattern: String, found: usize },

    #[error("unrecognized fixture kind `{token}` in `{file_name}` (expected `pos` or `neg`)")]
    UnknownKind { token: String, file_name: String },

    #[error("unrecognized fixture role `{token}` in `{file_name}` (expected `in` or `out`)")]
    UnknownRole { token: String, file_name: String },
}
