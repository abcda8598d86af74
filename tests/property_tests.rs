//! Property-based tests for fixture handling
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::Path;

use ctest_core::{
    DEFAULT_FIXTURE_PATTERN, ExecutionResult, FixtureKind, FixturePattern, Pairing, Sequence, judge, pair_fixtures,
    trim_output,
};
use proptest::prelude::*;

fn default_pattern() -> FixturePattern {
    FixturePattern::new(DEFAULT_FIXTURE_PATTERN).unwrap()
}

fn result(exit_code: i32, stdout: &str, expected: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code,
        stdout: stdout.to_string(),
        stderr: String::new(),
        expected_output: expected.to_string(),
        timed_out_after: None,
    }
}

// =============================================================================
// Strategies
// =============================================================================

fn kind_strategy() -> impl Strategy<Value = FixtureKind> {
    prop_oneof![Just(FixtureKind::Positive), Just(FixtureKind::Negative)]
}

/// A canonical fixture file name under the default pattern.
fn fixture_name_strategy() -> impl Strategy<Value = String> {
    (prop_oneof![Just("pos"), Just("neg")], 0u8..100, prop_oneof![Just("in"), Just("out")])
        .prop_map(|(kind, seq, role)| format!("{kind}_{seq:02}_{role}.txt"))
}

/// A directory listing mixing fixtures with unrelated files.
fn listing_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            3 => fixture_name_strategy(),
            1 => "[a-z]{1,8}\\.(c|h|md)",
        ],
        0..24,
    )
}

/// Padding made only of characters the comparison ignores.
fn padding_strategy() -> impl Strategy<Value = String> {
    "[ \r\n]{0,4}"
}

// =============================================================================
// Matching Properties
// =============================================================================

mod matching {
    use super::*;

    proptest! {
        /// Property: names without a `_NN_in.txt` / `_NN_out.txt` shape are ignored, never errors
        #[test]
        fn non_matching_names_are_ignored(name in "[a-z0-9.]{0,16}") {
            prop_assume!(!name.contains(".txt"));
            prop_assert_eq!(default_pattern().match_file_name(&name).unwrap(), None);
        }

        /// Property: every canonical fixture name matches and round-trips its kind
        #[test]
        fn canonical_names_match(name in fixture_name_strategy()) {
            let matched = default_pattern().match_file_name(&name).unwrap().unwrap();
            prop_assert_eq!(matched.name.kind.as_token(), &name[..3]);
            prop_assert_eq!(matched.name.sequence.as_str(), &name[4..6]);
        }
    }
}

// =============================================================================
// Pairing Properties
// =============================================================================

mod pairing {
    use super::*;

    proptest! {
        /// Property: pairing the same listing twice gives the same result
        #[test]
        fn pairing_is_idempotent(listing in listing_strategy()) {
            let pattern = default_pattern();
            let first = pair_fixtures(&pattern, Path::new("t"), &listing).unwrap();
            let second = pair_fixtures(&pattern, Path::new("t"), &listing).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: an input whose expected output is listed is paired exactly once
        #[test]
        fn present_outputs_pair_exactly_once(listing in listing_strategy()) {
            let pairings = pair_fixtures(&default_pattern(), Path::new("t"), &listing).unwrap();
            for pairing in &pairings {
                let input = match pairing {
                    Pairing::Paired(pair) => &pair.input_path,
                    Pairing::Unpaired(unpaired) => &unpaired.input_path,
                };
                let occurrences = pairings
                    .iter()
                    .filter(|p| match p {
                        Pairing::Paired(pair) => &pair.input_path == input,
                        Pairing::Unpaired(unpaired) => &unpaired.input_path == input,
                    })
                    .count();
                prop_assert_eq!(occurrences, 1);

                let name = input.file_name().unwrap().to_str().unwrap();
                let counterpart = name.replace("_in.txt", "_out.txt");
                let expected_paired = listing.iter().any(|f| *f == counterpart);
                prop_assert_eq!(matches!(pairing, Pairing::Paired(_)), expected_paired);
            }
        }
    }
}

// =============================================================================
// Verdict Properties
// =============================================================================

mod verdict {
    use super::*;

    proptest! {
        /// Property: the decision table holds for every exit code and output
        #[test]
        fn decision_table(
            kind in kind_strategy(),
            exit_code in -20i32..20,
            stdout in "[0-9 \n]{0,12}",
            expected in "[0-9 \n]{0,12}",
        ) {
            let passed = judge(kind, &result(exit_code, &stdout, &expected));
            let want = match kind {
                FixtureKind::Positive => exit_code == 0 && trim_output(&stdout) == trim_output(&expected),
                FixtureKind::Negative => exit_code != 0,
            };
            prop_assert_eq!(passed, want);
        }

        /// Property: negative cases ignore output entirely
        #[test]
        fn negative_ignores_output(exit_code in 1i32..256, stdout in ".*", expected in ".*") {
            prop_assert!(judge(FixtureKind::Negative, &result(exit_code, &stdout, &expected)));
        }

        /// Property: surrounding spaces and line breaks never change a positive verdict
        #[test]
        fn trim_is_symmetric(
            body in "[0-9a-z]([0-9a-z \n]{0,10}[0-9a-z])?",
            lead_out in padding_strategy(),
            trail_out in padding_strategy(),
            lead_exp in padding_strategy(),
            trail_exp in padding_strategy(),
        ) {
            let stdout = format!("{lead_out}{body}{trail_out}");
            let expected = format!("{lead_exp}{body}{trail_exp}");
            prop_assert!(judge(FixtureKind::Positive, &result(0, &stdout, &expected)));
            prop_assert!(judge(FixtureKind::Positive, &result(0, &expected, &stdout)));
        }

        /// Property: an interior whitespace difference is never forgiven
        #[test]
        fn interior_whitespace_matters(left in "[0-9]{1,4}", right in "[0-9]{1,4}") {
            let stdout = format!("{left}  {right}");
            let expected = format!("{left} {right}");
            prop_assert!(!judge(FixtureKind::Positive, &result(0, &stdout, &expected)));
        }
    }
}

// =============================================================================
// Ordering Properties
// =============================================================================

mod ordering {
    use super::*;

    proptest! {
        /// Property: sequences sort by numeric value, whatever their zero padding
        #[test]
        fn sequences_sort_numerically(values in prop::collection::vec(0u32..1000, 0..20), width in 1usize..4) {
            let mut sequences: Vec<Sequence> = values
                .iter()
                .map(|v| Sequence::new(format!("{v:0width$}")))
                .collect();
            sequences.sort();
            let mut values = values;
            values.sort();
            let sorted: Vec<u128> = sequences.iter().map(|s| s.numeric().unwrap()).collect();
            let want: Vec<u128> = values.iter().map(|&v| u128::from(v)).collect();
            prop_assert_eq!(sorted, want);
        }
    }
}
