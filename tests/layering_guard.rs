//! Layering guardrails to keep the fixture core free of the harness.
//!
//! `ctest_core` holds naming, pairing and the pass/fail rule and must stay I/O-free. These tests scan its manifest
//! and fail if it depends on the root `ctest` crate or grows a dependency outside its small allow-list.

const CORE_MANIFEST: &str = include_str!("../crates/ctest_core/Cargo.toml");

/// Crates the core may use in `[dependencies]`.
const CORE_ALLOWED: &[&str] = &["regex", "thiserror"];

/// Dependency names declared in the `[dependencies]` table of `manifest`.
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_does_not_depend_on_harness() {
    for name in main_dependencies(CORE_MANIFEST) {
        assert_ne!(name, "ctest", "`ctest_core` must not depend on the `ctest` crate");
    }
}

#[test]
fn core_dependencies_stay_on_allow_list() {
    for name in main_dependencies(CORE_MANIFEST) {
        assert!(
            CORE_ALLOWED.contains(&name.as_str()),
            "`{name}` is not allowed in ctest_core [dependencies]; keep I/O and process handling in `ctest`"
        );
    }
}

#[test]
fn harness_depends_on_core() {
    let root = include_str!("../Cargo.toml");
    assert!(main_dependencies(root).iter().any(|name| name == "ctest_core"));
}
