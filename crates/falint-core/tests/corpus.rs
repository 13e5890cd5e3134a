//! Fixture-driven checks over real Python files

use falint_core::diagnostic::codes;
use falint_core::{get_all_diagnostics, Config};
use rstest::rstest;
use std::fs;
use std::path::PathBuf;

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
}

#[rstest]
#[case("ok_no_types.py")]
#[case("ok_uses_future.py")]
#[case("ok_non_simplifiable_types.py")]
fn test_ok_fixtures_are_clean(#[case] name: &str) {
    let source = read_fixture(name);
    let diagnostics = get_all_diagnostics(&source, Config::default());
    assert!(diagnostics.is_empty(), "{name}: {diagnostics:?}");
}

#[rstest]
#[case("fa100_simple.py", "Dict")]
#[case("fa100_multiple_imports.py", "Dict, List, Optional")]
#[case("fa100_uses_alias.py", "t.Dict")]
fn test_fa100_fixtures(#[case] name: &str, #[case] expected_names: &str) {
    let source = read_fixture(name);
    let diagnostics = get_all_diagnostics(&source, Config::default());
    assert_eq!(diagnostics.len(), 1, "{name}: {diagnostics:?}");
    assert_eq!(diagnostics[0].code, codes::MISSING_IMPORT);
    assert_eq!(
        diagnostics[0].message,
        format!("Missing from __future__ import annotations but imports: {expected_names}")
    );
}

#[rstest]
#[case("fa102_lowercase.py", "dict, list")]
#[case("fa102_union.py", "tuple, union")]
fn test_fa102_fixtures(#[case] name: &str, #[case] expected_usages: &str) {
    let source = read_fixture(name);
    let config = Config {
        check_future_annotations: true,
        ..Config::default()
    };
    let diagnostics = get_all_diagnostics(&source, config);
    assert_eq!(diagnostics.len(), 1, "{name}: {diagnostics:?}");
    assert_eq!(diagnostics[0].code, codes::SIMPLIFIED_TYPES);
    assert_eq!(
        diagnostics[0].message,
        format!(
            "Missing from __future__ import annotations but uses simplified type annotations: {expected_usages}"
        )
    );
}

#[test]
fn test_fa102_fixtures_are_clean_without_check_flag() {
    let source = read_fixture("fa102_lowercase.py");
    let diagnostics = get_all_diagnostics(&source, Config::default());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}
