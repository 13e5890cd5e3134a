//! End-to-end rule behavior over source text

use falint_core::diagnostic::codes;
use falint_core::{evaluate, get_all_diagnostics, parse_source, Config};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn lint(source: &str, config: Config) -> Vec<falint_core::Diagnostic> {
    let (module, diagnostics) = parse_source(source);
    assert!(diagnostics.is_empty(), "syntax diagnostics: {diagnostics:?}");
    evaluate(&module, config)
}

#[test]
fn test_future_import_with_typing_import_is_clean() {
    let source = "from __future__ import annotations\nfrom typing import Dict\n";
    assert_eq!(lint(source, Config::default()), vec![]);
}

#[test]
fn test_typing_imports_without_future_import() {
    let source = "from typing import Dict, List\n";
    let diagnostics = lint(source, Config::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::MISSING_IMPORT);
    assert!(diagnostics[0].message.contains("Dict, List"));
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 0));
}

#[test]
fn test_forced_future_import() {
    let source = "import os\n\n\ndef main() -> None:\n    print(os.getcwd())\n";
    let config = Config {
        force_future_annotations: true,
        ..Config::default()
    };
    let diagnostics = lint(source, config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::MISSING_IMPORT_FORCED);
    assert_eq!(
        diagnostics[0].message,
        "Missing from __future__ import annotations"
    );
}

#[test]
fn test_simplified_union_annotation() {
    let source = "def f(x: dict[str, int] | None) -> None:\n    pass\n";
    let config = Config {
        check_future_annotations: true,
        ..Config::default()
    };
    let diagnostics = lint(source, config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::SIMPLIFIED_TYPES);
    assert!(diagnostics[0].message.contains("dict, union"));
}

#[test]
fn test_import_and_usage_report_in_order() {
    let source = "from typing import Dict\n\n\ndef f(x: list[int]) -> None:\n    pass\n";
    let config = Config {
        force_future_annotations: true,
        check_future_annotations: true,
    };
    let diagnostics = lint(source, config);
    let codes_seen: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes_seen, vec![codes::MISSING_IMPORT, codes::SIMPLIFIED_TYPES]);
}

#[rstest]
#[case("from typing import Union\n", "Union")]
#[case("from typing import Optional, Union\n", "Optional, Union")]
#[case("from typing import Union, Optional\n", "Optional, Union")]
#[case(
    "from typing import DefaultDict, Deque, FrozenSet\n",
    "DefaultDict, Deque, FrozenSet"
)]
#[case("import typing\n\nx: typing.Dict = {}\n", "typing.Dict")]
fn test_fa100_message_lists_names_sorted(#[case] source: &str, #[case] expected: &str) {
    let diagnostics = lint(source, Config::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        format!("Missing from __future__ import annotations but imports: {expected}")
    );
}

#[rstest]
#[case("x: defaultdict = None\n", "defaultdict")]
#[case("x: deque = None\n", "deque")]
#[case("def f(a: set[int], b: frozenset[int]) -> None:\n    pass\n", "frozenset, set")]
#[case("def f() -> type[int]:\n    pass\n", "type")]
#[case("x: int | str | None = None\n", "union")]
fn test_fa102_message_lists_usages_sorted(#[case] source: &str, #[case] expected: &str) {
    let config = Config {
        check_future_annotations: true,
        ..Config::default()
    };
    let diagnostics = lint(source, config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        format!(
            "Missing from __future__ import annotations but uses simplified type annotations: {expected}"
        )
    );
}

#[rstest]
#[case(Config::default())]
#[case(Config { force_future_annotations: true, check_future_annotations: false })]
#[case(Config { force_future_annotations: false, check_future_annotations: true })]
#[case(Config { force_future_annotations: true, check_future_annotations: true })]
fn test_future_import_silences_all_configs(#[case] config: Config) {
    let source =
        "from __future__ import annotations\nfrom typing import Dict\n\nx: list[int] = []\n";
    assert_eq!(lint(source, config), vec![]);
}

#[test]
fn test_evaluation_is_idempotent_over_source() {
    let source = "from typing import Dict\nx: dict[str, int] | None = None\n";
    let config = Config {
        check_future_annotations: true,
        ..Config::default()
    };
    assert_eq!(
        get_all_diagnostics(source, config),
        get_all_diagnostics(source, config)
    );
}
