//! Rule evaluation: visitor facts plus configuration to diagnostics
//!
//! `evaluate` is a total, pure function over `(module, config)`. It owns a
//! fresh visitor per call, so callers processing many files concurrently
//! only need to share the (read-only) configuration.

use crate::ast::Module;
use crate::diagnostic::{codes, Diagnostic};
use crate::span::Span;
use crate::visitor::FutureAnnotationsVisitor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lint configuration; both flags default off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Require the future import even when nothing in the file needs it
    pub force_future_annotations: bool,
    /// Also flag simplified builtin annotations used without the future
    /// import
    pub check_future_annotations: bool,
}

/// The future-annotations rule bound to one configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct FutureAnnotationsChecker {
    config: Config,
}

impl FutureAnnotationsChecker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the rule over one parsed module
    pub fn check(&self, module: &Module) -> Vec<Diagnostic> {
        evaluate(module, self.config)
    }
}

/// Evaluate the rule over one parsed module with the given configuration.
///
/// All findings are file-level and anchor at line 1, column 0. The future
/// import silences everything; otherwise FA100 (deferred typing imports)
/// and FA101 (force flag) are mutually exclusive, and FA102 (simplified
/// usages under the check flag) is independent and always last.
pub fn evaluate(module: &Module, config: Config) -> Vec<Diagnostic> {
    let mut visitor = FutureAnnotationsVisitor::new();
    visitor.visit_module(module);

    let mut diagnostics = Vec::new();
    if visitor.imports_future_annotations {
        return diagnostics;
    }

    if !visitor.deferred_typing_imports.is_empty() {
        // duplicates collapse and names sort at render time
        let names: BTreeSet<&str> = visitor
            .deferred_typing_imports
            .iter()
            .map(String::as_str)
            .collect();
        let joined = names.into_iter().collect::<Vec<_>>().join(", ");
        diagnostics.push(Diagnostic::error_with_code(
            codes::MISSING_IMPORT,
            format!("Missing from __future__ import annotations but imports: {joined}"),
            Span::default(),
        ));
    } else if config.force_future_annotations {
        diagnostics.push(Diagnostic::error_with_code(
            codes::MISSING_IMPORT_FORCED,
            "Missing from __future__ import annotations",
            Span::default(),
        ));
    }

    if config.check_future_annotations && !visitor.simplified_type_usages.is_empty() {
        let joined = visitor
            .simplified_type_usages
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        diagnostics.push(Diagnostic::error_with_code(
            codes::SIMPLIFIED_TYPES,
            format!(
                "Missing from __future__ import annotations but uses simplified type annotations: {joined}"
            ),
            Span::default(),
        ));
    }

    diagnostics
}
