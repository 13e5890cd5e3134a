//! Single-pass fact collection over a parsed module
//!
//! The visitor walks one module and accumulates everything the rule
//! evaluator needs: whether `from __future__ import annotations` is
//! present, which names are bound to the `typing` module, which
//! deferred-style typing names the file imports or reaches through a
//! module alias, and which simplified builtin type names appear in
//! annotation positions. It never mutates the tree and never fails.

use crate::ast::{BinaryOp, ExceptHandler, Expr, Module, Param, Stmt, WithItem};
use std::collections::BTreeSet;

/// Typing-module names that exist to provide annotation capability when
/// deferred evaluation is not enabled
pub const DEFERRED_TYPING_NAMES: [&str; 10] = [
    "DefaultDict",
    "Deque",
    "Dict",
    "FrozenSet",
    "List",
    "Optional",
    "Set",
    "Tuple",
    "Type",
    "Union",
];

/// Lowercase builtin names whose direct use in annotations requires
/// deferred evaluation on older interpreters
pub const SIMPLIFIED_NAMES: [&str; 8] = [
    "defaultdict",
    "deque",
    "dict",
    "frozenset",
    "list",
    "set",
    "tuple",
    "type",
];

/// Token recorded for `X | Y` union syntax in annotations
pub const UNION_TOKEN: &str = "union";

/// Accumulated facts from one traversal
#[derive(Debug, Default)]
pub struct FutureAnnotationsVisitor {
    /// True once `from __future__ import annotations` is seen
    pub imports_future_annotations: bool,
    /// Names bound to the typing module by plain imports
    pub typing_alias_names: Vec<String>,
    /// Deferred-style typing names imported or reached via an alias, in
    /// discovery order with duplicates preserved
    pub deferred_typing_imports: Vec<String>,
    /// Simplified builtin names (and "union") seen in annotations
    pub simplified_type_usages: BTreeSet<String>,
}

impl FutureAnnotationsVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk a whole module
    pub fn visit_module(&mut self, module: &Module) {
        for stmt in &module.body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ImportFrom { module, names, .. } => {
                if module == "__future__"
                    && names.iter().any(|alias| alias.name == "annotations")
                {
                    self.imports_future_annotations = true;
                }
                if module == "typing" {
                    for alias in names {
                        if DEFERRED_TYPING_NAMES.contains(&alias.name.as_str()) {
                            self.deferred_typing_imports.push(alias.name.clone());
                        }
                    }
                }
            }
            Stmt::Import { names, .. } => {
                for alias in names {
                    if alias.name == "typing" {
                        self.typing_alias_names.push(alias.name.clone());
                        if let Some(asname) = &alias.asname {
                            self.typing_alias_names.push(asname.clone());
                        }
                    }
                }
            }
            Stmt::FunctionDef {
                decorators,
                params,
                returns,
                body,
                ..
            } => {
                for decorator in decorators {
                    self.visit_expr(decorator);
                }
                for param in params {
                    self.visit_param(param);
                }
                if let Some(returns) = returns {
                    self.scan_annotation(returns);
                    self.visit_expr(returns);
                }
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::ClassDef {
                decorators,
                bases,
                body,
                ..
            } => {
                for decorator in decorators {
                    self.visit_expr(decorator);
                }
                for base in bases {
                    self.visit_expr(base);
                }
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                self.visit_expr(target);
                self.scan_annotation(annotation);
                self.visit_expr(annotation);
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::Assign { targets, value, .. } => {
                for target in targets {
                    self.visit_expr(target);
                }
                self.visit_expr(value);
            }
            Stmt::Expr { value, .. } => self.visit_expr(value),
            Stmt::Return { value, .. } | Stmt::Raise { value, .. } => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::If {
                test, body, orelse, ..
            } => {
                self.visit_expr(test);
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                for stmt in orelse {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::While { test, body, .. } => {
                self.visit_expr(test);
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::For {
                target, iter, body, ..
            } => {
                self.visit_expr(target);
                self.visit_expr(iter);
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::With { items, body, .. } => {
                for WithItem { context, target } in items {
                    self.visit_expr(context);
                    if let Some(target) = target {
                        self.visit_expr(target);
                    }
                }
                for stmt in body {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                for ExceptHandler { kind, body } in handlers {
                    if let Some(kind) = kind {
                        self.visit_expr(kind);
                    }
                    for stmt in body {
                        self.visit_stmt(stmt);
                    }
                }
                for stmt in orelse {
                    self.visit_stmt(stmt);
                }
                for stmt in finalbody {
                    self.visit_stmt(stmt);
                }
            }
            Stmt::Pass { .. } => {}
        }
    }

    fn visit_param(&mut self, param: &Param) {
        if let Some(annotation) = &param.annotation {
            self.scan_annotation(annotation);
            self.visit_expr(annotation);
        }
        if let Some(default) = &param.default {
            self.visit_expr(default);
        }
    }

    /// Generic expression walk; records `alias.Attr` accesses that reach
    /// deferred typing names through a typing-module alias
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Attribute { value, attr } => {
                if let Expr::Name(base) = value.as_ref() {
                    if self.typing_alias_names.iter().any(|name| name == base)
                        && DEFERRED_TYPING_NAMES.contains(&attr.as_str())
                    {
                        self.deferred_typing_imports.push(format!("{base}.{attr}"));
                    }
                }
                self.visit_expr(value);
            }
            Expr::Subscript { value, slice } => {
                self.visit_expr(value);
                self.visit_expr(slice);
            }
            Expr::Index { value } => self.visit_expr(value),
            Expr::Call { func, args } => {
                self.visit_expr(func);
                for arg in args {
                    self.visit_expr(arg);
                }
            }
            Expr::Tuple { elts } | Expr::List { elts } | Expr::Set { elts } => {
                for elt in elts {
                    self.visit_expr(elt);
                }
            }
            Expr::BinOp { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::UnaryOp { operand } => self.visit_expr(operand),
            Expr::Named { target, value } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Expr::Starred { value } => self.visit_expr(value),
            Expr::Lambda { body } => self.visit_expr(body),
            Expr::Name(_) | Expr::Constant(_) => {}
        }
    }

    /// Recursive classifier over an annotation expression
    fn scan_annotation(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) if SIMPLIFIED_NAMES.contains(&name.as_str()) => {
                self.simplified_type_usages.insert(name.clone());
            }
            Expr::Subscript { value, slice } => {
                self.scan_annotation(value);
                self.scan_annotation(slice);
            }
            Expr::Tuple { elts } => {
                for elt in elts {
                    self.scan_annotation(elt);
                }
            }
            Expr::BinOp {
                left,
                op: BinaryOp::BitOr,
                right,
            } => {
                self.simplified_type_usages.insert(UNION_TOKEN.to_string());
                self.scan_annotation(left);
                self.scan_annotation(right);
            }
            Expr::Index { value } => self.scan_annotation(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn visit(source: &str) -> FutureAnnotationsVisitor {
        let mut lexer = Lexer::new(source);
        let (tokens, lex_diags) = lexer.tokenize();
        assert!(lex_diags.is_empty(), "lexer diagnostics: {lex_diags:?}");
        let mut parser = Parser::new(tokens);
        let (module, parse_diags) = parser.parse();
        assert!(parse_diags.is_empty(), "parser diagnostics: {parse_diags:?}");
        let mut visitor = FutureAnnotationsVisitor::new();
        visitor.visit_module(&module);
        visitor
    }

    #[test]
    fn test_future_import_detected() {
        let visitor = visit("from __future__ import annotations\n");
        assert!(visitor.imports_future_annotations);
    }

    #[test]
    fn test_future_import_other_name_ignored() {
        let visitor = visit("from __future__ import division\n");
        assert!(!visitor.imports_future_annotations);
    }

    #[test]
    fn test_deferred_typing_imports_in_order_with_duplicates() {
        let visitor = visit("from typing import List, Dict\nfrom typing import Dict\n");
        assert_eq!(visitor.deferred_typing_imports, vec!["List", "Dict", "Dict"]);
    }

    #[test]
    fn test_non_deferred_typing_imports_ignored() {
        let visitor = visit("from typing import Any, TYPE_CHECKING, cast\n");
        assert!(visitor.deferred_typing_imports.is_empty());
    }

    #[test]
    fn test_typing_aliases_recorded() {
        let visitor = visit("import typing\nimport typing as t\nimport os\n");
        assert_eq!(visitor.typing_alias_names, vec!["typing", "typing", "t"]);
    }

    #[test]
    fn test_dotted_import_is_not_an_alias() {
        let visitor = visit("import typing.io\n");
        assert!(visitor.typing_alias_names.is_empty());
    }

    #[test]
    fn test_aliased_attribute_access() {
        let visitor = visit("import typing as t\n\ndef f(x: t.Dict[str, int]) -> None:\n    pass\n");
        assert_eq!(visitor.deferred_typing_imports, vec!["t.Dict"]);
    }

    #[test]
    fn test_attribute_on_unrelated_name_ignored() {
        let visitor = visit("import collections\n\ndef f(x: collections.OrderedDict) -> None:\n    pass\n");
        assert!(visitor.deferred_typing_imports.is_empty());
    }

    #[test]
    fn test_simplified_names_in_param_annotations() {
        let visitor = visit("def f(x: dict[str, list[int]], y: tuple[int, ...]) -> None:\n    pass\n");
        let expected: BTreeSet<String> =
            ["dict", "list", "tuple"].iter().map(|s| s.to_string()).collect();
        assert_eq!(visitor.simplified_type_usages, expected);
    }

    #[test]
    fn test_union_annotation_recorded() {
        let visitor = visit("def f(x: int | None) -> None:\n    pass\n");
        let expected: BTreeSet<String> = [UNION_TOKEN].iter().map(|s| s.to_string()).collect();
        assert_eq!(visitor.simplified_type_usages, expected);
    }

    #[test]
    fn test_union_recurses_into_operands() {
        let visitor = visit("x: dict[str, int] | set[int] = {}\n");
        let expected: BTreeSet<String> =
            ["dict", "set", "union"].iter().map(|s| s.to_string()).collect();
        assert_eq!(visitor.simplified_type_usages, expected);
    }

    #[test]
    fn test_return_annotation_scanned() {
        let visitor = visit("def f() -> list[int]:\n    return []\n");
        assert!(visitor.simplified_type_usages.contains("list"));
    }

    #[test]
    fn test_variable_annotation_scanned() {
        let visitor = visit("x: frozenset[str]\n");
        assert!(visitor.simplified_type_usages.contains("frozenset"));
    }

    #[test]
    fn test_simplified_names_outside_annotations_ignored() {
        let visitor = visit("x = dict()\ny = list(range(3))\n");
        assert!(visitor.simplified_type_usages.is_empty());
    }

    #[test]
    fn test_nested_scopes_are_walked() {
        let visitor = visit(
            "class C:\n    def m(self, x: dict[str, int]) -> None:\n        if x:\n            y: list[int] = []\n",
        );
        assert!(visitor.simplified_type_usages.contains("dict"));
        assert!(visitor.simplified_type_usages.contains("list"));
    }

    #[test]
    fn test_scanning_is_unaffected_by_future_import() {
        let visitor = visit("from __future__ import annotations\n\ndef f(x: dict[str, int]) -> None:\n    pass\n");
        assert!(visitor.imports_future_annotations);
        assert!(visitor.simplified_type_usages.contains("dict"));
    }

    #[test]
    fn test_index_wrapper_traversed() {
        let mut visitor = FutureAnnotationsVisitor::new();
        let module = Module {
            body: vec![Stmt::AnnAssign {
                target: Expr::name("x"),
                annotation: Expr::Subscript {
                    value: Box::new(Expr::name("dict")),
                    slice: Box::new(Expr::Index {
                        value: Box::new(Expr::name("list")),
                    }),
                },
                value: None,
                span: crate::span::Span::default(),
            }],
        };
        visitor.visit_module(&module);
        assert!(visitor.simplified_type_usages.contains("dict"));
        assert!(visitor.simplified_type_usages.contains("list"));
    }
}
