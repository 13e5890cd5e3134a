//! Abstract syntax tree for the Python subset the rule inspects
//!
//! The tree is deliberately trimmed: it keeps exactly the shapes the
//! future-annotations rule distinguishes (imports, definitions, annotations,
//! attribute and subscript expressions, `|` unions) and lowers everything
//! else into the nearest container. Conditional expressions fold to a tuple
//! of their three parts, dict keys/values and comprehension clause
//! expressions fold into the enclosing display, and `else` clauses of loops
//! fold into the loop body. The rule never reads the shape of any of these,
//! only the names and attributes inside them.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// One name in an import statement, with its optional rename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportAlias {
    pub name: String,
    pub asname: Option<String>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
}

/// One `with` item: context expression and optional `as` target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
}

/// One `except` clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptHandler {
    pub kind: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `from module import name as alias, ...`
    ImportFrom {
        module: String,
        names: Vec<ImportAlias>,
        span: Span,
    },
    /// `import module as alias, ...`
    Import { names: Vec<ImportAlias>, span: Span },
    /// `def name(params) -> returns:` (also `async def`)
    FunctionDef {
        name: String,
        decorators: Vec<Expr>,
        params: Vec<Param>,
        returns: Option<Expr>,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `class name(bases):`
    ClassDef {
        name: String,
        decorators: Vec<Expr>,
        bases: Vec<Expr>,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `target: annotation = value`
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
        span: Span,
    },
    /// `a = b = value` (augmented assignments lower to this too)
    Assign {
        targets: Vec<Expr>,
        value: Expr,
        span: Span,
    },
    /// Bare expression statement
    Expr { value: Expr, span: Span },
    /// `return value`
    Return { value: Option<Expr>, span: Span },
    /// `raise exc from cause` (the cause folds into a tuple with the exception)
    Raise { value: Option<Expr>, span: Span },
    /// `if`/`elif`/`else` chain; `elif` nests as an `If` in `orelse`
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        span: Span,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    With {
        items: Vec<WithItem>,
        body: Vec<Stmt>,
        span: Span,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
        span: Span,
    },
    /// `pass`, `break`, `continue` and other bodyless statements
    Pass { span: Span },
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Bare name
    Name(String),
    /// `value.attr`
    Attribute { value: Box<Expr>, attr: String },
    /// `value[slice]`; multiple or sliced subscript arguments become a Tuple
    Subscript { value: Box<Expr>, slice: Box<Expr> },
    /// Single-element slice wrapper produced by older tree builders.
    ///
    /// The bundled parser never emits this, but programmatically built trees
    /// mirroring pre-3.9 grammars may contain it and the rule traverses it.
    Index { value: Box<Expr> },
    /// `func(args)`; keyword arguments contribute their value expression
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// `(a, b)` or an unparenthesized expression list
    Tuple { elts: Vec<Expr> },
    /// `[a, b]`
    List { elts: Vec<Expr> },
    /// `{a, b}` or `{k: v}`; dict keys and values are flattened together
    Set { elts: Vec<Expr> },
    /// Binary operation, including `X | Y` union annotations
    BinOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation (`-x`, `not x`, `~x`, `await x`)
    UnaryOp { operand: Box<Expr> },
    /// `target := value`
    Named { target: Box<Expr>, value: Box<Expr> },
    /// `*value` in calls, displays and targets
    Starred { value: Box<Expr> },
    /// `lambda params: body`; only the body expression is kept
    Lambda { body: Box<Expr> },
    /// Literal constant
    Constant(Constant),
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    In,
    BitOr,
    BitXor,
    BitAnd,
    LShift,
    RShift,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Literal constant; numeric and string literals keep their source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Number(String),
    Str(String),
    Bool(bool),
    None,
    Ellipsis,
}

impl Expr {
    /// Convenience constructor for a name expression
    pub fn name(name: impl Into<String>) -> Expr {
        Expr::Name(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_constructor() {
        assert_eq!(Expr::name("dict"), Expr::Name("dict".to_string()));
    }

    #[test]
    fn test_serde_round_trip() {
        let module = Module {
            body: vec![Stmt::ImportFrom {
                module: "typing".to_string(),
                names: vec![ImportAlias {
                    name: "Dict".to_string(),
                    asname: None,
                }],
                span: Span::new(0, 23),
            }],
        };
        let json = serde_json::to_string(&module).unwrap();
        let back: Module = serde_json::from_str(&json).unwrap();
        assert_eq!(back, module);
    }
}
