//! falint core - future-annotations lint for Python source
//!
//! This library provides everything the lint needs short of a host:
//! - Lexical analysis and parsing of the Python subset the rule inspects
//! - The fact-collecting visitor
//! - The rule evaluator producing FA100/FA101/FA102 diagnostics

/// falint core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod checker;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;
pub mod visitor;

// Re-export commonly used types
pub use checker::{evaluate, Config, FutureAnnotationsChecker};
pub use diagnostic::{codes, Diagnostic, DiagnosticLevel, DIAG_VERSION};
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::{offset_to_line_col, Span};
pub use token::{Token, TokenKind};
pub use visitor::{FutureAnnotationsVisitor, DEFERRED_TYPING_NAMES, SIMPLIFIED_NAMES};

/// Parse source text, returning the module and any lexer/parser
/// diagnostics in the order they were found
pub fn parse_source(source: &str) -> (ast::Module, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source);
    let (tokens, mut diagnostics) = lexer.tokenize();
    let mut parser = Parser::new(tokens);
    let (module, parse_diagnostics) = parser.parse();
    diagnostics.extend(parse_diagnostics);
    (module, diagnostics)
}

/// Full pipeline over source text: syntax diagnostics when the file does
/// not parse cleanly, lint diagnostics otherwise
pub fn get_all_diagnostics(source: &str, config: Config) -> Vec<Diagnostic> {
    let (module, diagnostics) = parse_source(source);
    if !diagnostics.is_empty() {
        return diagnostics;
    }
    evaluate(&module, config)
}
