//! Token types for lexical analysis
//!
//! Defines the Python-subset tokens recognized by the lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token
    pub lexeme: String,
    /// Source location
    pub span: Span,
}

impl Token {
    /// Create a new token
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Identifier
    Name,
    /// Number literal (42, 3.14, 0x2a)
    Number,
    /// String literal, including prefixed and triple-quoted forms
    Str,

    // Keywords
    /// `from` keyword
    From,
    /// `import` keyword
    Import,
    /// `as` keyword
    As,
    /// `def` keyword
    Def,
    /// `class` keyword
    Class,
    /// `return` keyword
    Return,
    /// `pass` keyword
    Pass,
    /// `break` keyword
    Break,
    /// `continue` keyword
    Continue,
    /// `if` keyword
    If,
    /// `elif` keyword
    Elif,
    /// `else` keyword
    Else,
    /// `while` keyword
    While,
    /// `for` keyword
    For,
    /// `in` keyword
    In,
    /// `with` keyword
    With,
    /// `try` keyword
    Try,
    /// `except` keyword
    Except,
    /// `finally` keyword
    Finally,
    /// `raise` keyword
    Raise,
    /// `lambda` keyword
    Lambda,
    /// `not` keyword
    Not,
    /// `and` keyword
    And,
    /// `or` keyword
    Or,
    /// `is` keyword
    Is,
    /// `None` keyword
    None,
    /// `True` keyword
    True,
    /// `False` keyword
    False,
    /// `async` keyword
    Async,
    /// `await` keyword
    Await,
    /// `del` keyword
    Del,
    /// `global` keyword
    Global,
    /// `nonlocal` keyword
    Nonlocal,
    /// `assert` keyword
    Assert,
    /// `yield` keyword
    Yield,

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `->`
    Arrow,
    /// `@` (decorator marker)
    At,
    /// `=`
    Equal,
    /// `:=`
    Walrus,
    /// Any augmented assignment operator (`+=`, `|=`, `//=`, ...)
    AugAssign,

    // Operators
    /// `|`
    Pipe,
    /// `&`
    Amp,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `%`
    Percent,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,

    // Layout
    /// End of a logical line
    Newline,
    /// Increase in indentation level
    Indent,
    /// Decrease in indentation level
    Dedent,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Look up the keyword kind for an identifier lexeme, if any
    pub fn is_keyword(lexeme: &str) -> Option<TokenKind> {
        let kind = match lexeme {
            "from" => TokenKind::From,
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            "def" => TokenKind::Def,
            "class" => TokenKind::Class,
            "return" => TokenKind::Return,
            "pass" => TokenKind::Pass,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "with" => TokenKind::With,
            "try" => TokenKind::Try,
            "except" => TokenKind::Except,
            "finally" => TokenKind::Finally,
            "raise" => TokenKind::Raise,
            "lambda" => TokenKind::Lambda,
            "not" => TokenKind::Not,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "is" => TokenKind::Is,
            "None" => TokenKind::None,
            "True" => TokenKind::True,
            "False" => TokenKind::False,
            "async" => TokenKind::Async,
            "await" => TokenKind::Await,
            "del" => TokenKind::Del,
            "global" => TokenKind::Global,
            "nonlocal" => TokenKind::Nonlocal,
            "assert" => TokenKind::Assert,
            "yield" => TokenKind::Yield,
            _ => return None,
        };
        Some(kind)
    }
}
