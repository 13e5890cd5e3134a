//! Lexical analysis (tokenization)
//!
//! The lexer converts Python source into a stream of tokens with span
//! information, including the layout tokens (`Newline`, `Indent`, `Dedent`)
//! the parser needs to recover suite structure. Newlines inside brackets are
//! suppressed, matching Python's implicit line joining.

use crate::diagnostic::{codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Characters of source code
    chars: Vec<char>,
    /// Current position in chars
    current: usize,
    /// Start position of current token
    start_pos: usize,
    /// Indentation stack, in columns; always holds at least the 0 level
    indent_stack: Vec<usize>,
    /// Open bracket depth; newlines are suppressed while non-zero
    bracket_depth: usize,
    /// Whether the next token starts a logical line
    at_line_start: bool,
    /// Collected diagnostics
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            start_pos: 0,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.scan_indentation(&mut tokens);
            }
            if self.is_at_end() {
                break;
            }
            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }

        // Close the final logical line and any open indentation
        let end = Span::new(self.current, self.current);
        if !matches!(tokens.last().map(|t| t.kind), None | Some(TokenKind::Newline)) {
            tokens.push(Token::new(TokenKind::Newline, "", end));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(TokenKind::Dedent, "", end));
        }
        tokens.push(Token::new(TokenKind::Eof, "", end));

        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Measure leading whitespace at the start of a logical line and emit
    /// Indent/Dedent tokens. Blank and comment-only lines are skipped.
    fn scan_indentation(&mut self, tokens: &mut Vec<Token>) {
        loop {
            let line_start = self.current;
            let mut width = 0usize;
            loop {
                match self.peek() {
                    ' ' => {
                        width += 1;
                        self.advance();
                    }
                    '\t' => {
                        // tabs advance to the next multiple of eight
                        width = width - width % 8 + 8;
                        self.advance();
                    }
                    _ => break,
                }
            }
            if self.is_at_end() {
                self.at_line_start = false;
                return;
            }
            match self.peek() {
                '\n' | '\r' => {
                    let c = self.advance();
                    if c == '\r' {
                        self.match_char('\n');
                    }
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' {
                        self.advance();
                    }
                }
                _ => {
                    self.at_line_start = false;
                    let span = Span::new(line_start, self.current);
                    let top = self.indent_stack.last().copied().unwrap_or(0);
                    match width.cmp(&top) {
                        std::cmp::Ordering::Greater => {
                            self.indent_stack.push(width);
                            tokens.push(Token::new(TokenKind::Indent, "", span));
                        }
                        std::cmp::Ordering::Less => {
                            while self.indent_stack.len() > 1
                                && self.indent_stack.last().copied().unwrap_or(0) > width
                            {
                                self.indent_stack.pop();
                                tokens.push(Token::new(TokenKind::Dedent, "", span));
                            }
                            if self.indent_stack.last().copied().unwrap_or(0) != width {
                                self.diagnostics.push(Diagnostic::error_with_code(
                                    codes::INCONSISTENT_INDENTATION,
                                    "Unindent does not match any outer indentation level",
                                    span,
                                ));
                                self.indent_stack.push(width);
                            }
                        }
                        std::cmp::Ordering::Equal => {}
                    }
                    return;
                }
            }
        }
    }

    /// Scan the next token
    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();

        self.start_pos = self.current;
        if self.is_at_end() {
            return None;
        }

        let c = self.advance();
        let token = match c {
            '\n' => {
                self.at_line_start = true;
                self.make_token(TokenKind::Newline)
            }
            '\r' => {
                self.match_char('\n');
                self.at_line_start = true;
                self.make_token(TokenKind::Newline)
            }

            '(' => self.open_bracket(TokenKind::LeftParen),
            '[' => self.open_bracket(TokenKind::LeftBracket),
            '{' => self.open_bracket(TokenKind::LeftBrace),
            ')' => self.close_bracket(TokenKind::RightParen),
            ']' => self.close_bracket(TokenKind::RightBracket),
            '}' => self.close_bracket(TokenKind::RightBrace),

            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '~' => self.make_token(TokenKind::Tilde),
            ':' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::Walrus)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '.' => {
                if self.peek().is_ascii_digit() {
                    self.number()
                } else if self.peek() == '.' && self.peek_at(1) == '.' {
                    self.advance();
                    self.advance();
                    self.make_token(TokenKind::Ellipsis)
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }
            '@' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::AugAssign)
                } else {
                    self.make_token(TokenKind::At)
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual)
                } else {
                    self.make_token(TokenKind::Equal)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEqual)
                } else {
                    self.unexpected(c);
                    return None;
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual)
                } else if self.match_char('<') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::AugAssign)
                    } else {
                        self.make_token(TokenKind::LeftShift)
                    }
                } else {
                    self.make_token(TokenKind::Less)
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual)
                } else if self.match_char('>') {
                    if self.match_char('=') {
                        self.make_token(TokenKind::AugAssign)
                    } else {
                        self.make_token(TokenKind::RightShift)
                    }
                } else {
                    self.make_token(TokenKind::Greater)
                }
            }
            '+' => self.operator_or_aug(TokenKind::Plus),
            '-' => {
                if self.match_char('>') {
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.operator_or_aug(TokenKind::Minus)
                }
            }
            '*' => {
                if self.match_char('*') {
                    self.operator_or_aug(TokenKind::DoubleStar)
                } else {
                    self.operator_or_aug(TokenKind::Star)
                }
            }
            '/' => {
                if self.match_char('/') {
                    self.operator_or_aug(TokenKind::DoubleSlash)
                } else {
                    self.operator_or_aug(TokenKind::Slash)
                }
            }
            '%' => self.operator_or_aug(TokenKind::Percent),
            '|' => self.operator_or_aug(TokenKind::Pipe),
            '&' => self.operator_or_aug(TokenKind::Amp),
            '^' => self.operator_or_aug(TokenKind::Caret),

            '"' | '\'' => self.string(c),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.unexpected(c);
                return None;
            }
        };
        Some(token)
    }

    /// Skip spaces, comments, explicit line continuations and, inside
    /// brackets, physical newlines
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' => {
                    self.advance();
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' {
                        self.advance();
                    }
                }
                '\\' if self.peek_at(1) == '\n' || self.peek_at(1) == '\r' => {
                    self.advance();
                    let c = self.advance();
                    if c == '\r' {
                        self.match_char('\n');
                    }
                }
                '\n' | '\r' if self.bracket_depth > 0 => {
                    let c = self.advance();
                    if c == '\r' {
                        self.match_char('\n');
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan an identifier, keyword or prefixed string literal
    fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();

        // String prefixes: r"...", f'...', rb"...", ...
        if (self.peek() == '"' || self.peek() == '\'')
            && lexeme.len() <= 2
            && lexeme
                .chars()
                .all(|c| matches!(c, 'r' | 'b' | 'f' | 'u' | 'R' | 'B' | 'F' | 'U'))
        {
            let quote = self.advance();
            return self.string(quote);
        }

        let kind = TokenKind::is_keyword(&lexeme).unwrap_or(TokenKind::Name);
        self.make_token(kind)
    }

    /// Scan a string literal; the opening quote has been consumed.
    ///
    /// String contents are opaque to the rule, so escapes and f-string
    /// interpolations are consumed without interpretation.
    fn string(&mut self, quote: char) -> Token {
        let triple = self.peek() == quote && self.peek_at(1) == quote;
        if triple {
            self.advance();
            self.advance();
        }
        loop {
            if self.is_at_end() {
                self.unterminated_string();
                break;
            }
            let c = self.peek();
            if c == '\\' {
                self.advance();
                if !self.is_at_end() {
                    self.advance();
                }
                continue;
            }
            if triple {
                if c == quote && self.peek_at(1) == quote && self.peek_at(2) == quote {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
                self.advance();
            } else {
                if c == quote {
                    self.advance();
                    break;
                }
                if c == '\n' || c == '\r' {
                    self.unterminated_string();
                    break;
                }
                self.advance();
            }
        }
        self.make_token(TokenKind::Str)
    }

    /// Scan a number literal. Lexing is loose: the rule never reads numeric
    /// values, so hex/octal/float forms are consumed as one token.
    fn number(&mut self) -> Token {
        loop {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.advance();
            } else if (c == '+' || c == '-')
                && matches!(self.chars.get(self.current.wrapping_sub(1)), Some('e') | Some('E'))
                && self.peek_at(1).is_ascii_digit()
            {
                // exponent sign, as in 1e-5
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenKind::Number)
    }

    fn open_bracket(&mut self, kind: TokenKind) -> Token {
        self.bracket_depth += 1;
        self.make_token(kind)
    }

    fn close_bracket(&mut self, kind: TokenKind) -> Token {
        self.bracket_depth = self.bracket_depth.saturating_sub(1);
        self.make_token(kind)
    }

    fn operator_or_aug(&mut self, kind: TokenKind) -> Token {
        if self.match_char('=') {
            self.make_token(TokenKind::AugAssign)
        } else {
            self.make_token(kind)
        }
    }

    fn unexpected(&mut self, c: char) {
        self.diagnostics.push(Diagnostic::error_with_code(
            codes::UNEXPECTED_CHARACTER,
            format!("Unexpected character {c:?}"),
            Span::new(self.start_pos, self.current),
        ));
    }

    fn unterminated_string(&mut self) {
        self.diagnostics.push(Diagnostic::error_with_code(
            codes::UNTERMINATED_STRING,
            "Unterminated string literal",
            Span::new(self.start_pos, self.current),
        ));
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        Token::new(kind, lexeme, Span::new(self.start_pos, self.current))
    }

    fn advance(&mut self) -> char {
        match self.chars.get(self.current) {
            Some(&c) => {
                self.current += 1;
                c
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}
