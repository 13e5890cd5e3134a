//! Parsing (tokens to AST)
//!
//! Recursive descent over the Python subset the rule inspects. Statements
//! dispatch on their leading token; expressions use one precedence ladder.
//! Errors are collected as diagnostics and recovery skips to the next
//! logical line, so one bad statement never hides the rest of the file.

use crate::ast::*;
use crate::diagnostic::{codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser state for building an AST from tokens
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

fn binop(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", Span::default()));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parse tokens into a module
    pub fn parse(&mut self) -> (Module, Vec<Diagnostic>) {
        let mut body = Vec::new();

        while !self.is_at_end() {
            if self.match_token(TokenKind::Newline)
                || self.match_token(TokenKind::Indent)
                || self.match_token(TokenKind::Dedent)
                || self.match_token(TokenKind::Semicolon)
            {
                continue;
            }
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(()) => self.synchronize(),
            }
        }

        (Module { body }, std::mem::take(&mut self.diagnostics))
    }

    // === Statements ===

    fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::At => self.parse_decorated(),
            TokenKind::From => self.parse_import_from(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Def => self.parse_function(Vec::new()),
            TokenKind::Class => self.parse_class(Vec::new()),
            TokenKind::Async => {
                self.advance();
                match self.peek().kind {
                    TokenKind::Def => self.parse_function(Vec::new()),
                    TokenKind::For => self.parse_for(),
                    TokenKind::With => self.parse_with(),
                    _ => {
                        self.error("Expected 'def', 'for' or 'with' after 'async'");
                        Err(())
                    }
                }
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::With => self.parse_with(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Raise => self.parse_raise(),
            TokenKind::Pass | TokenKind::Break | TokenKind::Continue => {
                let span = self.advance().span;
                self.end_of_statement()?;
                Ok(Stmt::Pass { span })
            }
            TokenKind::Del
            | TokenKind::Global
            | TokenKind::Nonlocal
            | TokenKind::Assert
            | TokenKind::Yield => {
                // keyword statements whose operands are plain expressions
                let start = self.advance().span;
                let value = if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
                    Expr::Constant(Constant::None)
                } else {
                    self.parse_expr_list()?
                };
                let span = start.merge(self.previous().span);
                self.end_of_statement()?;
                Ok(Stmt::Expr { value, span })
            }
            _ => self.parse_simple(),
        }
    }

    fn parse_decorated(&mut self) -> Result<Stmt, ()> {
        let mut decorators = Vec::new();
        while self.match_token(TokenKind::At) {
            decorators.push(self.parse_expression()?);
            self.end_of_statement()?;
        }
        match self.peek().kind {
            TokenKind::Def => self.parse_function(decorators),
            TokenKind::Class => self.parse_class(decorators),
            TokenKind::Async => {
                self.advance();
                if self.check(TokenKind::Def) {
                    self.parse_function(decorators)
                } else {
                    self.error("Expected 'def' after 'async'");
                    Err(())
                }
            }
            _ => {
                self.error("Expected 'def' or 'class' after decorators");
                Err(())
            }
        }
    }

    fn parse_import_from(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::From, "Expected 'from'")?.span;

        let mut module = String::new();
        loop {
            if self.match_token(TokenKind::Dot) {
                module.push('.');
            } else if self.match_token(TokenKind::Ellipsis) {
                module.push_str("...");
            } else {
                break;
            }
        }
        if self.check(TokenKind::Name) {
            module.push_str(&self.parse_dotted_name()?);
        }
        if module.is_empty() {
            self.error("Expected module name after 'from'");
            return Err(());
        }

        self.consume(TokenKind::Import, "Expected 'import'")?;

        let mut names = Vec::new();
        if self.match_token(TokenKind::Star) {
            names.push(ImportAlias {
                name: "*".to_string(),
                asname: None,
            });
        } else if self.match_token(TokenKind::LeftParen) {
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                names.push(self.parse_import_alias()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after import names")?;
        } else {
            loop {
                names.push(self.parse_import_alias()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        let span = start.merge(self.previous().span);
        self.end_of_statement()?;

        Ok(Stmt::ImportFrom {
            module,
            names,
            span,
        })
    }

    fn parse_import(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Import, "Expected 'import'")?.span;
        let mut names = Vec::new();
        loop {
            names.push(self.parse_import_alias()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        let span = start.merge(self.previous().span);
        self.end_of_statement()?;
        Ok(Stmt::Import { names, span })
    }

    fn parse_import_alias(&mut self) -> Result<ImportAlias, ()> {
        let name = self.parse_dotted_name()?;
        let asname = if self.match_token(TokenKind::As) {
            Some(self.consume_name("an import alias")?)
        } else {
            None
        };
        Ok(ImportAlias { name, asname })
    }

    fn parse_dotted_name(&mut self) -> Result<String, ()> {
        let mut name = self.consume_name("a module name")?;
        while self.match_token(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.consume_name("a name after '.'")?);
        }
        Ok(name)
    }

    fn parse_function(&mut self, decorators: Vec<Expr>) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Def, "Expected 'def'")?.span;
        let name = self.consume_name("a function name")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            if self.match_token(TokenKind::Slash) {
                // positional-only marker
            } else if self.match_token(TokenKind::Star) || self.match_token(TokenKind::DoubleStar)
            {
                // *args / **kwargs, or a bare '*' keyword-only marker
                if self.check(TokenKind::Name) {
                    params.push(self.parse_param()?);
                }
            } else {
                params.push(self.parse_param()?);
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        let returns = if self.match_token(TokenKind::Arrow) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Colon, "Expected ':' after function signature")?;
        let body = self.parse_suite()?;

        Ok(Stmt::FunctionDef {
            name,
            decorators,
            params,
            returns,
            body,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_param(&mut self) -> Result<Param, ()> {
        let name = self.consume_name("a parameter name")?;
        let annotation = if self.match_token(TokenKind::Colon) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let default = if self.match_token(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Param {
            name,
            annotation,
            default,
        })
    }

    fn parse_class(&mut self, decorators: Vec<Expr>) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Class, "Expected 'class'")?.span;
        let name = self.consume_name("a class name")?;

        let mut bases = Vec::new();
        if self.match_token(TokenKind::LeftParen) {
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                let mut base = self.parse_expression()?;
                if self.match_token(TokenKind::Equal) {
                    // keyword argument such as metaclass=...; keep the value
                    base = self.parse_expression()?;
                }
                bases.push(base);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after base classes")?;
        }
        self.consume(TokenKind::Colon, "Expected ':' after class header")?;
        let body = self.parse_suite()?;

        Ok(Stmt::ClassDef {
            name,
            decorators,
            bases,
            body,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ()> {
        let start = self.advance().span; // 'if' or 'elif'
        let test = self.parse_expression()?;
        self.consume(TokenKind::Colon, "Expected ':' after condition")?;
        let body = self.parse_suite()?;

        let mut orelse = Vec::new();
        if self.check(TokenKind::Elif) {
            orelse.push(self.parse_if()?);
        } else if self.match_token(TokenKind::Else) {
            self.consume(TokenKind::Colon, "Expected ':' after 'else'")?;
            orelse = self.parse_suite()?;
        }

        Ok(Stmt::If {
            test,
            body,
            orelse,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::While, "Expected 'while'")?.span;
        let test = self.parse_expression()?;
        self.consume(TokenKind::Colon, "Expected ':' after condition")?;
        let mut body = self.parse_suite()?;
        if self.match_token(TokenKind::Else) {
            // loop else clauses fold into the body
            self.consume(TokenKind::Colon, "Expected ':' after 'else'")?;
            body.extend(self.parse_suite()?);
        }
        Ok(Stmt::While {
            test,
            body,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::For, "Expected 'for'")?.span;
        let target = self.parse_target_list()?;
        self.consume(TokenKind::In, "Expected 'in'")?;
        let iter = self.parse_expr_list()?;
        self.consume(TokenKind::Colon, "Expected ':' after loop header")?;
        let mut body = self.parse_suite()?;
        if self.match_token(TokenKind::Else) {
            self.consume(TokenKind::Colon, "Expected ':' after 'else'")?;
            body.extend(self.parse_suite()?);
        }
        Ok(Stmt::For {
            target,
            iter,
            body,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_with(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::With, "Expected 'with'")?.span;
        let mut items = Vec::new();
        loop {
            let context = self.parse_expression()?;
            let target = if self.match_token(TokenKind::As) {
                Some(self.parse_target()?)
            } else {
                None
            };
            items.push(WithItem { context, target });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Colon, "Expected ':' after 'with' items")?;
        let body = self.parse_suite()?;
        Ok(Stmt::With {
            items,
            body,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_try(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Try, "Expected 'try'")?.span;
        self.consume(TokenKind::Colon, "Expected ':' after 'try'")?;
        let body = self.parse_suite()?;

        let mut handlers = Vec::new();
        while self.match_token(TokenKind::Except) {
            self.match_token(TokenKind::Star); // except* groups
            let kind = if !self.check(TokenKind::Colon) {
                let expr = self.parse_expression()?;
                if self.match_token(TokenKind::As) {
                    self.consume_name("an exception name")?;
                }
                Some(expr)
            } else {
                None
            };
            self.consume(TokenKind::Colon, "Expected ':' after 'except'")?;
            handlers.push(ExceptHandler {
                kind,
                body: self.parse_suite()?,
            });
        }

        let orelse = if self.match_token(TokenKind::Else) {
            self.consume(TokenKind::Colon, "Expected ':' after 'else'")?;
            self.parse_suite()?
        } else {
            Vec::new()
        };
        let finalbody = if self.match_token(TokenKind::Finally) {
            self.consume(TokenKind::Colon, "Expected ':' after 'finally'")?;
            self.parse_suite()?
        } else {
            Vec::new()
        };

        Ok(Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
            span: start.merge(self.previous().span),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Return, "Expected 'return'")?.span;
        let value = if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr_list()?)
        };
        let span = start.merge(self.previous().span);
        self.end_of_statement()?;
        Ok(Stmt::Return { value, span })
    }

    fn parse_raise(&mut self) -> Result<Stmt, ()> {
        let start = self.consume(TokenKind::Raise, "Expected 'raise'")?.span;
        let value = if self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            None
        } else {
            let exc = self.parse_expression()?;
            if self.match_token(TokenKind::From) {
                let cause = self.parse_expression()?;
                Some(Expr::Tuple {
                    elts: vec![exc, cause],
                })
            } else {
                Some(exc)
            }
        };
        let span = start.merge(self.previous().span);
        self.end_of_statement()?;
        Ok(Stmt::Raise { value, span })
    }

    /// Expression statement, assignment or annotated assignment
    fn parse_simple(&mut self) -> Result<Stmt, ()> {
        let start = self.peek().span;
        let first = self.parse_expr_list()?;

        if self.match_token(TokenKind::Colon) {
            let annotation = self.parse_expression()?;
            let value = if self.match_token(TokenKind::Equal) {
                Some(self.parse_expr_list()?)
            } else {
                None
            };
            let span = start.merge(self.previous().span);
            self.end_of_statement()?;
            return Ok(Stmt::AnnAssign {
                target: first,
                annotation,
                value,
                span,
            });
        }

        if self.check(TokenKind::Equal) {
            let mut targets = vec![first];
            let mut value = None;
            while self.match_token(TokenKind::Equal) {
                let expr = self.parse_expr_list()?;
                if let Some(prev) = value.replace(expr) {
                    targets.push(prev);
                }
            }
            let value = value.unwrap_or(Expr::Constant(Constant::None));
            let span = start.merge(self.previous().span);
            self.end_of_statement()?;
            return Ok(Stmt::Assign {
                targets,
                value,
                span,
            });
        }

        if self.match_token(TokenKind::AugAssign) {
            let value = self.parse_expr_list()?;
            let span = start.merge(self.previous().span);
            self.end_of_statement()?;
            return Ok(Stmt::Assign {
                targets: vec![first],
                value,
                span,
            });
        }

        let span = start.merge(self.previous().span);
        self.end_of_statement()?;
        Ok(Stmt::Expr { value: first, span })
    }

    /// Parse an indented suite, or the single statement after ':' on the
    /// header line
    fn parse_suite(&mut self) -> Result<Vec<Stmt>, ()> {
        if self.match_token(TokenKind::Newline) {
            self.consume(TokenKind::Indent, "Expected an indented block")?;
            let mut body = Vec::new();
            while !self.check(TokenKind::Dedent) && !self.is_at_end() {
                if self.match_token(TokenKind::Newline) || self.match_token(TokenKind::Semicolon) {
                    continue;
                }
                match self.parse_statement() {
                    Ok(stmt) => body.push(stmt),
                    Err(()) => self.synchronize(),
                }
            }
            self.match_token(TokenKind::Dedent);
            Ok(body)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    // === Expressions ===

    fn parse_expr_list(&mut self) -> Result<Expr, ()> {
        let first = self.parse_expression()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elts.push(self.parse_expression()?);
        }
        Ok(Expr::Tuple { elts })
    }

    fn parse_expression(&mut self) -> Result<Expr, ()> {
        if self.check(TokenKind::Lambda) {
            return self.parse_lambda();
        }
        if self.match_token(TokenKind::Yield) {
            self.match_token(TokenKind::From);
            if self.starts_expression() {
                let operand = self.parse_ternary()?;
                return Ok(Expr::UnaryOp {
                    operand: Box::new(operand),
                });
            }
            return Ok(Expr::Constant(Constant::None));
        }
        let expr = self.parse_ternary()?;
        if self.match_token(TokenKind::Walrus) {
            let value = self.parse_expression()?;
            return Ok(Expr::Named {
                target: Box::new(expr),
                value: Box::new(value),
            });
        }
        Ok(expr)
    }

    fn parse_ternary(&mut self) -> Result<Expr, ()> {
        let expr = self.parse_or()?;
        if self.match_token(TokenKind::If) {
            let test = self.parse_or()?;
            self.consume(TokenKind::Else, "Expected 'else' in conditional expression")?;
            let orelse = self.parse_expression()?;
            // conditional expressions fold to a tuple of their three parts
            return Ok(Expr::Tuple {
                elts: vec![expr, test, orelse],
            });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_and()?;
        while self.match_token(TokenKind::Or) {
            let right = self.parse_and()?;
            expr = binop(expr, BinaryOp::Or, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_not()?;
        while self.match_token(TokenKind::And) {
            let right = self.parse_not()?;
            expr = binop(expr, BinaryOp::And, right);
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<Expr, ()> {
        if self.match_token(TokenKind::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::UnaryOp {
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_bitor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEqual => BinaryOp::Eq,
                TokenKind::BangEqual => BinaryOp::NotEq,
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEqual => BinaryOp::LtE,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEqual => BinaryOp::GtE,
                TokenKind::In => BinaryOp::In,
                TokenKind::Is => BinaryOp::Is,
                TokenKind::Not if self.peek_kind_at(1) == TokenKind::In => {
                    self.advance();
                    BinaryOp::In
                }
                _ => break,
            };
            self.advance();
            if op == BinaryOp::Is {
                self.match_token(TokenKind::Not);
            }
            let right = self.parse_bitor()?;
            expr = binop(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_bitor(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_bitxor()?;
        while self.match_token(TokenKind::Pipe) {
            let right = self.parse_bitxor()?;
            expr = binop(expr, BinaryOp::BitOr, right);
        }
        Ok(expr)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_bitand()?;
        while self.match_token(TokenKind::Caret) {
            let right = self.parse_bitand()?;
            expr = binop(expr, BinaryOp::BitXor, right);
        }
        Ok(expr)
    }

    fn parse_bitand(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_shift()?;
        while self.match_token(TokenKind::Amp) {
            let right = self.parse_shift()?;
            expr = binop(expr, BinaryOp::BitAnd, right);
        }
        Ok(expr)
    }

    fn parse_shift(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_arith()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::LeftShift => BinaryOp::LShift,
                TokenKind::RightShift => BinaryOp::RShift,
                _ => break,
            };
            self.advance();
            let right = self.parse_arith()?;
            expr = binop(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_arith(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = binop(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::DoubleSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = binop(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Minus | TokenKind::Plus | TokenKind::Tilde | TokenKind::Await => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    operand: Box::new(operand),
                })
            }
            TokenKind::Star | TokenKind::DoubleStar => {
                self.advance();
                let value = self.parse_unary()?;
                Ok(Expr::Starred {
                    value: Box::new(value),
                })
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ()> {
        let base = self.parse_postfix()?;
        if self.match_token(TokenKind::DoubleStar) {
            let exp = self.parse_unary()?;
            return Ok(binop(base, BinaryOp::Pow, exp));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ()> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(TokenKind::Dot) {
                let attr = self.consume_name("an attribute name")?;
                expr = Expr::Attribute {
                    value: Box::new(expr),
                    attr,
                };
            } else if self.match_token(TokenKind::LeftParen) {
                let args = self.parse_call_args()?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.match_token(TokenKind::LeftBracket) {
                let slice = self.parse_subscript_slice()?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    slice: Box::new(slice),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ()> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::Name => Ok(Expr::Name(token.lexeme)),
            TokenKind::Number => Ok(Expr::Constant(Constant::Number(token.lexeme))),
            TokenKind::Str => {
                // adjacent string literals concatenate
                while self.check(TokenKind::Str) {
                    self.advance();
                }
                Ok(Expr::Constant(Constant::Str(token.lexeme)))
            }
            TokenKind::None => Ok(Expr::Constant(Constant::None)),
            TokenKind::True => Ok(Expr::Constant(Constant::Bool(true))),
            TokenKind::False => Ok(Expr::Constant(Constant::Bool(false))),
            TokenKind::Ellipsis => Ok(Expr::Constant(Constant::Ellipsis)),
            TokenKind::LeftParen => {
                if self.match_token(TokenKind::RightParen) {
                    return Ok(Expr::Tuple { elts: Vec::new() });
                }
                let first = self.parse_expression()?;
                let mut elts = vec![first];
                let mut grouped = true;
                if self.check(TokenKind::For) || self.check(TokenKind::Async) {
                    self.parse_comprehension_clauses(&mut elts)?;
                    grouped = false;
                }
                while self.match_token(TokenKind::Comma) {
                    grouped = false;
                    if !self.starts_expression() {
                        break;
                    }
                    elts.push(self.parse_expression()?);
                }
                self.consume(TokenKind::RightParen, "Expected ')'")?;
                if grouped {
                    Ok(elts.pop().unwrap_or(Expr::Tuple { elts: Vec::new() }))
                } else {
                    Ok(Expr::Tuple { elts })
                }
            }
            TokenKind::LeftBracket => {
                let elts = self.parse_display_items(TokenKind::RightBracket)?;
                self.consume(TokenKind::RightBracket, "Expected ']'")?;
                Ok(Expr::List { elts })
            }
            TokenKind::LeftBrace => {
                let elts = self.parse_brace_items()?;
                self.consume(TokenKind::RightBrace, "Expected '}'")?;
                Ok(Expr::Set { elts })
            }
            _ => {
                self.error_at(&token, "Expected an expression");
                Err(())
            }
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ()> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            let mut arg = self.parse_expression()?;
            if self.match_token(TokenKind::Equal) {
                // keyword argument; keep the value expression
                arg = self.parse_expression()?;
            }
            args.push(arg);
            if self.check(TokenKind::For) || self.check(TokenKind::Async) {
                self.parse_comprehension_clauses(&mut args)?;
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;
        Ok(args)
    }

    fn parse_subscript_slice(&mut self) -> Result<Expr, ()> {
        let mut elts = Vec::new();
        let mut tuple = false;
        loop {
            if self.check(TokenKind::RightBracket) {
                break;
            }
            let mut parts = Vec::new();
            let mut sliced = false;
            if !self.check(TokenKind::Colon) {
                parts.push(self.parse_expression()?);
            }
            while self.match_token(TokenKind::Colon) {
                sliced = true;
                if !self.check(TokenKind::Colon)
                    && !self.check(TokenKind::Comma)
                    && !self.check(TokenKind::RightBracket)
                {
                    parts.push(self.parse_expression()?);
                }
            }
            let elt = if !sliced && parts.len() == 1 {
                parts.pop().unwrap_or(Expr::Constant(Constant::None))
            } else {
                Expr::Tuple { elts: parts }
            };
            elts.push(elt);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
            tuple = true;
        }
        self.consume(TokenKind::RightBracket, "Expected ']' after subscript")?;
        if !tuple && elts.len() == 1 {
            Ok(elts.pop().unwrap_or(Expr::Tuple { elts: Vec::new() }))
        } else {
            Ok(Expr::Tuple { elts })
        }
    }

    fn parse_display_items(&mut self, end: TokenKind) -> Result<Vec<Expr>, ()> {
        let mut elts = Vec::new();
        while !self.check(end) && !self.is_at_end() {
            elts.push(self.parse_expression()?);
            if self.check(TokenKind::For) || self.check(TokenKind::Async) {
                self.parse_comprehension_clauses(&mut elts)?;
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(elts)
    }

    fn parse_brace_items(&mut self) -> Result<Vec<Expr>, ()> {
        let mut elts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            elts.push(self.parse_expression()?);
            if self.match_token(TokenKind::Colon) {
                // dict entry; key and value both land in the element list
                elts.push(self.parse_expression()?);
            }
            if self.check(TokenKind::For) || self.check(TokenKind::Async) {
                self.parse_comprehension_clauses(&mut elts)?;
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(elts)
    }

    /// Parse `for target in iter [if cond]*` clauses, pushing the clause
    /// expressions into the enclosing display's element list
    fn parse_comprehension_clauses(&mut self, elts: &mut Vec<Expr>) -> Result<(), ()> {
        loop {
            if self.check(TokenKind::Async) && self.peek_kind_at(1) == TokenKind::For {
                self.advance();
            }
            if !self.match_token(TokenKind::For) {
                break;
            }
            let target = self.parse_target_list()?;
            self.consume(TokenKind::In, "Expected 'in' in comprehension")?;
            let iter = self.parse_or()?;
            elts.push(target);
            elts.push(iter);
            while self.match_token(TokenKind::If) {
                elts.push(self.parse_or()?);
            }
        }
        Ok(())
    }

    /// Assignment and loop targets: names, attributes, subscripts, starred
    /// names and nested target lists; `in` is not an operator here
    fn parse_target(&mut self) -> Result<Expr, ()> {
        if self.match_token(TokenKind::Star) {
            let value = self.parse_target()?;
            return Ok(Expr::Starred {
                value: Box::new(value),
            });
        }
        if self.match_token(TokenKind::LeftParen) {
            let inner = self.parse_target_list()?;
            self.consume(TokenKind::RightParen, "Expected ')'")?;
            return Ok(inner);
        }
        if self.match_token(TokenKind::LeftBracket) {
            let inner = self.parse_target_list()?;
            self.consume(TokenKind::RightBracket, "Expected ']'")?;
            return Ok(inner);
        }
        self.parse_postfix()
    }

    fn parse_target_list(&mut self) -> Result<Expr, ()> {
        let first = self.parse_target()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if self.check(TokenKind::In)
                || self.check(TokenKind::Colon)
                || self.check(TokenKind::Equal)
                || self.check(TokenKind::RightParen)
                || self.check(TokenKind::RightBracket)
            {
                break;
            }
            elts.push(self.parse_target()?);
        }
        Ok(Expr::Tuple { elts })
    }

    fn parse_lambda(&mut self) -> Result<Expr, ()> {
        self.consume(TokenKind::Lambda, "Expected 'lambda'")?;
        while !self.check(TokenKind::Colon) && !self.is_at_end() {
            if self.match_token(TokenKind::Comma)
                || self.match_token(TokenKind::Star)
                || self.match_token(TokenKind::DoubleStar)
                || self.match_token(TokenKind::Slash)
            {
                continue;
            }
            self.consume_name("a lambda parameter")?;
            if self.match_token(TokenKind::Equal) {
                self.parse_ternary()?;
            }
        }
        self.consume(TokenKind::Colon, "Expected ':' after lambda parameters")?;
        let body = self.parse_expression()?;
        Ok(Expr::Lambda {
            body: Box::new(body),
        })
    }

    // === Helpers ===

    fn starts_expression(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Name
                | TokenKind::Number
                | TokenKind::Str
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Ellipsis
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Star
                | TokenKind::DoubleStar
                | TokenKind::Lambda
                | TokenKind::Await
                | TokenKind::Yield
        )
    }

    fn end_of_statement(&mut self) -> Result<(), ()> {
        if self.match_token(TokenKind::Semicolon) {
            self.match_token(TokenKind::Newline);
            return Ok(());
        }
        if self.match_token(TokenKind::Newline) || self.is_at_end() {
            return Ok(());
        }
        self.error("Expected end of statement");
        Err(())
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.current + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ()> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            self.error(message);
            Err(())
        }
    }

    fn consume_name(&mut self, context: &str) -> Result<String, ()> {
        if self.check(TokenKind::Name) {
            Ok(self.advance().lexeme.clone())
        } else {
            self.error(&format!("Expected {context}"));
            Err(())
        }
    }

    fn error(&mut self, message: &str) {
        let span = self.peek().span;
        self.diagnostics
            .push(Diagnostic::error_with_code(codes::SYNTAX_ERROR, message, span));
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        self.diagnostics.push(Diagnostic::error_with_code(
            codes::SYNTAX_ERROR,
            message,
            token.span,
        ));
    }

    /// Skip to the start of the next logical line
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Newline => {
                    self.advance();
                    return;
                }
                TokenKind::Dedent => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Module {
        let mut lexer = Lexer::new(source);
        let (tokens, lex_diags) = lexer.tokenize();
        assert!(lex_diags.is_empty(), "lexer diagnostics: {lex_diags:?}");
        let mut parser = Parser::new(tokens);
        let (module, parse_diags) = parser.parse();
        assert!(parse_diags.is_empty(), "parser diagnostics: {parse_diags:?}");
        module
    }

    #[test]
    fn test_import_from() {
        let module = parse("from typing import Dict, List as L\n");
        assert_eq!(
            module.body,
            vec![Stmt::ImportFrom {
                module: "typing".to_string(),
                names: vec![
                    ImportAlias {
                        name: "Dict".to_string(),
                        asname: None
                    },
                    ImportAlias {
                        name: "List".to_string(),
                        asname: Some("L".to_string())
                    },
                ],
                span: Span::new(0, 34),
            }]
        );
    }

    #[test]
    fn test_parenthesized_import_names() {
        let module = parse("from typing import (\n    Dict,\n    Optional,\n)\n");
        match &module.body[0] {
            Stmt::ImportFrom { module, names, .. } => {
                assert_eq!(module, "typing");
                assert_eq!(names.len(), 2);
                assert_eq!(names[1].name, "Optional");
            }
            other => panic!("expected ImportFrom, got {other:?}"),
        }
    }

    #[test]
    fn test_relative_import() {
        let module = parse("from . import helpers\nfrom ..pkg import thing\n");
        match &module.body[0] {
            Stmt::ImportFrom { module, .. } => assert_eq!(module, "."),
            other => panic!("expected ImportFrom, got {other:?}"),
        }
        match &module.body[1] {
            Stmt::ImportFrom { module, .. } => assert_eq!(module, "..pkg"),
            other => panic!("expected ImportFrom, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_import_with_alias() {
        let module = parse("import typing as t, os.path\n");
        match &module.body[0] {
            Stmt::Import { names, .. } => {
                assert_eq!(names[0].name, "typing");
                assert_eq!(names[0].asname.as_deref(), Some("t"));
                assert_eq!(names[1].name, "os.path");
                assert_eq!(names[1].asname, None);
            }
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[test]
    fn test_function_with_annotations() {
        let module = parse("def f(x: dict[str, int], y=0) -> list[int]:\n    return y\n");
        match &module.body[0] {
            Stmt::FunctionDef {
                name,
                params,
                returns,
                body,
                ..
            } => {
                assert_eq!(name, "f");
                assert_eq!(params.len(), 2);
                match params[0].annotation.as_ref() {
                    Some(Expr::Subscript { value, slice }) => {
                        assert_eq!(**value, Expr::name("dict"));
                        assert_eq!(
                            **slice,
                            Expr::Tuple {
                                elts: vec![Expr::name("str"), Expr::name("int")]
                            }
                        );
                    }
                    other => panic!("expected subscript annotation, got {other:?}"),
                }
                assert!(params[1].annotation.is_none());
                assert!(params[1].default.is_some());
                assert!(matches!(returns, Some(Expr::Subscript { .. })));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn test_annotated_assignment_with_union() {
        let module = parse("x: dict[str, int] | None = None\n");
        match &module.body[0] {
            Stmt::AnnAssign {
                annotation, value, ..
            } => {
                assert!(matches!(
                    annotation,
                    Expr::BinOp {
                        op: BinaryOp::BitOr,
                        ..
                    }
                ));
                assert_eq!(value.as_ref(), Some(&Expr::Constant(Constant::None)));
            }
            other => panic!("expected AnnAssign, got {other:?}"),
        }
    }

    #[test]
    fn test_class_with_methods() {
        let module = parse(
            "class Point(Base):\n    x: int\n\n    def scale(self, factor: float) -> None:\n        pass\n",
        );
        match &module.body[0] {
            Stmt::ClassDef {
                name, bases, body, ..
            } => {
                assert_eq!(name, "Point");
                assert_eq!(bases, &vec![Expr::name("Base")]);
                assert_eq!(body.len(), 2);
                assert!(matches!(body[1], Stmt::FunctionDef { .. }));
            }
            other => panic!("expected ClassDef, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_chain() {
        let module = parse("x = t.Dict[str, int]\n");
        match &module.body[0] {
            Stmt::Assign { value, .. } => match value {
                Expr::Subscript { value, .. } => {
                    assert_eq!(
                        **value,
                        Expr::Attribute {
                            value: Box::new(Expr::name("t")),
                            attr: "Dict".to_string()
                        }
                    );
                }
                other => panic!("expected Subscript, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn test_decorated_async_def() {
        let module = parse("@wraps(fn)\nasync def go(x: int) -> str:\n    return x\n");
        match &module.body[0] {
            Stmt::FunctionDef {
                name, decorators, ..
            } => {
                assert_eq!(name, "go");
                assert_eq!(decorators.len(), 1);
            }
            other => panic!("expected FunctionDef, got {other:?}"),
        }
    }

    #[test]
    fn test_compound_statements() {
        let module = parse(
            "if a:\n    pass\nelif b:\n    pass\nelse:\n    pass\nfor i in xs:\n    pass\nwhile True:\n    break\nwith open(p) as f:\n    pass\ntry:\n    pass\nexcept ValueError as e:\n    pass\nfinally:\n    pass\n",
        );
        assert_eq!(module.body.len(), 5);
        assert!(matches!(module.body[0], Stmt::If { .. }));
        assert!(matches!(module.body[1], Stmt::For { .. }));
        assert!(matches!(module.body[2], Stmt::While { .. }));
        assert!(matches!(module.body[3], Stmt::With { .. }));
        assert!(matches!(module.body[4], Stmt::Try { .. }));
    }

    #[test]
    fn test_comprehension_folds_into_display() {
        let module = parse("ys = [f(x) for x in xs if x]\n");
        match &module.body[0] {
            Stmt::Assign { value, .. } => match value {
                Expr::List { elts } => assert_eq!(elts.len(), 4),
                other => panic!("expected List, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn test_error_recovery_keeps_later_statements() {
        let mut lexer = Lexer::new("def broken:\nx = 1\n");
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let (module, diagnostics) = parser.parse();
        assert!(!diagnostics.is_empty());
        assert!(module
            .body
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Assign { .. })));
    }

    #[test]
    fn test_chained_assignment() {
        let module = parse("a = b = c\n");
        match &module.body[0] {
            Stmt::Assign { targets, value, .. } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(value, &Expr::name("c"));
            }
            other => panic!("expected Assign, got {other:?}"),
        }
    }
}
