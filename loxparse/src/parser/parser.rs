use log::{debug, info};

use super::lexer::{Token, TokenKind};
use crate::error::ParseError;
use crate::ir::ast::{self, Expr, Function, Literal, Stmt};
use crate::span::Span;

pub fn parse_tokens(tokens: Vec<Token>) -> Result<ast::Program, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

/// Parses a token stream holding exactly one expression.
pub fn parse_expression_tokens(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.expect(TokenKind::Eof, "end of input after expression")?;
    Ok(expr)
}

/// Recursive descent over a token buffer that always ends in `Eof`.
///
/// Declarations and statements live here; the expression precedence chain is
/// in `expressions.rs`.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

/// Deepest nesting of statements and expressions accepted before reporting
/// an error instead of exhausting the stack.
pub const MAX_NESTING: usize = 100;

impl Parser {
    pub(crate) fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|token| token.is(TokenKind::Eof)) {
            let end = tokens.last().map(|token| token.span.end).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: Span {
                    start: end,
                    end,
                    ..Span::default()
                },
            });
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn parse_program(&mut self) -> Result<ast::Program, ParseError> {
        info!("parsing {} tokens", self.tokens.len());
        let mut declarations = Vec::new();

        while !self.is_at_end() {
            declarations.push(self.parse_declaration()?);
        }

        info!("parsed {} top-level declarations", declarations.len());
        Ok(ast::Program { declarations })
    }

    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        debug!("declaration at {}: {}", self.peek().span, self.peek());
        match self.peek().kind {
            TokenKind::Var => {
                self.advance(); // consume 'var'
                self.parse_var_declaration()
            }
            TokenKind::Fun => {
                self.advance(); // consume 'fun'
                Ok(Stmt::Function(self.parse_function("function")?))
            }
            TokenKind::Class => self.parse_class(),
            _ => self.parse_statement(),
        }
    }

    /// Everything after `var`, including the terminating `;`.
    fn parse_var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect(TokenKind::Identifier, "variable name")?.lexeme.clone();

        let initializer = if self.match_kind(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::Var { name, initializer })
    }

    /// `name(params) { body }`, shared by `fun` declarations and methods.
    fn parse_function(&mut self, kind: &str) -> Result<Function, ParseError> {
        let name = self
            .expect(TokenKind::Identifier, &format!("{} name", kind))?
            .lexeme
            .clone();

        let open = self
            .expect(TokenKind::LParen, &format!("'(' after {} name", kind))?
            .span;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self.expect(TokenKind::Identifier, "parameter name")?;
                params.push(param.lexeme.clone());
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RParen, open, "')' after parameters")?;

        let open = self
            .expect(TokenKind::LBrace, &format!("'{{' before {} body", kind))?
            .span;
        let body = self.parse_block_body(open)?;

        Ok(Function { name, params, body })
    }

    fn parse_class(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'class'
        let name = self.expect(TokenKind::Identifier, "class name")?.lexeme.clone();

        let superclass = if self.match_kind(TokenKind::Less) {
            Some(
                self.expect(TokenKind::Identifier, "superclass name")?
                    .lexeme
                    .clone(),
            )
        } else {
            None
        };

        let open = self
            .expect(TokenKind::LBrace, "'{' before class body")?
            .span;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            methods.push(self.parse_function("method")?);
        }
        self.expect_closing(TokenKind::RBrace, open, "'}' after class body")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Print => self.parse_print(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::LBrace => {
                let open = self.advance().span;
                Ok(Stmt::Block(self.parse_block_body(open)?))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';' after expression")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'print'
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "';' after value")?;
        Ok(Stmt::Print(value))
    }

    /// A trailing `else` is consumed greedily, binding it to the innermost `if`.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'if'
        let condition = self.parse_condition("if")?;
        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'while'
        let condition = self.parse_condition("while")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'for'
        let open = self.expect(TokenKind::LParen, "'(' after 'for'")?.span;

        // Each form of the initializer consumes exactly one ';'.
        let initializer = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => {
                self.advance();
                Some(Box::new(self.parse_var_declaration()?))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';' after loop initializer")?;
                Some(Box::new(Stmt::Expression(expr)))
            }
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Literal::Bool(true))
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_closing(TokenKind::RParen, open, "')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'return'
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';' after return value")?;
        Ok(Stmt::Return(value))
    }

    /// `( expr )` after `if` / `while`.
    fn parse_condition(&mut self, keyword: &str) -> Result<Expr, ParseError> {
        let open = self
            .expect(TokenKind::LParen, &format!("'(' after '{}'", keyword))?
            .span;
        let condition = self.parse_expression()?;
        self.expect_closing(TokenKind::RParen, open, &format!("')' after {} condition", keyword))?;
        Ok(condition)
    }

    /// Declarations up to the `}` matching the already consumed `{` at `open`.
    fn parse_block_body(&mut self, open: Span) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_declaration()?);
        }
        self.expect_closing(TokenKind::RBrace, open, "'}' after block")?;
        Ok(stmts)
    }

    // Вспомогательные методы

    /// Runs `parse` one nesting level deeper, failing past `MAX_NESTING`.
    pub(crate) fn nested<T>(
        &mut self,
        parse: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(syntax_error(
                self.peek().span,
                format!("nesting deeper than {} levels", MAX_NESTING),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    /// Returns the current token and moves past it. Never moves past `Eof`.
    pub(crate) fn advance(&mut self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        if !self.is_at_end() {
            self.position += 1;
        }
        &self.tokens[index]
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error_here(expected))
    }

    /// Like `expect`, but running out of input reports the position of the
    /// opening delimiter instead of the end of the file.
    pub(crate) fn expect_closing(
        &mut self,
        kind: TokenKind,
        open: Span,
        expected: &str,
    ) -> Result<&Token, ParseError> {
        if self.is_at_end() && kind != TokenKind::Eof {
            let opener = match kind {
                TokenKind::RParen => TokenKind::LParen,
                TokenKind::RBrace => TokenKind::LBrace,
                other => other,
            };
            return Err(syntax_error(
                open,
                format!(
                    "unclosed {}: expected {}, found end of input",
                    opener.describe(),
                    expected
                ),
            ));
        }
        self.expect(kind, expected)
    }

    pub(crate) fn error_here(&self, expected: &str) -> ParseError {
        let token = self.peek();
        syntax_error(token.span, format!("expected {}, found {}", expected, token))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }
}

pub(crate) fn syntax_error(span: Span, message: String) -> ParseError {
    debug!("syntax error at {}: {}", span, message);
    ParseError::SyntaxError { span, message }
}
