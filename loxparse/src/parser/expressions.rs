//! Expression parsing.
//!
//! One method per precedence level, lowest binding first:
//! assignment, `or`, `and`, equality, comparison, term, factor, unary,
//! call / property access, primary. Binary levels are left-associative
//! loops; assignment and unary recurse on themselves and so associate to
//! the right.

use super::lexer::TokenKind;
use super::parser::{Parser, syntax_error};
use crate::error::ParseError;
use crate::ir::ast::{BinaryOperator, Expr, Literal, UnaryOperator};
use crate::span::Span;

type Level = fn(&mut Parser) -> Result<Expr, ParseError>;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_assignment)
    }

    /// The left side is parsed as an ordinary expression first and only then
    /// checked to be a variable or a property access.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_or()?;
        if !self.check(TokenKind::Assign) {
            return Ok(target);
        }
        let equals = self.advance().span;

        match target {
            Expr::Variable(name) => {
                let value = self.parse_assignment()?;
                Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                })
            }
            Expr::Get { object, name } => {
                let value = self.parse_assignment()?;
                Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                })
            }
            _ => Err(syntax_error(
                equals,
                "invalid assignment target: expected a variable or property before '='"
                    .to_string(),
            )),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(Self::parse_and, &[(TokenKind::Or, BinaryOperator::Or)])
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(Self::parse_equality, &[(TokenKind::And, BinaryOperator::And)])
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(
            Self::parse_comparison,
            &[
                (TokenKind::Equal, BinaryOperator::Equal),
                (TokenKind::NotEqual, BinaryOperator::NotEqual),
            ],
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(
            Self::parse_term,
            &[
                (TokenKind::Greater, BinaryOperator::Greater),
                (TokenKind::Less, BinaryOperator::Less),
                (TokenKind::GreaterEqual, BinaryOperator::GreaterEqual),
                (TokenKind::LessEqual, BinaryOperator::LessEqual),
            ],
        )
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(
            Self::parse_factor,
            &[
                (TokenKind::Plus, BinaryOperator::Add),
                (TokenKind::Minus, BinaryOperator::Subtract),
            ],
        )
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(
            Self::parse_unary,
            &[
                (TokenKind::Star, BinaryOperator::Multiply),
                (TokenKind::Slash, BinaryOperator::Divide),
            ],
        )
    }

    /// `operand (op operand)*`, folded to the left.
    fn parse_binary(
        &mut self,
        operand: Level,
        operators: &[(TokenKind, BinaryOperator)],
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = self.match_operator(operators) {
            let right = operand(self)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn match_operator(&mut self, operators: &[(TokenKind, BinaryOperator)]) -> Option<BinaryOperator> {
        let &(_, op) = operators.iter().find(|(kind, _)| self.check(*kind))?;
        self.advance();
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Bang => UnaryOperator::Not,
            _ => return self.parse_call(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::unary(op, operand))
    }

    /// Any mix of `(args)` and `.name` after a primary, e.g. `a.b(c).d(e)`.
    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(TokenKind::LParen) {
                let open = self.advance().span;
                let arguments = self.parse_arguments(open)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments,
                };
            } else if self.match_kind(TokenKind::Dot) {
                let name = self
                    .expect(TokenKind::Identifier, "property name after '.'")?
                    .lexeme
                    .clone();
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self, open: Span) -> Result<Vec<Expr>, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RParen, open, "')' after arguments")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek();
        let expr = match token.kind {
            TokenKind::Number => {
                let value = token
                    .lexeme
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| {
                        syntax_error(token.span, format!("number literal {} out of range", token))
                    })?;
                Expr::Literal(Literal::Number(value))
            }
            TokenKind::String => {
                let text = token
                    .lexeme
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .unwrap_or(&token.lexeme);
                Expr::Literal(Literal::String(text.to_string()))
            }
            TokenKind::Bool => Expr::Literal(Literal::Bool(token.lexeme == "true")),
            TokenKind::Nil => Expr::Literal(Literal::Nil),
            TokenKind::This => Expr::This,
            TokenKind::Identifier => Expr::Variable(token.lexeme.clone()),
            TokenKind::Super => {
                self.advance(); // consume 'super'
                self.expect(TokenKind::Dot, "'.' after 'super'")?;
                let method = self
                    .expect(TokenKind::Identifier, "superclass method name")?
                    .lexeme
                    .clone();
                return Ok(Expr::Super { method });
            }
            TokenKind::LParen => {
                let open = self.advance().span;
                let inner = self.parse_expression()?;
                self.expect_closing(TokenKind::RParen, open, "')' after expression")?;
                return Ok(Expr::Grouping(Box::new(inner)));
            }
            _ => return Err(self.error_here("expression")),
        };

        self.advance();
        Ok(expr)
    }
}
