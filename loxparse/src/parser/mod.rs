pub mod lexer;
pub mod parser;
mod expressions;

use crate::error::ParseError;
use crate::ir::ast;

/// Source text to AST. Lexical errors are reported before any syntax error.
pub fn parse(source: &str) -> Result<ast::Program, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse_tokens(tokens)?;
    Ok(program)
}

/// Parses a source text consisting of exactly one expression, no `;`.
pub fn parse_expression(source: &str) -> Result<ast::Expr, ParseError> {
    let tokens = lexer::tokenize(source)?;
    parser::parse_expression_tokens(tokens)
}
