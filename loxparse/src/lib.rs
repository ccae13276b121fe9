//! Front end for a small class-based scripting language: a lexer and a
//! recursive-descent parser producing an owned AST, plus a printer that
//! turns the AST back into canonical source.

pub mod error;
pub mod ir;
pub mod parser;
pub mod span;

pub use error::ParseError;
pub use ir::ast::Program;
pub use parser::{parse, parse_expression};
